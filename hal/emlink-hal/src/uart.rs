//! Low-energy serial link abstractions
//!
//! [`UartTx`]/[`UartRx`] are blocking byte I/O, used only while interrupts
//! are masked (module configuration at boot). [`LinkPort`] is the register
//! surface the interrupt driven link driver works against: start/stop
//! frame detectors, receive blocking and condition flags.

use bitflags::bitflags;

use crate::format_bits;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read data from the UART
    ///
    /// Blocks until the buffer is filled or an error occurs.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte from the UART
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// Enable the receiver
    pub rx_enable: bool,
    /// Enable the transmitter
    pub tx_enable: bool,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::HM10
    }
}

impl UartConfig {
    /// HM-10 module defaults (9600 8N1)
    pub const HM10: Self = Self {
        baudrate: 9600,
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
        rx_enable: true,
        tx_enable: true,
    };
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

bitflags! {
    /// Link condition flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LinkIrq: u32 {
        /// Transmission complete, shift register empty
        const TXC = 1 << 0;
        /// Transmit buffer has room
        const TXBL = 1 << 1;
        /// Received byte available
        const RXDATAV = 1 << 2;
        /// Start frame byte detected
        const STARTF = 1 << 9;
        /// Signal (stop) frame byte detected
        const SIGF = 1 << 10;
    }
}

format_bits!(LinkIrq);

bitflags! {
    /// Link commands
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LinkCommand: u32 {
        const RXEN = 1 << 0;
        const RXDIS = 1 << 1;
        const TXEN = 1 << 2;
        const TXDIS = 1 << 3;
        const RXBLOCKEN = 1 << 4;
        const RXBLOCKDIS = 1 << 5;
        const CLEARTX = 1 << 6;
        const CLEARRX = 1 << 7;
    }
}

format_bits!(LinkCommand);

bitflags! {
    /// Link status bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LinkStatus: u32 {
        const RXENS = 1 << 0;
        const TXENS = 1 << 1;
        const RXBLOCK = 1 << 2;
        const TXC = 1 << 3;
        const TXBL = 1 << 4;
        const RXDATAV = 1 << 5;
        const TXIDLE = 1 << 6;
    }
}

format_bits!(LinkStatus);

/// Low-energy serial link peripheral
///
/// While receive blocking is on, incoming bytes are discarded except the
/// start frame byte, which unblocks reception and raises `STARTF`. The
/// signal frame byte raises `SIGF`. Neither framing byte is delivered
/// through `RXDATAV`.
pub trait LinkPort: UartTx + UartRx {
    /// Apply line settings; enables RX/TX as requested
    fn configure(&mut self, config: &UartConfig);

    /// Program the start frame detector
    fn set_start_frame(&mut self, byte: u8);

    /// Read back the start frame detector
    fn start_frame(&self) -> u8;

    /// Program the signal (stop) frame detector
    fn set_signal_frame(&mut self, byte: u8);

    /// Issue one or more commands
    fn command(&mut self, cmd: LinkCommand);

    /// Current status bits
    fn status(&self) -> LinkStatus;

    /// Load the transmit buffer
    fn write_tx(&mut self, byte: u8);

    /// Read the receive buffer
    fn read_rx(&mut self) -> u8;

    /// Raw pending condition flags
    fn pending_flags(&self) -> LinkIrq;

    /// Clear condition flags
    fn clear_flags(&mut self, flags: LinkIrq);

    /// Replace the interrupt enable set
    fn set_interrupts(&mut self, irq: LinkIrq);

    /// Current interrupt enable set
    fn enabled_interrupts(&self) -> LinkIrq;

    /// Add conditions to the interrupt enable set
    fn enable_interrupts(&mut self, irq: LinkIrq) {
        let enabled = self.enabled_interrupts() | irq;
        self.set_interrupts(enabled);
    }

    /// Remove conditions from the interrupt enable set
    fn disable_interrupts(&mut self, irq: LinkIrq) {
        let enabled = self.enabled_interrupts() - irq;
        self.set_interrupts(enabled);
    }

    /// Read pending enabled conditions and clear everything pending
    fn take_interrupts(&mut self) -> LinkIrq {
        let pending = self.pending_flags();
        self.clear_flags(pending);
        pending & self.enabled_interrupts()
    }
}

//! UART link with software frame detection
//!
//! Transmit is synchronous: each byte written to the holding register is
//! pushed into the UART FIFO and flushed, so TXBL and TXC read as always
//! set. Receive bytes are handed in with [`SoftLink::feed`], which applies
//! receive blocking and start/signal frame detection the way the
//! low-energy UART does in hardware.

use embassy_rp::uart::{self, Async, UartRx as RpUartRx, UartTx as RpUartTx};
use heapless::Deque;

use emlink_hal::{
    DataBits, LinkCommand, LinkIrq, LinkPort, LinkStatus, Parity, StopBits, UartConfig, UartRx,
    UartTx,
};
use emlink_protocol::{Detected, FrameDetector, Framing};

/// Received bytes not yet read by the driver
const RX_FIFO: usize = 4;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoftLinkError {
    Uart(uart::Error),
    /// The receiver was handed to the receive task
    Detached,
}

/// embassy-rp settings for a link configuration
///
/// Returns `None` for nine data bits, which the RP2040 UART lacks.
pub fn rp_uart_config(config: &UartConfig) -> Option<uart::Config> {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Eight => uart::DataBits::DataBits8,
        DataBits::Nine => return None,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    Some(rp)
}

pub struct SoftLink<'d> {
    tx: RpUartTx<'d, Async>,
    rx: Option<RpUartRx<'d, Async>>,
    rx_enabled: bool,
    tx_enabled: bool,
    start_frame: u8,
    signal_frame: u8,
    detector: FrameDetector,
    fifo: Deque<u8, RX_FIFO>,
    latched: LinkIrq,
    irq_enable: LinkIrq,
    tx_errors: u32,
}

impl<'d> SoftLink<'d> {
    pub fn new(tx: RpUartTx<'d, Async>, rx: RpUartRx<'d, Async>) -> Self {
        let mut detector = FrameDetector::new(Framing::ANGLE);
        detector.unblock();
        Self {
            tx,
            rx: Some(rx),
            rx_enabled: false,
            tx_enabled: false,
            start_frame: 0,
            signal_frame: 0,
            detector,
            fifo: Deque::new(),
            latched: LinkIrq::empty(),
            irq_enable: LinkIrq::empty(),
            tx_errors: 0,
        }
    }

    /// Take the receiver for the async receive task
    ///
    /// Blocking reads fail afterwards.
    pub fn detach_rx(&mut self) -> Option<RpUartRx<'d, Async>> {
        self.rx.take()
    }

    /// One byte off the wire
    pub fn feed(&mut self, byte: u8) {
        if !self.rx_enabled {
            return;
        }
        match self.detector.feed(byte) {
            Detected::Discarded => {}
            Detected::Start => self.latched |= LinkIrq::STARTF,
            Detected::Data(b) => {
                if self.fifo.is_full() {
                    self.fifo.pop_front();
                }
                let queued = self.fifo.push_back(b);
                debug_assert!(queued.is_ok(), "oldest byte dropped above");
            }
            Detected::Signal => self.latched |= LinkIrq::SIGF,
        }
    }

    /// Bytes the UART refused
    pub fn tx_errors(&self) -> u32 {
        self.tx_errors
    }

    fn refresh_framing(&mut self) {
        if let Ok(framing) = Framing::new(self.start_frame, self.signal_frame) {
            self.detector.set_framing(framing);
        }
    }

    fn levels(&self) -> LinkIrq {
        let mut levels = LinkIrq::TXBL | LinkIrq::TXC;
        if !self.fifo.is_empty() {
            levels |= LinkIrq::RXDATAV;
        }
        levels
    }
}

impl UartTx for SoftLink<'_> {
    type Error = SoftLinkError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.blocking_write(data).map_err(SoftLinkError::Uart)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.blocking_flush().map_err(SoftLinkError::Uart)
    }
}

impl UartRx for SoftLink<'_> {
    type Error = SoftLinkError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let rx = self.rx.as_mut().ok_or(SoftLinkError::Detached)?;
        rx.blocking_read(buf).map_err(SoftLinkError::Uart)?;
        Ok(buf.len())
    }
}

impl LinkPort for SoftLink<'_> {
    fn configure(&mut self, config: &UartConfig) {
        // Line settings are fixed when the UART is built
        self.rx_enabled = config.rx_enable;
        self.tx_enabled = config.tx_enable;
    }

    fn set_start_frame(&mut self, byte: u8) {
        self.start_frame = byte;
        self.refresh_framing();
    }

    fn start_frame(&self) -> u8 {
        self.start_frame
    }

    fn set_signal_frame(&mut self, byte: u8) {
        self.signal_frame = byte;
        self.refresh_framing();
    }

    fn command(&mut self, cmd: LinkCommand) {
        if cmd.contains(LinkCommand::RXEN) {
            self.rx_enabled = true;
        }
        if cmd.contains(LinkCommand::RXDIS) {
            self.rx_enabled = false;
        }
        if cmd.contains(LinkCommand::TXEN) {
            self.tx_enabled = true;
        }
        if cmd.contains(LinkCommand::TXDIS) {
            self.tx_enabled = false;
        }
        if cmd.contains(LinkCommand::RXBLOCKEN) {
            self.detector.block();
        }
        if cmd.contains(LinkCommand::RXBLOCKDIS) {
            self.detector.unblock();
        }
        if cmd.contains(LinkCommand::CLEARRX) {
            self.fifo.clear();
        }
    }

    fn status(&self) -> LinkStatus {
        let mut status = LinkStatus::TXC | LinkStatus::TXBL | LinkStatus::TXIDLE;
        status.set(LinkStatus::RXENS, self.rx_enabled);
        status.set(LinkStatus::TXENS, self.tx_enabled);
        status.set(LinkStatus::RXBLOCK, self.detector.is_blocked());
        status.set(LinkStatus::RXDATAV, !self.fifo.is_empty());
        status
    }

    fn write_tx(&mut self, byte: u8) {
        if !self.tx_enabled {
            return;
        }
        let sent = self
            .tx
            .blocking_write(&[byte])
            .and_then(|()| self.tx.blocking_flush());
        if sent.is_err() {
            self.tx_errors = self.tx_errors.wrapping_add(1);
        }
    }

    fn read_rx(&mut self) -> u8 {
        self.fifo.pop_front().unwrap_or(0)
    }

    fn pending_flags(&self) -> LinkIrq {
        self.latched | self.levels()
    }

    fn clear_flags(&mut self, flags: LinkIrq) {
        self.latched.remove(flags);
    }

    fn set_interrupts(&mut self, irq: LinkIrq) {
        self.irq_enable = irq;
    }

    fn enabled_interrupts(&self) -> LinkIrq {
        self.irq_enable
    }
}

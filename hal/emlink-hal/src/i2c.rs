//! Two-wire (I2C) bus master port
//!
//! Register-level surface of a two-wire master peripheral. The protocol
//! engine in `emlink-drivers` issues commands and reacts to condition
//! flags; it never blocks on the bus.

use bitflags::bitflags;

use crate::format_bits;

bitflags! {
    /// Condition flags raised by the bus master
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TwiIrq: u32 {
        /// Start condition transmitted
        const START = 1 << 0;
        /// Byte received and waiting in the receive register
        const RXDATAV = 1 << 5;
        /// Addressed device acknowledged
        const ACK = 1 << 6;
        /// Addressed device did not acknowledge
        const NACK = 1 << 7;
        /// Stop condition completed
        const MSTOP = 1 << 8;
    }
}

format_bits!(TwiIrq);

bitflags! {
    /// Commands accepted by the bus master
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TwiCommand: u32 {
        const START = 1 << 0;
        const STOP = 1 << 1;
        const ACK = 1 << 2;
        const NACK = 1 << 3;
        const CONT = 1 << 4;
        const ABORT = 1 << 5;
        const CLEAR_TX = 1 << 6;
        const CLEAR_PC = 1 << 7;
    }
}

format_bits!(TwiCommand);

/// SCL high/low period ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRatio {
    /// 4:4, standard mode
    Standard,
    /// 6:3
    Asymmetric,
    /// 11:6, fast mode
    Fast,
}

/// Bus master configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TwiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// SCL duty ratio
    pub clock_ratio: ClockRatio,
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl TwiConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        clock_ratio: ClockRatio::Standard,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        clock_ratio: ClockRatio::Fast,
    };
}

/// Two-wire bus master peripheral
pub trait TwiPort {
    /// Apply clock settings and enable the master
    fn configure(&mut self, config: &TwiConfig);

    /// Whether the peripheral reports itself enabled
    fn is_enabled(&self) -> bool;

    /// Sample the clock line
    fn scl_is_high(&self) -> bool;

    /// Sample the data line
    fn sda_is_high(&self) -> bool;

    /// Drive the clock line directly (bus recovery only)
    fn drive_scl(&mut self, high: bool);

    /// Drive the data line directly (bus recovery only)
    fn drive_sda(&mut self, high: bool);

    /// Issue one or more commands
    fn command(&mut self, cmd: TwiCommand);

    /// Load the transmit register
    fn write_tx(&mut self, byte: u8);

    /// Read the receive register
    fn read_rx(&mut self) -> u8;

    /// Force condition flags (used to verify the flag logic is clocked)
    fn set_flags(&mut self, flags: TwiIrq);

    /// Raw pending condition flags
    fn pending_flags(&self) -> TwiIrq;

    /// Clear condition flags
    fn clear_flags(&mut self, flags: TwiIrq);

    /// Replace the interrupt enable set
    fn set_interrupts(&mut self, irq: TwiIrq);

    /// Current interrupt enable set
    fn enabled_interrupts(&self) -> TwiIrq;

    /// Read pending enabled conditions and clear everything pending
    fn take_interrupts(&mut self) -> TwiIrq {
        let pending = self.pending_flags();
        self.clear_flags(pending);
        pending & self.enabled_interrupts()
    }
}

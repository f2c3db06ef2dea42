//! Low-energy timer port
//!
//! A down-counting timer clocked from the low-frequency domain. COMP0 is
//! the reload value (the period), COMP1 the compare point that shapes the
//! active part of each period on the routed outputs.

use bitflags::bitflags;

use crate::format_bits;

bitflags! {
    /// Timer condition flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TimerIrq: u32 {
        const COMP0 = 1 << 0;
        const COMP1 = 1 << 1;
        const UF = 1 << 2;
        const REP0 = 1 << 3;
        const REP1 = 1 << 4;
    }
}

format_bits!(TimerIrq);

/// Counter programming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSettings {
    /// Reload value in ticks
    pub comp0: u32,
    /// Active compare point in ticks
    pub comp1: u32,
    /// Repeat counter 0
    pub rep0: u8,
    /// Repeat counter 1
    pub rep1: u8,
    /// Route waveform to output 0
    pub out0: bool,
    /// Route waveform to output 1
    pub out1: bool,
}

/// Low-energy timer peripheral
pub trait TimerPort {
    /// Tick rate of the counter in Hz
    fn tick_hz(&self) -> u32;

    /// Program the counter (timer stopped)
    fn configure(&mut self, settings: &TimerSettings);

    /// Start or stop counting
    fn set_running(&mut self, run: bool);

    /// Whether the counter reports running
    fn is_running(&self) -> bool;

    /// Raw pending condition flags
    fn pending_flags(&self) -> TimerIrq;

    /// Clear condition flags
    fn clear_flags(&mut self, flags: TimerIrq);

    /// Replace the interrupt enable set
    fn set_interrupts(&mut self, irq: TimerIrq);

    /// Current interrupt enable set
    fn enabled_interrupts(&self) -> TimerIrq;

    /// Read pending enabled conditions and clear everything pending
    fn take_interrupts(&mut self) -> TimerIrq {
        let pending = self.pending_flags();
        self.clear_flags(pending);
        pending & self.enabled_interrupts()
    }
}

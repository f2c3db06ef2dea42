//! emlink Hardware Abstraction Layer
//!
//! This crate defines the register-level port traits that the interrupt
//! driven drivers in `emlink-drivers` are written against. A chip HAL
//! implements them once per peripheral instance; host tests implement
//! them with scripted mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  emlink-core / emlink-drivers           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  emlink-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  emlink-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Indicator outputs
//! - [`i2c::TwiPort`] - Two-wire bus master registers
//! - [`uart::LinkPort`], [`uart::UartTx`], [`uart::UartRx`] - Low-energy serial link
//! - [`timer::TimerPort`] - Low-energy periodic timer
//! - [`power::PowerPort`] - Energy mode entry
//!
//! Every port exposes its interrupt conditions the same way: a set of
//! pending flags, a set of enabled flags and a clear operation.
//! `take_interrupts` reads the pending enabled conditions and clears
//! everything that was pending, which is what an interrupt handler does
//! on entry.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod power;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::{ClockRatio, TwiCommand, TwiConfig, TwiIrq, TwiPort};
pub use power::{EnergyMode, PowerPort};
pub use timer::{TimerIrq, TimerPort, TimerSettings};
pub use uart::{
    DataBits, LinkCommand, LinkIrq, LinkPort, LinkStatus, Parity, StopBits, UartConfig, UartRx,
    UartTx,
};

/// Implement `defmt::Format` for a bitflags type as its raw bits
macro_rules! format_bits {
    ($ty:ident) => {
        #[cfg(feature = "defmt")]
        impl defmt::Format for $ty {
            fn format(&self, f: defmt::Formatter) {
                defmt::write!(f, "{}({=u32:#x})", stringify!($ty), self.bits())
            }
        }
    };
}

pub(crate) use format_bits;

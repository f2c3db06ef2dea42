//! RP2040 ports for the emlink drivers
//!
//! The drivers in `emlink-drivers` are written against register-level
//! port traits. The RP2040 has no low-energy UART, no frame detectors and
//! no low-energy timer, so this crate provides software equivalents:
//!
//! - [`twi::BitBangTwi`]: two-wire master on two GPIOs, latching the
//!   ACK/NACK/RXDATAV/MSTOP conditions as each bus step completes
//! - [`link::SoftLink`]: UART with software start/signal frame detection
//!   and receive blocking, fed byte by byte from the receive task
//! - [`timer::DeadlineTimer`]: period/active schedule on `embassy-time`
//! - [`power::PowerLog`]: records the sleep mode the node would enter
//! - [`gpio::Led`]: indicator output
//!
//! Conditions are latched synchronously and serviced by the firmware's
//! main loop, which stands in for the interrupt handlers.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod link;
pub mod power;
pub mod timer;
pub mod twi;

pub use gpio::Led;
pub use link::{rp_uart_config, SoftLink, SoftLinkError};
pub use power::PowerLog;
pub use timer::DeadlineTimer;
pub use twi::BitBangTwi;

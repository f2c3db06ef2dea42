//! Interrupt driven peripheral drivers
//!
//! This crate provides the protocol engines behind the traits in
//! `emlink-core`, written against the port traits in `emlink-hal`:
//!
//! - Low-energy PWM timer (periodic wake tick)
//! - Two-wire bus master (interrupt driven read transaction)
//! - Serial link (framed receive, interrupt driven transmit, outbound ring)
//! - Si7021 temperature sensor
//! - HM-10 BLE link helper
//!
//! Each driver has an `on_interrupt` entry that reads and clears the
//! port's pending conditions and runs the full state transition for
//! each. It can be called from the peripheral's interrupt handler or from
//! a bottom half.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod ble;
pub mod letimer;
pub mod link;
pub mod sensor;
pub mod twi;

#[cfg(test)]
pub(crate) mod mock;

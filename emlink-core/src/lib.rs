//! Board-agnostic core logic for the sensor node firmware
//!
//! This crate contains everything that does not touch a peripheral
//! register:
//!
//! - Sleep arbiter (per energy mode hold counts)
//! - Event scheduler (pending event bitmask)
//! - Fault taxonomy shared by all drivers
//! - Node configuration types
//! - Driver traits consumed by the orchestrator
//! - Application orchestrator (event wiring and init order)
//!
//! Shared state is guarded by critical sections; a single
//! [`context::NodeContext`] is threaded by reference through every driver
//! call that needs to post events or hold a sleep block.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod app;
pub mod config;
pub mod context;
pub mod fault;
pub mod scheduler;
pub mod sleep;
pub mod traits;

pub use context::NodeContext;
pub use fault::{Fault, Peripheral, Severity};
pub use scheduler::{EventScheduler, Events};
pub use sleep::SleepArbiter;

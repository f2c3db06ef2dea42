//! emlink Link Protocol
//!
//! Wire formats spoken over the low-energy serial link between the sensor
//! node and its radio module (an HM-10 class BLE bridge).
//!
//! # Protocol Overview
//!
//! Inbound (phone → node) frames are delimited by a start byte and a stop
//! byte. Only the bytes in between are kept:
//! ```text
//! ┌───────┬───────────────────┬──────┐
//! │ START │ COMMAND           │ STOP │
//! │ 1B    │ 0–16B (wrapping)  │ 1B   │
//! └───────┴───────────────────┴──────┘
//! ```
//!
//! Outbound (node → phone) frames are plain ASCII text terminated by a
//! newline, e.g. `"71.4 F\n"`.
//!
//! At boot the node can rename the module through a blocking AT exchange
//! (see [`at`]).

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod at;
pub mod command;
pub mod frame;
pub mod report;

pub use at::{AtError, AtStep, NameExchange, MAX_NAME_LEN};
pub use command::Command;
pub use frame::{Detected, FrameBuffer, FrameDetector, Framing, FramingError, RX_CAPACITY};
pub use report::{Report, TempUnit, REPORT_CAPACITY};

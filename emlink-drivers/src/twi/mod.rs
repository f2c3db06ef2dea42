//! Two-wire bus master
//!
//! Interrupt driven engine for one device read transaction:
//!
//! ```text
//! START addr+W ─ACK─► cmd ─ACK─► RESTART addr+R ─ACK─► MSB ─► LSB ─► STOP
//!                      ▲  │            ▲      │
//!                      └NACK            └─NACK┘   (device busy, retried)
//! ```

pub mod master;
pub mod transaction;

pub use master::{BusConfig, TwiMaster, TWI_EM_BLOCK};
pub use transaction::{Transaction, TwiState};

//! Driver traits
//!
//! These traits define the interface between the orchestrator and the
//! interrupt driven drivers. Every call that can post events or hold a
//! sleep block takes the shared [`NodeContext`](crate::NodeContext).

pub mod link;
pub mod sensor;
pub mod ticker;

pub use link::TextLink;
pub use sensor::TemperatureSensor;
pub use ticker::Ticker;

//! Configuration types
//!
//! Node-level settings. Peripheral configuration structs live with their
//! drivers.

pub mod node;

pub use node::{ModuleName, NodeConfig};

//! Application orchestrator
//!
//! Wires scheduler events to handlers and owns the init order.

pub mod node;

pub use node::Node;

//! Embassy async tasks

pub mod link_rx;
pub mod node;

pub use link_rx::link_rx_task;
pub use node::{check, node_task, pump, FirmwareNode};

//! Low-energy serial link
//!
//! [`SerialLink`] runs the transmit and framed receive state machines;
//! [`OutboundRing`] queues length-prefixed outbound messages for it.

pub mod ring;
pub mod serial;

pub use ring::{OutboundRing, RING_CAPACITY};
pub use serial::{
    LinkConfig, RxState, SerialLink, TxState, TxToken, LINK_RX_EM_BLOCK, LINK_TX_EM_BLOCK,
    TX_CAPACITY,
};

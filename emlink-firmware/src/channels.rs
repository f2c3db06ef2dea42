//! Inter-task communication channels
//!
//! The receive task hands raw link bytes to the node task, which feeds
//! them through the link port's frame detection.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

/// Channel capacity for received link bytes
const LINK_RX_CHANNEL_SIZE: usize = 32;

/// Bytes received from the HM-10
pub static LINK_RX: Channel<CriticalSectionRawMutex, u8, LINK_RX_CHANNEL_SIZE> = Channel::new();

/// Wakes the node task before its next timer deadline
pub static WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

//! HM-10 BLE module helper

pub mod hm10;

pub use hm10::{Hm10, Popped};

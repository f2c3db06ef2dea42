//! Sensor drivers

pub mod si7021;

pub use si7021::{celsius_from_raw, fahrenheit_from_raw, Si7021, Si7021Config};

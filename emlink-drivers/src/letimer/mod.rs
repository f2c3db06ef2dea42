//! Low-energy timer
//!
//! Free-running PWM-shaped tick used as the node's wake source.

pub mod pwm;

pub use pwm::{PwmTimer, TimerConfig, TIMER_EM_BLOCK};

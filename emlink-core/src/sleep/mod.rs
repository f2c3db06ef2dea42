//! Sleep arbitration
//!
//! Subsystems hold blocks on energy modes they cannot survive; the arbiter
//! turns the hold counts into the deepest mode that is safe to enter.

pub mod arbiter;

pub use arbiter::{SleepArbiter, MAX_HOLDS};

//! Event scheduler
//!
//! A bitmask of pending events. Interrupt-side code posts bits, the main
//! loop dispatches them and each handler clears its own bit.

pub mod events;
pub mod mask;

pub use events::Events;
pub use mask::EventScheduler;

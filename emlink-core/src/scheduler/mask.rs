//! Pending event mask

use core::cell::Cell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use super::events::Events;

/// Shared pending-event mask
///
/// Every read-modify-write runs inside a critical section, so posts from
/// interrupt context never lose bits set by the main loop.
pub struct EventScheduler {
    mask: CriticalSectionMutex<Cell<u32>>,
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventScheduler {
    pub const fn new() -> Self {
        Self {
            mask: CriticalSectionMutex::new(Cell::new(0)),
        }
    }

    /// Drop every pending event
    pub fn open(&self) {
        self.mask.lock(|mask| mask.set(0));
    }

    /// Post events
    pub fn add(&self, events: Events) {
        self.mask.lock(|mask| mask.set(mask.get() | events.bits()));
    }

    /// Clear events
    pub fn remove(&self, events: Events) {
        self.mask.lock(|mask| mask.set(mask.get() & !events.bits()));
    }

    /// Snapshot of pending events
    pub fn pending(&self) -> Events {
        Events::from_bits_retain(self.mask.lock(Cell::get))
    }

    pub fn is_idle(&self) -> bool {
        self.pending().is_empty()
    }
}

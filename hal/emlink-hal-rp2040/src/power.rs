//! Sleep bookkeeping
//!
//! The executor already waits for events when every task is pending, so
//! entering a mode only records it for diagnostics.

use emlink_hal::{EnergyMode, PowerPort};

#[derive(Debug, Default)]
pub struct PowerLog {
    last: Option<EnergyMode>,
    entries: [u32; EnergyMode::COUNT],
}

impl PowerLog {
    pub const fn new() -> Self {
        Self {
            last: None,
            entries: [0; EnergyMode::COUNT],
        }
    }

    /// Mode of the most recent sleep
    pub fn last(&self) -> Option<EnergyMode> {
        self.last
    }

    /// Sleeps entered at `mode`
    pub fn entries(&self, mode: EnergyMode) -> u32 {
        self.entries[mode.index()]
    }
}

impl PowerPort for PowerLog {
    fn enter(&mut self, mode: EnergyMode) {
        self.last = Some(mode);
        let count = &mut self.entries[mode.index()];
        *count = count.wrapping_add(1);
    }
}

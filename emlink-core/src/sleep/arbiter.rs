//! Per energy mode hold counts

use core::cell::Cell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use emlink_hal::{EnergyMode, PowerPort};

use crate::fault::Fault;

/// Leak bound: a level can be held at most `MAX_HOLDS - 1` times
pub const MAX_HOLDS: u8 = 10;

type HoldTable = [u8; EnergyMode::COUNT];

/// Sleep-block table
///
/// Blocking a mode means "the system must stay shallower than this mode".
/// A peripheral whose clock stops in EM2 blocks EM2, which lets the core
/// reach EM1 at most.
pub struct SleepArbiter {
    holds: CriticalSectionMutex<Cell<HoldTable>>,
}

impl Default for SleepArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepArbiter {
    pub const fn new() -> Self {
        Self {
            holds: CriticalSectionMutex::new(Cell::new([0; EnergyMode::COUNT])),
        }
    }

    /// Release every hold
    pub fn initialize(&self) {
        self.holds.lock(|holds| holds.set([0; EnergyMode::COUNT]));
    }

    /// Add a hold on `mode`
    pub fn block(&self, mode: EnergyMode) -> Result<(), Fault> {
        self.holds.lock(|holds| {
            let mut table = holds.get();
            let count = &mut table[mode.index()];
            if *count + 1 >= MAX_HOLDS {
                return Err(Fault::SleepBlockLeak(mode));
            }
            *count += 1;
            holds.set(table);
            Ok(())
        })
    }

    /// Release a hold on `mode`
    pub fn unblock(&self, mode: EnergyMode) -> Result<(), Fault> {
        self.holds.lock(|holds| {
            let mut table = holds.get();
            let count = &mut table[mode.index()];
            if *count == 0 {
                return Err(Fault::SleepUnderflow(mode));
            }
            *count -= 1;
            holds.set(table);
            Ok(())
        })
    }

    /// Current hold count on `mode`
    pub fn holds(&self, mode: EnergyMode) -> u8 {
        self.holds.lock(|holds| holds.get()[mode.index()])
    }

    /// Shallowest held mode, or the deepest mode when nothing is held
    pub fn lowest_permitted_level(&self) -> EnergyMode {
        let table = self.holds.lock(Cell::get);
        EnergyMode::ALL
            .into_iter()
            .find(|mode| table[mode.index()] > 0)
            .unwrap_or(EnergyMode::Em4)
    }

    /// Mode `enter_best_sleep` would enter, if any
    ///
    /// EM4 loses RAM retention and is never chosen.
    pub fn best_sleep(&self) -> Option<EnergyMode> {
        match self.lowest_permitted_level() {
            EnergyMode::Em0 | EnergyMode::Em1 => None,
            EnergyMode::Em2 => Some(EnergyMode::Em1),
            EnergyMode::Em3 => Some(EnergyMode::Em2),
            EnergyMode::Em4 => Some(EnergyMode::Em3),
        }
    }

    /// Enter the deepest permitted mode
    ///
    /// Only call with no events pending. Returns the mode entered, or
    /// `None` if the core has to stay awake.
    pub fn enter_best_sleep<P: PowerPort>(&self, power: &mut P) -> Option<EnergyMode> {
        let mode = self.best_sleep()?;
        power.enter(mode);
        Some(mode)
    }
}

//! Shared node context
//!
//! The scheduler and the sleep arbiter are the only state shared between
//! drivers. They live together in one context that is passed by
//! reference into every driver call that posts events or holds blocks.

use emlink_hal::{EnergyMode, PowerPort};

use crate::scheduler::{EventScheduler, Events};
use crate::sleep::SleepArbiter;

pub struct NodeContext {
    pub scheduler: EventScheduler,
    pub sleep: SleepArbiter,
}

impl Default for NodeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeContext {
    pub const fn new() -> Self {
        Self {
            scheduler: EventScheduler::new(),
            sleep: SleepArbiter::new(),
        }
    }

    /// Reset holds and pending events
    pub fn initialize(&self) {
        self.sleep.initialize();
        self.scheduler.open();
    }

    /// Post events to the scheduler
    pub fn post(&self, events: Events) {
        self.scheduler.add(events);
    }

    /// Sleep if nothing is pending
    ///
    /// Returns the mode entered.
    pub fn idle<P: PowerPort>(&self, power: &mut P) -> Option<EnergyMode> {
        if !self.scheduler.is_idle() {
            return None;
        }
        self.sleep.enter_best_sleep(power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingPower(u32);

    impl PowerPort for CountingPower {
        fn enter(&mut self, _mode: EnergyMode) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_no_sleep_with_pending_events() {
        let ctx = NodeContext::new();
        let mut power = CountingPower(0);
        ctx.post(Events::TIMER_UF);
        assert_eq!(ctx.idle(&mut power), None);
        assert_eq!(power.0, 0);

        ctx.scheduler.remove(Events::TIMER_UF);
        assert_eq!(ctx.idle(&mut power), Some(EnergyMode::Em3));
        assert_eq!(power.0, 1);
    }

    #[test]
    fn test_initialize_resets_everything() {
        let ctx = NodeContext::new();
        ctx.post(Events::BOOT);
        ctx.sleep.block(EnergyMode::Em2).unwrap();
        ctx.initialize();
        assert!(ctx.scheduler.is_idle());
        assert_eq!(ctx.sleep.holds(EnergyMode::Em2), 0);
    }
}

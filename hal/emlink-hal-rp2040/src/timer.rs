//! Low-energy timer on `embassy-time`
//!
//! Each period is `comp0` ticks long and ends with UF (and COMP0, the
//! reload). COMP1 latches `comp1` ticks before the end of the period,
//! matching a down-counter passing the compare value.

use embassy_time::{Duration, Instant};

use emlink_hal::{TimerIrq, TimerPort, TimerSettings};

/// Millisecond ticks
const TICK_HZ: u32 = 1000;

pub struct DeadlineTimer {
    settings: TimerSettings,
    running: bool,
    period_end: Instant,
    compare_at: Option<Instant>,
    pending: TimerIrq,
    irq_enable: TimerIrq,
}

impl Default for DeadlineTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl DeadlineTimer {
    pub const fn new() -> Self {
        Self {
            settings: TimerSettings {
                comp0: 0,
                comp1: 0,
                rep0: 0,
                rep1: 0,
                out0: false,
                out1: false,
            },
            running: false,
            period_end: Instant::MIN,
            compare_at: None,
            pending: TimerIrq::empty(),
            irq_enable: TimerIrq::empty(),
        }
    }

    fn period(&self) -> Duration {
        Duration::from_millis(u64::from(self.settings.comp0.max(1)))
    }

    fn arm(&mut self, start: Instant) {
        self.period_end = start + self.period();
        let active = Duration::from_millis(u64::from(self.settings.comp1));
        self.compare_at = self.period_end.checked_sub(active).filter(|at| *at > start);
    }

    /// Latch every condition due by `now`
    pub fn poll(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        loop {
            if let Some(at) = self.compare_at {
                if now >= at {
                    self.pending |= TimerIrq::COMP1;
                    self.compare_at = None;
                }
            }
            if now < self.period_end {
                break;
            }
            self.pending |= TimerIrq::UF | TimerIrq::COMP0;
            let end = self.period_end;
            self.arm(end);
        }
    }

    /// When the next condition falls due
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.running {
            return None;
        }
        Some(match self.compare_at {
            Some(at) if at < self.period_end => at,
            _ => self.period_end,
        })
    }
}

impl TimerPort for DeadlineTimer {
    fn tick_hz(&self) -> u32 {
        TICK_HZ
    }

    fn configure(&mut self, settings: &TimerSettings) {
        self.settings = *settings;
    }

    fn set_running(&mut self, run: bool) {
        if run && !self.running {
            self.arm(Instant::now());
        }
        self.running = run;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn pending_flags(&self) -> TimerIrq {
        self.pending
    }

    fn clear_flags(&mut self, flags: TimerIrq) {
        self.pending.remove(flags);
    }

    fn set_interrupts(&mut self, irq: TimerIrq) {
        self.irq_enable = irq;
    }

    fn enabled_interrupts(&self) -> TimerIrq {
        self.irq_enable
    }
}

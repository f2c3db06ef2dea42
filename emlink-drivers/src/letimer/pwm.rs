//! PWM tick driver
//!
//! COMP0 holds the period and is reloaded on every underflow; COMP1 ends
//! the active part of the period. The underflow is the node's
//! measurement tick.

use emlink_core::traits::Ticker;
use emlink_core::{Events, Fault, NodeContext, Peripheral};
use emlink_hal::{EnergyMode, TimerIrq, TimerPort, TimerSettings};

/// The timer stops in EM4
pub const TIMER_EM_BLOCK: EnergyMode = EnergyMode::Em4;

/// Any nonzero repeat count keeps the outputs toggling in free mode
const REPEAT: u8 = 7;

/// Timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// Period in milliseconds
    pub period_ms: u32,
    /// Active part of the period in milliseconds
    pub active_ms: u32,
    /// Route the waveform to output 0
    pub out0: bool,
    /// Route the waveform to output 1
    pub out1: bool,
    /// Leave the timer running after `open`
    pub enable: bool,
    /// Conditions that interrupt
    pub interrupts: TimerIrq,
    pub comp0_event: Events,
    pub comp1_event: Events,
    pub uf_event: Events,
}

impl TimerConfig {
    /// Underflow-only tick, outputs off, left stopped
    pub const fn pwm(period_ms: u32, active_ms: u32) -> Self {
        Self {
            period_ms,
            active_ms,
            out0: false,
            out1: false,
            enable: false,
            interrupts: TimerIrq::UF,
            comp0_event: Events::TIMER_COMP0,
            comp1_event: Events::TIMER_COMP1,
            uf_event: Events::TIMER_UF,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::pwm(10_000, 100)
    }
}

/// Periodic low-energy timer
pub struct PwmTimer<P> {
    port: P,
    config: TimerConfig,
}

impl<P: TimerPort> PwmTimer<P> {
    pub fn new(port: P, config: TimerConfig) -> Self {
        Self { port, config }
    }

    fn ticks(&self, ms: u32) -> u32 {
        let ticks = u64::from(ms) * u64::from(self.port.tick_hz()) / 1000;
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    /// Program the counter
    pub fn open(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        if self.config.active_ms > self.config.period_ms {
            return Err(Fault::InvalidConfig(Peripheral::Timer));
        }

        // A timer without its low-frequency clock never reports running
        self.port.set_running(true);
        if !self.port.is_running() {
            return Err(Fault::ClockTree(Peripheral::Timer));
        }
        self.port.set_running(false);

        let settings = TimerSettings {
            comp0: self.ticks(self.config.period_ms),
            comp1: self.ticks(self.config.active_ms),
            rep0: REPEAT,
            rep1: REPEAT,
            out0: self.config.out0,
            out1: self.config.out1,
        };
        self.port.configure(&settings);

        self.port.clear_flags(TimerIrq::all());
        self.port.set_interrupts(self.config.interrupts);

        if self.config.enable {
            self.start(ctx, true)?;
        }
        Ok(())
    }

    /// Start or stop; holds the EM4 block while running
    pub fn start(&mut self, ctx: &NodeContext, enable: bool) -> Result<(), Fault> {
        match (enable, self.port.is_running()) {
            (true, false) => {
                ctx.sleep.block(TIMER_EM_BLOCK)?;
                self.port.set_running(true);
            }
            (false, true) => {
                self.port.set_running(false);
                ctx.sleep.unblock(TIMER_EM_BLOCK)?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.port.is_running()
    }

    /// Post the configured event for each pending condition
    pub fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        let irq = self.port.take_interrupts();
        if irq.contains(TimerIrq::COMP0) {
            ctx.post(self.config.comp0_event);
        }
        if irq.contains(TimerIrq::COMP1) {
            ctx.post(self.config.comp1_event);
        }
        if irq.contains(TimerIrq::UF) {
            ctx.post(self.config.uf_event);
        }
        Ok(())
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

impl<P: TimerPort> Ticker for PwmTimer<P> {
    fn open(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        PwmTimer::open(self, ctx)
    }

    fn start(&mut self, ctx: &NodeContext, enable: bool) -> Result<(), Fault> {
        PwmTimer::start(self, ctx, enable)
    }

    fn is_running(&self) -> bool {
        PwmTimer::is_running(self)
    }

    fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        PwmTimer::on_interrupt(self, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTimer;

    fn opened(config: TimerConfig) -> (NodeContext, PwmTimer<MockTimer>) {
        let ctx = NodeContext::new();
        let mut timer = PwmTimer::new(MockTimer::new(), config);
        timer.open(&ctx).unwrap();
        (ctx, timer)
    }

    #[test]
    fn test_open_programs_ticks() {
        let (ctx, timer) = opened(TimerConfig::pwm(10_000, 100));
        let settings = timer.port().settings.unwrap();
        assert_eq!(settings.comp0, 10_000);
        assert_eq!(settings.comp1, 100);
        assert!(settings.rep0 > 0 && settings.rep1 > 0);
        assert!(!timer.is_running());
        assert_eq!(timer.port().irq_enable, TimerIrq::UF);
        assert_eq!(ctx.sleep.holds(TIMER_EM_BLOCK), 0);
    }

    #[test]
    fn test_open_enabled_holds_em4() {
        let config = TimerConfig {
            enable: true,
            ..TimerConfig::pwm(1000, 10)
        };
        let (ctx, timer) = opened(config);
        assert!(timer.is_running());
        assert_eq!(ctx.sleep.holds(TIMER_EM_BLOCK), 1);
    }

    #[test]
    fn test_active_longer_than_period_rejected() {
        let ctx = NodeContext::new();
        let mut timer = PwmTimer::new(MockTimer::new(), TimerConfig::pwm(100, 200));
        assert_eq!(
            timer.open(&ctx),
            Err(Fault::InvalidConfig(Peripheral::Timer))
        );
    }

    #[test]
    fn test_dead_clock_detected() {
        let ctx = NodeContext::new();
        let mut port = MockTimer::new();
        port.can_run = false;
        let mut timer = PwmTimer::new(port, TimerConfig::default());
        assert_eq!(timer.open(&ctx), Err(Fault::ClockTree(Peripheral::Timer)));
    }

    #[test]
    fn test_start_is_idempotent() {
        let (ctx, mut timer) = opened(TimerConfig::default());
        timer.start(&ctx, true).unwrap();
        timer.start(&ctx, true).unwrap();
        assert_eq!(ctx.sleep.holds(TIMER_EM_BLOCK), 1);

        timer.start(&ctx, false).unwrap();
        timer.start(&ctx, false).unwrap();
        assert_eq!(ctx.sleep.holds(TIMER_EM_BLOCK), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_conditions_post_events() {
        let config = TimerConfig {
            interrupts: TimerIrq::COMP0 | TimerIrq::COMP1 | TimerIrq::UF,
            ..TimerConfig::default()
        };
        let (ctx, mut timer) = opened(config);
        timer.port_mut().raise(TimerIrq::UF | TimerIrq::COMP1);
        timer.on_interrupt(&ctx).unwrap();
        assert_eq!(
            ctx.scheduler.pending(),
            Events::TIMER_UF | Events::TIMER_COMP1
        );
        assert!(timer.port().pending.is_empty());
    }

    #[test]
    fn test_disabled_conditions_are_cleared_not_posted() {
        let (ctx, mut timer) = opened(TimerConfig::default());
        timer.port_mut().raise(TimerIrq::COMP0 | TimerIrq::UF);
        timer.on_interrupt(&ctx).unwrap();
        assert_eq!(ctx.scheduler.pending(), Events::TIMER_UF);
        assert!(timer.port().pending.is_empty());
    }
}

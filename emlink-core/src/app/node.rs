//! The sensor node
//!
//! Control flow per period:
//!
//! ```text
//! TIMER_UF ──► start_measurement ──► (bus interrupts) ──► SENSOR_DONE
//!                                                            │
//!        LINK_TX_DONE ◄── (link interrupts) ◄── write report ◄┘
//!             │
//!             └──► drain next queued report
//! ```

use emlink_hal::{EnergyMode, OutputPin, PowerPort};
use emlink_protocol::{Command, Report, TempUnit};

use crate::config::NodeConfig;
use crate::context::NodeContext;
use crate::fault::Fault;
use crate::scheduler::Events;
use crate::traits::{Ticker, TemperatureSensor, TextLink};

/// Sensor node orchestrator
pub struct Node<'a, S, L, T, P> {
    ctx: &'a NodeContext,
    sensor: S,
    link: L,
    timer: T,
    indicator: P,
    config: NodeConfig,
    unit: TempUnit,
}

impl<'a, S, L, T, P> Node<'a, S, L, T, P>
where
    S: TemperatureSensor,
    L: TextLink,
    T: Ticker,
    P: OutputPin,
{
    pub fn new(
        ctx: &'a NodeContext,
        sensor: S,
        link: L,
        timer: T,
        indicator: P,
        config: NodeConfig,
    ) -> Self {
        Self {
            ctx,
            sensor,
            link,
            timer,
            indicator,
            unit: config.unit,
            config,
        }
    }

    /// Bring up every peripheral and post `BOOT`
    pub fn setup(&mut self) -> Result<(), Fault> {
        self.ctx.initialize();
        self.timer.open(self.ctx)?;
        self.sensor.open(self.ctx)?;
        self.link.open(self.ctx)?;
        self.ctx.post(Events::BOOT);
        Ok(())
    }

    /// Run every driver's interrupt entry
    pub fn service_interrupts(&mut self) -> Result<(), Fault> {
        self.timer.on_interrupt(self.ctx)?;
        self.sensor.on_interrupt(self.ctx)?;
        self.link.on_interrupt(self.ctx)
    }

    /// Handle every pending event once, lowest bit first
    ///
    /// Returns the events that were dispatched.
    pub fn dispatch_pending(&mut self) -> Result<Events, Fault> {
        let pending = self.ctx.scheduler.pending();
        // Unnamed bits come last, as one value
        for event in pending.iter() {
            self.dispatch(event)?;
        }
        Ok(pending)
    }

    /// Handle one event
    pub fn dispatch(&mut self, event: Events) -> Result<(), Fault> {
        if event == Events::TIMER_COMP0 || event == Events::TIMER_COMP1 {
            self.ctx.scheduler.remove(event);
            Ok(())
        } else if event == Events::TIMER_UF {
            self.on_timer_underflow()
        } else if event == Events::SENSOR_DONE {
            self.on_sensor_done()
        } else if event == Events::LINK_RX_DONE {
            self.on_link_rx_done();
            Ok(())
        } else if event == Events::LINK_TX_DONE {
            self.on_link_tx_done()
        } else if event == Events::BOOT {
            self.on_boot()
        } else {
            // No handler; clear so the node can sleep
            self.ctx.scheduler.remove(event);
            Ok(())
        }
    }

    /// Sleep at the deepest permitted mode if nothing is pending
    pub fn idle<W: PowerPort>(&self, power: &mut W) -> Option<EnergyMode> {
        self.ctx.idle(power)
    }

    fn on_timer_underflow(&mut self) -> Result<(), Fault> {
        self.ctx.scheduler.remove(Events::TIMER_UF);
        self.sensor.start_measurement(self.ctx)
    }

    fn on_sensor_done(&mut self) -> Result<(), Fault> {
        self.ctx.scheduler.remove(Events::SENSOR_DONE);

        let fahrenheit = self.sensor.read_fahrenheit();
        let value = match self.unit {
            TempUnit::Celsius => self.sensor.read_celsius(),
            TempUnit::Fahrenheit => fahrenheit,
        };
        if let Some(report) = Report::temperature(value, self.unit) {
            self.link.write(self.ctx, report.as_str())?;
        }

        self.indicator.set_state(fahrenheit >= self.config.threshold_f);
        Ok(())
    }

    fn on_link_rx_done(&mut self) {
        self.ctx.scheduler.remove(Events::LINK_RX_DONE);
        if let Some(Command::SetUnit(unit)) = Command::parse(self.link.command()) {
            self.unit = unit;
        }
    }

    fn on_link_tx_done(&mut self) -> Result<(), Fault> {
        self.ctx.scheduler.remove(Events::LINK_TX_DONE);
        self.link.drain(self.ctx)
    }

    fn on_boot(&mut self) -> Result<(), Fault> {
        self.ctx.scheduler.remove(Events::BOOT);
        if let Some(name) = self.config.module_name {
            self.link.program_name(name.as_str())?;
        }
        self.timer.start(self.ctx, true)
    }

    /// Unit used for reports
    pub fn unit(&self) -> TempUnit {
        self.unit
    }

    pub fn context(&self) -> &'a NodeContext {
        self.ctx
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn indicator(&self) -> &P {
        &self.indicator
    }

    /// Split back into parts
    pub fn release(self) -> (S, L, T, P) {
        (self.sensor, self.link, self.timer, self.indicator)
    }
}

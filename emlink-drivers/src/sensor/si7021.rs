//! Si7021 humidity/temperature sensor
//!
//! Temperature is measured with the "no hold master" command: the sensor
//! NACKs its read address until the conversion is done, which the bus
//! master retries. The result is a 16-bit big-endian code.
//!
//! Conversions (datasheet):
//! - °C = 175.72 × code / 65536 − 46.85
//! - °F = 316.296 × code / 65536 − 52.33
//!
//! Both are computed from the code directly and truncated to one decimal.

use emlink_core::traits::TemperatureSensor;
use emlink_core::{Events, Fault, NodeContext};
use emlink_hal::TwiPort;

use crate::twi::{BusConfig, Transaction, TwiMaster};

/// 7-bit bus address
pub const SI7021_ADDR: u8 = 0x40;

/// Measure temperature, no hold master
pub const CMD_MEASURE_TEMP_NO_HOLD: u8 = 0xF3;

/// Sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Si7021Config {
    pub bus: BusConfig,
    /// Posted when a reading lands
    pub done: Events,
}

impl Default for Si7021Config {
    fn default() -> Self {
        Self {
            bus: BusConfig::STANDARD,
            done: Events::SENSOR_DONE,
        }
    }
}

/// Full-scale divisor of the temperature code
const CODE_SCALE: i64 = 65536;

/// `(slope × code − offset × 65536) / (scale × 65536)` to tenths, truncated
/// toward zero in exact integer arithmetic.
fn tenths(raw: u16, slope: i64, offset: i64, scale: i64) -> i32 {
    let numerator = (slope * i64::from(raw) - offset * CODE_SCALE) * 10;
    (numerator / (scale * CODE_SCALE)) as i32
}

/// Temperature code to degrees Celsius
pub fn celsius_from_raw(raw: u16) -> f32 {
    tenths(raw, 17_572, 4_685, 100) as f32 / 10.0
}

/// Temperature code to degrees Fahrenheit
pub fn fahrenheit_from_raw(raw: u16) -> f32 {
    tenths(raw, 316_296, 52_330, 1_000) as f32 / 10.0
}

/// Si7021 on an interrupt driven bus
pub struct Si7021<P> {
    bus: TwiMaster<P>,
    done: Events,
    raw: u16,
}

impl<P: TwiPort> Si7021<P> {
    pub fn new(port: P, config: Si7021Config) -> Self {
        Self {
            bus: TwiMaster::new(port, config.bus),
            done: config.done,
            raw: 0,
        }
    }

    /// Open and recover the bus
    pub fn open(&mut self) -> Result<(), Fault> {
        self.bus.open()
    }

    /// Start a conversion; the reading lands in `on_interrupt`
    pub fn start_measurement(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        let txn = Transaction::read(SI7021_ADDR, CMD_MEASURE_TEMP_NO_HOLD, self.done);
        self.bus.start_transaction(ctx, txn)
    }

    pub fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        if let Some(txn) = self.bus.on_interrupt(ctx)? {
            self.raw = txn.value();
        }
        Ok(())
    }

    /// Last temperature code
    pub fn raw(&self) -> u16 {
        self.raw
    }

    pub fn celsius(&self) -> f32 {
        celsius_from_raw(self.raw)
    }

    pub fn fahrenheit(&self) -> f32 {
        fahrenheit_from_raw(self.raw)
    }

    pub fn bus(&self) -> &TwiMaster<P> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut TwiMaster<P> {
        &mut self.bus
    }
}

impl<P: TwiPort> TemperatureSensor for Si7021<P> {
    fn open(&mut self, _ctx: &NodeContext) -> Result<(), Fault> {
        Si7021::open(self)
    }

    fn start_measurement(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        Si7021::start_measurement(self, ctx)
    }

    fn read_celsius(&self) -> f32 {
        self.celsius()
    }

    fn read_fahrenheit(&self) -> f32 {
        self.fahrenheit()
    }

    fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        Si7021::on_interrupt(self, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTwi;
    use emlink_hal::TwiIrq;

    fn close(a: f32, b: f32) -> bool {
        let diff = a - b;
        diff < 0.01 && diff > -0.01
    }

    #[test]
    fn test_conversion_formulas() {
        // 0x6489: 22.158 °C, 71.884 °F before truncation
        assert!(close(celsius_from_raw(0x6489), 22.1));
        assert!(close(fahrenheit_from_raw(0x6489), 71.8));

        // 0x6429: 21.900 °C
        assert!(close(celsius_from_raw(0x6429), 21.9));
    }

    #[test]
    fn test_fahrenheit_is_not_derived_from_celsius() {
        // Converting the truncated Celsius value would give 71.78
        let raw = 0x6489;
        let via_celsius = celsius_from_raw(raw) * 1.8 + 32.0;
        assert!(!close(via_celsius, fahrenheit_from_raw(raw)));
    }

    #[test]
    fn test_truncates_toward_zero() {
        // -46.85 exactly at code 0
        assert!(close(celsius_from_raw(0), -46.8));
        assert!(close(fahrenheit_from_raw(0), -52.3));
    }

    #[test]
    fn test_exact_tenth_boundaries() {
        // 16810: exactly 28.8000012 °F
        assert_eq!((fahrenheit_from_raw(16810) * 10.0).round() as i32, 288);
        // 26424: 23.9999951 °C stays below 24.0
        assert_eq!((celsius_from_raw(26424) * 10.0).round() as i32, 239);
    }

    #[test]
    fn test_full_scale() {
        // 0xFFFF: 128.867 °C, 263.961 °F
        assert!(close(celsius_from_raw(u16::MAX), 128.8));
        assert!(close(fahrenheit_from_raw(u16::MAX), 263.9));
    }

    #[test]
    fn test_measurement_through_bus() {
        let ctx = NodeContext::new();
        let mut sensor = Si7021::new(MockTwi::new(), Si7021Config::default());
        sensor.open().unwrap();
        sensor.start_measurement(&ctx).unwrap();

        for irq in [TwiIrq::ACK, TwiIrq::ACK, TwiIrq::NACK, TwiIrq::ACK] {
            sensor.bus_mut().port_mut().raise(irq);
            sensor.on_interrupt(&ctx).unwrap();
        }
        for byte in [0x64, 0x89] {
            sensor.bus_mut().port_mut().receive(byte);
            sensor.on_interrupt(&ctx).unwrap();
        }
        assert_eq!(sensor.raw(), 0);
        sensor.bus_mut().port_mut().raise(TwiIrq::MSTOP);
        sensor.on_interrupt(&ctx).unwrap();

        assert_eq!(sensor.raw(), 0x6489);
        assert_eq!(ctx.scheduler.pending(), Events::SENSOR_DONE);
        assert!(close(sensor.read_celsius(), 22.1));
        assert!(close(sensor.read_fahrenheit(), 71.8));
        assert_eq!(&sensor.bus().port().tx[..2], &[0x80, CMD_MEASURE_TEMP_NO_HOLD]);
    }
}

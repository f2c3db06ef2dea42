//! Temperature sensor trait

use crate::context::NodeContext;
use crate::fault::Fault;

/// Non-blocking temperature sensor
///
/// `start_measurement` kicks off a bus transaction and returns at once;
/// the sensor's completion event is posted from `on_interrupt` when the
/// reading lands.
pub trait TemperatureSensor {
    /// Bring up the bus and the sensor
    fn open(&mut self, ctx: &NodeContext) -> Result<(), Fault>;

    /// Start one measurement
    fn start_measurement(&mut self, ctx: &NodeContext) -> Result<(), Fault>;

    /// Last reading in degrees Celsius, one decimal
    fn read_celsius(&self) -> f32;

    /// Last reading in degrees Fahrenheit, one decimal
    fn read_fahrenheit(&self) -> f32;

    /// Service pending bus conditions
    fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault>;
}

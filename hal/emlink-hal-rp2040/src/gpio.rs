//! Indicator output

use embassy_rp::gpio::Output;
use emlink_hal::OutputPin;

/// Push-pull LED
pub struct Led<'d> {
    pin: Output<'d>,
}

impl<'d> Led<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for Led<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

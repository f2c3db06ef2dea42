//! Bit-banged two-wire master
//!
//! Each register write runs the bus step it stands for and latches the
//! condition the hardware would raise when that step finishes:
//!
//! | Write                     | Bus activity                 | Latched            |
//! |---------------------------|------------------------------|--------------------|
//! | `START`                   | (repeated) start             | `START`            |
//! | `write_tx` (write byte)   | 8 bits out, ack bit in       | `ACK` or `NACK`    |
//! | `write_tx` (read address) | as above, then 8 bits in     | `ACK` + `RXDATAV`  |
//! | `ACK`                     | ack bit out, 8 bits in       | `RXDATAV`          |
//! | `NACK \| STOP`            | nack bit out, stop           | `MSTOP`            |
//!
//! Both lines are open drain: released lines float high on the pull-ups.

use embassy_rp::gpio::{Flex, Pull};
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;

use emlink_hal::{TwiCommand, TwiConfig, TwiIrq, TwiPort};

/// Half periods to wait for a slave stretching SCL
const STRETCH_LIMIT: u32 = 1000;

pub struct BitBangTwi<'d> {
    scl: Flex<'d>,
    sda: Flex<'d>,
    delay: Delay,
    half_period_us: u32,
    enabled: bool,
    /// A start has been issued and no stop yet
    bus_owned: bool,
    /// Next `write_tx` is an address byte
    address_phase: bool,
    rx: u8,
    pending: TwiIrq,
    irq_enable: TwiIrq,
}

impl<'d> BitBangTwi<'d> {
    pub fn new(mut scl: Flex<'d>, mut sda: Flex<'d>) -> Self {
        scl.set_pull(Pull::Up);
        sda.set_pull(Pull::Up);
        scl.set_as_input();
        sda.set_as_input();
        Self {
            scl,
            sda,
            delay: Delay,
            half_period_us: 5,
            enabled: false,
            bus_owned: false,
            address_phase: false,
            rx: 0,
            pending: TwiIrq::empty(),
            irq_enable: TwiIrq::empty(),
        }
    }

    fn release(line: &mut Flex<'d>) {
        line.set_as_input();
    }

    fn pull_low(line: &mut Flex<'d>) {
        line.set_low();
        line.set_as_output();
    }

    fn set_sda(&mut self, high: bool) {
        if high {
            Self::release(&mut self.sda);
        } else {
            Self::pull_low(&mut self.sda);
        }
    }

    fn wait(&mut self) {
        self.delay.delay_us(self.half_period_us);
    }

    /// Release SCL and wait out clock stretching
    fn scl_high(&mut self) {
        Self::release(&mut self.scl);
        let mut spins = 0;
        while self.scl.is_low() && spins < STRETCH_LIMIT {
            self.wait();
            spins += 1;
        }
    }

    fn scl_low(&mut self) {
        Self::pull_low(&mut self.scl);
    }

    fn start_condition(&mut self) {
        if self.bus_owned {
            self.set_sda(true);
            self.wait();
            self.scl_high();
            self.wait();
        }
        self.set_sda(false);
        self.wait();
        self.scl_low();
        self.bus_owned = true;
    }

    fn stop_condition(&mut self) {
        self.set_sda(false);
        self.wait();
        self.scl_high();
        self.wait();
        self.set_sda(true);
        self.wait();
        self.bus_owned = false;
    }

    fn write_bit(&mut self, high: bool) {
        self.set_sda(high);
        self.wait();
        self.scl_high();
        self.wait();
        self.scl_low();
    }

    fn read_bit(&mut self) -> bool {
        self.set_sda(true);
        self.wait();
        self.scl_high();
        self.wait();
        let bit = self.sda.is_high();
        self.scl_low();
        bit
    }

    /// Returns true when the slave acknowledged
    fn write_byte(&mut self, byte: u8) -> bool {
        for bit in (0..8).rev() {
            self.write_bit(byte & (1 << bit) != 0);
        }
        !self.read_bit()
    }

    fn read_byte(&mut self) -> u8 {
        (0..8).fold(0u8, |acc, _| (acc << 1) | u8::from(self.read_bit()))
    }

    fn receive(&mut self) {
        self.rx = self.read_byte();
        self.pending |= TwiIrq::RXDATAV;
    }
}

impl TwiPort for BitBangTwi<'_> {
    fn configure(&mut self, config: &TwiConfig) {
        let frequency = config.frequency.max(1);
        self.half_period_us = (500_000 / frequency).max(1);
        self.enabled = true;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn scl_is_high(&self) -> bool {
        self.scl.is_high()
    }

    fn sda_is_high(&self) -> bool {
        self.sda.is_high()
    }

    fn drive_scl(&mut self, high: bool) {
        if high {
            self.scl_high();
        } else {
            self.scl_low();
        }
        self.wait();
    }

    fn drive_sda(&mut self, high: bool) {
        self.set_sda(high);
    }

    fn command(&mut self, cmd: TwiCommand) {
        if cmd.contains(TwiCommand::ABORT) {
            Self::release(&mut self.sda);
            Self::release(&mut self.scl);
            self.bus_owned = false;
            self.address_phase = false;
            return;
        }
        if cmd.contains(TwiCommand::START) {
            self.start_condition();
            self.address_phase = true;
            self.pending |= TwiIrq::START;
        }
        if cmd.contains(TwiCommand::ACK) {
            self.write_bit(false);
            self.receive();
        }
        if cmd.contains(TwiCommand::NACK) {
            self.write_bit(true);
        }
        if cmd.contains(TwiCommand::STOP) {
            self.stop_condition();
            self.pending |= TwiIrq::MSTOP;
        }
    }

    fn write_tx(&mut self, byte: u8) {
        let reading = self.address_phase && byte & 1 == 1;
        self.address_phase = false;
        if self.write_byte(byte) {
            self.pending |= TwiIrq::ACK;
            if reading {
                self.receive();
            }
        } else {
            self.pending |= TwiIrq::NACK;
        }
    }

    fn read_rx(&mut self) -> u8 {
        self.rx
    }

    fn set_flags(&mut self, flags: TwiIrq) {
        self.pending |= flags;
    }

    fn pending_flags(&self) -> TwiIrq {
        self.pending
    }

    fn clear_flags(&mut self, flags: TwiIrq) {
        self.pending.remove(flags);
    }

    fn set_interrupts(&mut self, irq: TwiIrq) {
        self.irq_enable = irq;
    }

    fn enabled_interrupts(&self) -> TwiIrq {
        self.irq_enable
    }
}

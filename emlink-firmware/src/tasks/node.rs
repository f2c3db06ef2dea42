//! Node task
//!
//! Stands in for the interrupt handlers: feeds received bytes and timer
//! deadlines into the ports, services every latched condition, dispatches
//! pending events and then waits for the next byte or deadline.

use defmt::*;
use embassy_futures::select::select;
use embassy_time::{Instant, Timer};

use emlink_core::app::Node;
use emlink_core::Fault;
use emlink_drivers::ble::Hm10;
use emlink_drivers::letimer::PwmTimer;
use emlink_drivers::sensor::Si7021;
use emlink_hal::{LinkPort, TimerPort, TwiPort};
use emlink_hal_rp2040::{BitBangTwi, DeadlineTimer, Led, PowerLog, SoftLink};

use crate::channels::{LINK_RX, WAKE};

pub type FirmwareNode = Node<
    'static,
    Si7021<BitBangTwi<'static>>,
    Hm10<SoftLink<'static>>,
    PwmTimer<DeadlineTimer>,
    Led<'static>,
>;

/// Halt on fatal faults, log and carry on otherwise
pub fn check<T>(result: Result<T, Fault>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(fault) if fault.is_fatal() => {
            error!("Fatal fault: {}", fault);
            defmt::panic!("halted on {}", fault)
        }
        Err(fault) => {
            warn!("Recoverable fault: {}", fault);
            None
        }
    }
}

fn conditions_pending(node: &FirmwareNode) -> bool {
    let twi = node.sensor().bus().port();
    let link = node.link().link().port();
    let timer = node.timer().port();
    twi.pending_flags().intersects(twi.enabled_interrupts())
        || link.pending_flags().intersects(link.enabled_interrupts())
        || timer.pending_flags().intersects(timer.enabled_interrupts())
}

/// Service latched conditions until every port is quiet
pub fn pump(node: &mut FirmwareNode) {
    loop {
        check(node.service_interrupts());
        if !conditions_pending(node) {
            break;
        }
    }
}

#[embassy_executor::task]
pub async fn node_task(node: &'static mut FirmwareNode, mut power: PowerLog) {
    info!("Node task started");

    loop {
        while let Ok(byte) = LINK_RX.try_receive() {
            node.link_mut().link_mut().port_mut().feed(byte);
            pump(node);
        }

        node.timer_mut().port_mut().poll(Instant::now());
        pump(node);

        while !node.context().scheduler.is_idle() {
            if let Some(events) = check(node.dispatch_pending()) {
                debug!("Dispatched {}", events);
            }
            pump(node);
        }

        if let Some(mode) = node.idle(&mut power) {
            trace!("Idle in {}", mode);
        }

        let deadline = node.timer().port().next_deadline().unwrap_or(Instant::MAX);
        select(WAKE.wait(), Timer::at(deadline)).await;
    }
}

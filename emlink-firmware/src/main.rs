//! emlink - Low-Energy Sensor Node Firmware
//!
//! Periodically measures temperature from an Si7021 on a two-wire bus and
//! reports it over an HM-10 BLE module. `<tempC>` / `<tempF>` sent to the
//! module switch the report unit; the LED lights at or above the
//! configured threshold.
//!
//! Wiring (Raspberry Pi Pico):
//! - GPIO0/GPIO1: UART0 TX/RX to the HM-10
//! - GPIO4/GPIO5: SDA/SCL to the Si7021 (external pull-ups)
//! - GPIO25: indicator LED

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{InterruptHandler as UartInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use emlink_core::app::Node;
use emlink_core::NodeContext;
use emlink_drivers::ble::Hm10;
use emlink_drivers::letimer::{PwmTimer, TimerConfig};
use emlink_drivers::link::LinkConfig;
use emlink_drivers::sensor::{Si7021, Si7021Config};
use emlink_hal_rp2040::{rp_uart_config, BitBangTwi, DeadlineTimer, Led, PowerLog, SoftLink};

mod channels;
mod tasks;

include!(concat!(env!("OUT_DIR"), "/node_config.rs"));

bind_interrupts!(struct Irqs {
    UART0_IRQ => UartInterruptHandler<UART0>;
});

/// Event mask and sleep holds shared by every driver
static CONTEXT: NodeContext = NodeContext::new();

// Must live forever for the node task
static NODE: StaticCell<tasks::FirmwareNode> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("emlink firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = NODE_CONFIG;
    info!(
        "Node config: period={}ms active={}ms unit={} threshold={}F",
        config.period_ms,
        config.active_ms,
        config.unit,
        config.threshold_f
    );

    // HM-10 on UART0
    let link_config = LinkConfig::HM10;
    let uart_config = unwrap!(rp_uart_config(&link_config.uart));
    let uart = Uart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();
    let link = Hm10::new(SoftLink::new(tx, rx), link_config);
    info!("UART initialized for HM-10");

    // Si7021 on bit-banged SDA=GPIO4, SCL=GPIO5
    let twi = BitBangTwi::new(Flex::new(p.PIN_5), Flex::new(p.PIN_4));
    let sensor = Si7021::new(twi, Si7021Config::default());

    let timer = PwmTimer::new(
        DeadlineTimer::new(),
        TimerConfig::pwm(config.period_ms, config.active_ms),
    );
    let led = Led::new(Output::new(p.PIN_25, Level::Low));

    let node = NODE.init(Node::new(&CONTEXT, sensor, link, timer, led, config));

    // Init order: sleep, scheduler, timer, sensor, link, then BOOT
    tasks::check(node.setup());
    tasks::pump(node);
    info!("Drivers open");

    // BOOT programs the module with blocking reads, before the receiver
    // moves to its task
    tasks::check(node.dispatch_pending());
    tasks::pump(node);
    let rx = unwrap!(node.link_mut().link_mut().port_mut().detach_rx());

    spawner.spawn(tasks::link_rx_task(rx)).unwrap();
    spawner.spawn(tasks::node_task(node, PowerLog::new())).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

//! Scripted peripheral ports for host tests

use heapless::{Deque, Vec};

use emlink_hal::{
    EnergyMode, LinkCommand, LinkIrq, LinkPort, LinkStatus, OutputPin, PowerPort, TimerIrq,
    TimerPort, TimerSettings, TwiCommand, TwiConfig, TwiIrq, TwiPort, UartConfig, UartRx, UartTx,
};

/// Two-wire master registers
pub struct MockTwi {
    pub config: Option<TwiConfig>,
    pub enabled: bool,
    pub scl: bool,
    pub sda: bool,
    pub scl_pulses: u8,
    pub flags_latch: bool,
    pub pending: TwiIrq,
    pub irq_enable: TwiIrq,
    pub commands: Vec<TwiCommand, 64>,
    pub tx: Vec<u8, 64>,
    pub rx: Deque<u8, 8>,
}

impl MockTwi {
    pub fn new() -> Self {
        Self {
            config: None,
            enabled: false,
            scl: true,
            sda: true,
            scl_pulses: 0,
            flags_latch: true,
            pending: TwiIrq::empty(),
            irq_enable: TwiIrq::empty(),
            commands: Vec::new(),
            tx: Vec::new(),
            rx: Deque::new(),
        }
    }

    /// Raise a condition as the hardware would
    pub fn raise(&mut self, irq: TwiIrq) {
        self.pending |= irq;
    }

    /// Raise RXDATAV with `byte` in the receive register
    pub fn receive(&mut self, byte: u8) {
        self.rx.push_back(byte).unwrap();
        self.pending |= TwiIrq::RXDATAV;
    }

    pub fn issued(&self, cmd: TwiCommand) -> usize {
        self.commands.iter().filter(|c| c.contains(cmd)).count()
    }
}

impl TwiPort for MockTwi {
    fn configure(&mut self, config: &TwiConfig) {
        self.config = Some(*config);
        self.enabled = true;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn scl_is_high(&self) -> bool {
        self.scl
    }

    fn sda_is_high(&self) -> bool {
        self.sda
    }

    fn drive_scl(&mut self, high: bool) {
        if high && !self.scl {
            self.scl_pulses += 1;
        }
        self.scl = high;
    }

    fn drive_sda(&mut self, high: bool) {
        self.sda = high;
    }

    fn command(&mut self, cmd: TwiCommand) {
        self.commands.push(cmd).unwrap();
    }

    fn write_tx(&mut self, byte: u8) {
        self.tx.push(byte).unwrap();
    }

    fn read_rx(&mut self) -> u8 {
        self.rx.pop_front().unwrap()
    }

    fn set_flags(&mut self, flags: TwiIrq) {
        if self.flags_latch {
            self.pending |= flags;
        }
    }

    fn pending_flags(&self) -> TwiIrq {
        self.pending
    }

    fn clear_flags(&mut self, flags: TwiIrq) {
        self.pending -= flags;
    }

    fn set_interrupts(&mut self, irq: TwiIrq) {
        self.irq_enable = irq;
    }

    fn enabled_interrupts(&self) -> TwiIrq {
        self.irq_enable
    }
}

#[derive(Debug)]
pub struct MockError;

/// Low-energy UART registers
pub struct MockLink {
    pub config: Option<UartConfig>,
    pub start_frame: u8,
    pub signal_frame: u8,
    pub start_frame_sticks: bool,
    pub ignore_enable: bool,
    pub status: LinkStatus,
    pub pending: LinkIrq,
    pub irq_enable: LinkIrq,
    pub commands: Vec<LinkCommand, 64>,
    /// Bytes written through the interrupt driven path
    pub tx: Vec<u8, 128>,
    pub rx: Deque<u8, 8>,
    /// Bytes written with interrupts masked
    pub blocking_tx: Vec<u8, 128>,
    /// Scripted module responses
    pub blocking_rx: Deque<u8, 64>,
}

impl MockLink {
    pub fn new() -> Self {
        Self {
            config: None,
            start_frame: 0,
            signal_frame: 0,
            start_frame_sticks: true,
            ignore_enable: false,
            status: LinkStatus::empty(),
            pending: LinkIrq::empty(),
            irq_enable: LinkIrq::empty(),
            commands: Vec::new(),
            tx: Vec::new(),
            rx: Deque::new(),
            blocking_tx: Vec::new(),
            blocking_rx: Deque::new(),
        }
    }

    pub fn raise(&mut self, irq: LinkIrq) {
        self.pending |= irq;
    }

    pub fn receive(&mut self, byte: u8) {
        self.rx.push_back(byte).unwrap();
        self.pending |= LinkIrq::RXDATAV;
    }

    pub fn respond(&mut self, text: &str) {
        for &b in text.as_bytes() {
            self.blocking_rx.push_back(b).unwrap();
        }
    }

    pub fn issued(&self, cmd: LinkCommand) -> usize {
        self.commands.iter().filter(|c| c.contains(cmd)).count()
    }
}

impl UartTx for MockLink {
    type Error = MockError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.blocking_tx.extend_from_slice(data).map_err(|_| MockError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl UartRx for MockLink {
    type Error = MockError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        for slot in buf.iter_mut() {
            *slot = self.blocking_rx.pop_front().ok_or(MockError)?;
        }
        Ok(buf.len())
    }
}

impl LinkPort for MockLink {
    fn configure(&mut self, config: &UartConfig) {
        self.config = Some(*config);
        if !self.ignore_enable {
            self.status.set(LinkStatus::RXENS, config.rx_enable);
            self.status.set(LinkStatus::TXENS, config.tx_enable);
        }
    }

    fn set_start_frame(&mut self, byte: u8) {
        if self.start_frame_sticks {
            self.start_frame = byte;
        }
    }

    fn start_frame(&self) -> u8 {
        self.start_frame
    }

    fn set_signal_frame(&mut self, byte: u8) {
        self.signal_frame = byte;
    }

    fn command(&mut self, cmd: LinkCommand) {
        self.commands.push(cmd).unwrap();
        if cmd.contains(LinkCommand::RXEN) {
            self.status.insert(LinkStatus::RXENS);
        }
        if cmd.contains(LinkCommand::RXDIS) {
            self.status.remove(LinkStatus::RXENS);
        }
        if cmd.contains(LinkCommand::TXEN) {
            self.status.insert(LinkStatus::TXENS);
        }
        if cmd.contains(LinkCommand::TXDIS) {
            self.status.remove(LinkStatus::TXENS);
        }
        if cmd.contains(LinkCommand::RXBLOCKEN) {
            self.status.insert(LinkStatus::RXBLOCK);
        }
        if cmd.contains(LinkCommand::RXBLOCKDIS) {
            self.status.remove(LinkStatus::RXBLOCK);
        }
        if cmd.contains(LinkCommand::CLEARRX) {
            self.rx.clear();
        }
    }

    fn status(&self) -> LinkStatus {
        self.status
    }

    fn write_tx(&mut self, byte: u8) {
        self.tx.push(byte).unwrap();
    }

    fn read_rx(&mut self) -> u8 {
        self.rx.pop_front().unwrap()
    }

    fn pending_flags(&self) -> LinkIrq {
        self.pending
    }

    fn clear_flags(&mut self, flags: LinkIrq) {
        self.pending -= flags;
    }

    fn set_interrupts(&mut self, irq: LinkIrq) {
        self.irq_enable = irq;
    }

    fn enabled_interrupts(&self) -> LinkIrq {
        self.irq_enable
    }
}

/// Low-energy timer registers
pub struct MockTimer {
    pub settings: Option<TimerSettings>,
    pub running: bool,
    pub can_run: bool,
    pub pending: TimerIrq,
    pub irq_enable: TimerIrq,
}

impl MockTimer {
    pub fn new() -> Self {
        Self {
            settings: None,
            running: false,
            can_run: true,
            pending: TimerIrq::empty(),
            irq_enable: TimerIrq::empty(),
        }
    }

    pub fn raise(&mut self, irq: TimerIrq) {
        self.pending |= irq;
    }
}

impl TimerPort for MockTimer {
    fn tick_hz(&self) -> u32 {
        1000
    }

    fn configure(&mut self, settings: &TimerSettings) {
        self.settings = Some(*settings);
    }

    fn set_running(&mut self, run: bool) {
        self.running = run && self.can_run;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn pending_flags(&self) -> TimerIrq {
        self.pending
    }

    fn clear_flags(&mut self, flags: TimerIrq) {
        self.pending -= flags;
    }

    fn set_interrupts(&mut self, irq: TimerIrq) {
        self.irq_enable = irq;
    }

    fn enabled_interrupts(&self) -> TimerIrq {
        self.irq_enable
    }
}

/// Indicator LED
#[derive(Default)]
pub struct MockPin {
    pub high: bool,
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Records every sleep entry
#[derive(Default)]
pub struct MockPower {
    pub entered: Vec<EnergyMode, 16>,
}

impl PowerPort for MockPower {
    fn enter(&mut self, mode: EnergyMode) {
        self.entered.push(mode).unwrap();
    }
}

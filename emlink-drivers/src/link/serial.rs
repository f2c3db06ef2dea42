//! Serial link driver
//!
//! Transmit: `Idle → Transmitting → Draining → Idle`. Each TXBL writes the
//! next byte; once none are left TXBL is swapped for TXC, and TXC ends the
//! transmission.
//!
//! Receive: `Idle → Receiving → Idle`. The start frame byte unblocks the
//! receiver and (re)starts accumulation, the signal frame byte finalizes
//! the frame and blocks the receiver again.

use heapless::Vec;

use emlink_core::{Events, Fault, NodeContext, Peripheral};
use emlink_hal::{EnergyMode, LinkCommand, LinkIrq, LinkPort, LinkStatus, UartConfig};
use emlink_protocol::{FrameBuffer, Framing};

/// The link clock stops in EM3
pub const LINK_TX_EM_BLOCK: EnergyMode = EnergyMode::Em3;
pub const LINK_RX_EM_BLOCK: EnergyMode = EnergyMode::Em3;

/// Longest single transmission
pub const TX_CAPACITY: usize = 32;

/// Link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub uart: UartConfig,
    pub start_frame: u8,
    pub stop_frame: u8,
    /// Discard bytes until a start frame arrives
    pub rx_block: bool,
    pub tx_done: Events,
    pub rx_done: Events,
}

impl LinkConfig {
    /// HM-10 at 9600 8N1, commands framed as `<...>`
    pub const HM10: Self = Self {
        uart: UartConfig::HM10,
        start_frame: b'<',
        stop_frame: b'>',
        rx_block: true,
        tx_done: Events::LINK_TX_DONE,
        rx_done: Events::LINK_RX_DONE,
    };
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::HM10
    }
}

/// Permission to start one transmission
///
/// The link hands out a single token while idle and mints it again when
/// the transmission completes, so two transmissions can never overlap.
#[derive(Debug)]
pub struct TxToken {
    _private: (),
}

impl TxToken {
    fn new() -> Self {
        Self { _private: () }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    Idle,
    Transmitting,
    /// Last byte queued, waiting for the shift register to empty
    Draining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    Idle,
    Receiving,
}

/// Interrupt driven serial link
pub struct SerialLink<P> {
    port: P,
    config: LinkConfig,
    tx_state: TxState,
    tx: Vec<u8, TX_CAPACITY>,
    tx_pos: usize,
    token: Option<TxToken>,
    /// Receive EM3 hold taken by the first open
    rx_armed: bool,
    rx_state: RxState,
    rx: FrameBuffer,
    frame: FrameBuffer,
}

impl<P: LinkPort> SerialLink<P> {
    pub fn new(port: P, config: LinkConfig) -> Self {
        Self {
            port,
            config,
            tx_state: TxState::Idle,
            tx: Vec::new(),
            tx_pos: 0,
            token: Some(TxToken::new()),
            rx_armed: false,
            rx_state: RxState::Idle,
            rx: FrameBuffer::new(),
            frame: FrameBuffer::new(),
        }
    }

    /// Configure the link and arm framed receive
    ///
    /// Reopening is allowed only while the transmit token is home.
    pub fn open(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        if self.token.is_none() {
            return Err(Fault::LinkBusy);
        }
        let framing = Framing::new(self.config.start_frame, self.config.stop_frame)
            .map_err(|_| Fault::InvalidConfig(Peripheral::Link))?;

        // Low-frequency registers only take writes with the clock running
        let saved = self.port.start_frame();
        let toggled = saved ^ 0x01;
        self.port.set_start_frame(toggled);
        if self.port.start_frame() != toggled {
            return Err(Fault::ClockTree(Peripheral::Link));
        }
        self.port.set_start_frame(saved);

        let uart = self.config.uart;
        self.port.configure(&uart);
        if self.config.rx_block {
            self.port.command(LinkCommand::RXBLOCKEN);
        }
        self.port.set_start_frame(framing.start());
        self.port.set_signal_frame(framing.stop());
        self.port.command(LinkCommand::CLEARRX | LinkCommand::CLEARTX);

        let status = self.port.status();
        if status.contains(LinkStatus::RXENS) != uart.rx_enable
            || status.contains(LinkStatus::TXENS) != uart.tx_enable
        {
            return Err(Fault::EnableFailed(Peripheral::Link));
        }

        if !self.rx_armed {
            ctx.sleep.block(LINK_RX_EM_BLOCK)?;
            self.rx_armed = true;
        }

        self.port.clear_flags(LinkIrq::all());
        self.port.set_interrupts(LinkIrq::STARTF | LinkIrq::RXDATAV);
        self.rx_state = RxState::Idle;
        Ok(())
    }

    /// Take the transmit token if the link is idle
    pub fn try_acquire_tx(&mut self) -> Option<TxToken> {
        if self.tx_state == TxState::Idle {
            self.token.take()
        } else {
            None
        }
    }

    /// Hand back an unused token
    pub fn release_tx(&mut self, token: TxToken) {
        self.token = Some(token);
    }

    /// Start sending `bytes`; returns at once
    pub fn start_transmit(
        &mut self,
        ctx: &NodeContext,
        token: TxToken,
        bytes: &[u8],
    ) -> Result<(), Fault> {
        if bytes.len() > TX_CAPACITY {
            self.token = Some(token);
            return Err(Fault::MessageTooLong(bytes.len()));
        }
        if let Err(fault) = ctx.sleep.block(LINK_TX_EM_BLOCK) {
            self.token = Some(token);
            return Err(fault);
        }

        self.tx.clear();
        let copied = self.tx.extend_from_slice(bytes);
        debug_assert!(copied.is_ok(), "length checked above");
        self.tx_pos = 0;
        self.tx_state = TxState::Transmitting;
        self.port.enable_interrupts(LinkIrq::TXBL);
        Ok(())
    }

    pub fn is_transmitting(&self) -> bool {
        self.tx_state != TxState::Idle
    }

    pub fn is_receiving(&self) -> bool {
        self.rx_state == RxState::Receiving
    }

    pub fn tx_state(&self) -> TxState {
        self.tx_state
    }

    pub fn rx_state(&self) -> RxState {
        self.rx_state
    }

    /// Payload of the last finalized frame
    pub fn command(&self) -> &[u8] {
        self.frame.as_bytes()
    }

    /// Interrupt entry
    pub fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        let irq = self.port.take_interrupts();
        self.handle(ctx, irq)
    }

    /// Run both state machines for a set of conditions
    pub fn handle(&mut self, ctx: &NodeContext, irq: LinkIrq) -> Result<(), Fault> {
        if irq.contains(LinkIrq::STARTF) {
            self.on_start_frame();
        }
        if irq.contains(LinkIrq::RXDATAV) {
            self.on_rx_data()?;
        }
        if irq.contains(LinkIrq::SIGF) {
            self.on_signal_frame(ctx)?;
        }
        if irq.contains(LinkIrq::TXBL) {
            self.on_tx_buffer_level()?;
        }
        if irq.contains(LinkIrq::TXC) {
            self.on_tx_complete(ctx)?;
        }
        Ok(())
    }

    /// Last start wins: a start while receiving restarts the frame
    fn on_start_frame(&mut self) {
        self.rx.clear();
        self.rx_state = RxState::Receiving;
        self.port.enable_interrupts(LinkIrq::SIGF);
    }

    fn on_rx_data(&mut self) -> Result<(), Fault> {
        match self.rx_state {
            RxState::Receiving => {
                let byte = self.port.read_rx();
                self.rx.push(byte);
                Ok(())
            }
            RxState::Idle => Err(self.violation("RxIdle", LinkIrq::RXDATAV)),
        }
    }

    fn on_signal_frame(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        match self.rx_state {
            RxState::Receiving => {
                self.port
                    .command(LinkCommand::RXBLOCKEN | LinkCommand::CLEARRX);
                self.port.disable_interrupts(LinkIrq::SIGF);
                self.frame = self.rx.clone();
                self.rx_state = RxState::Idle;
                ctx.post(self.config.rx_done);
                Ok(())
            }
            RxState::Idle => Err(self.violation("RxIdle", LinkIrq::SIGF)),
        }
    }

    fn on_tx_buffer_level(&mut self) -> Result<(), Fault> {
        if self.tx_state != TxState::Transmitting {
            return Err(self.tx_violation(LinkIrq::TXBL));
        }
        match self.tx.get(self.tx_pos) {
            Some(&byte) => {
                self.port.write_tx(byte);
                self.tx_pos += 1;
            }
            None => {
                self.tx_state = TxState::Draining;
                self.port.disable_interrupts(LinkIrq::TXBL);
                self.port.enable_interrupts(LinkIrq::TXC);
            }
        }
        Ok(())
    }

    fn on_tx_complete(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        if self.tx_state != TxState::Draining {
            return Err(self.tx_violation(LinkIrq::TXC));
        }
        self.port.disable_interrupts(LinkIrq::TXC);
        self.tx_state = TxState::Idle;
        self.tx.clear();
        self.token = Some(TxToken::new());
        ctx.post(self.config.tx_done);
        ctx.sleep.unblock(LINK_TX_EM_BLOCK)
    }

    fn tx_violation(&self, condition: LinkIrq) -> Fault {
        let state = match self.tx_state {
            TxState::Idle => "TxIdle",
            TxState::Transmitting => "Transmitting",
            TxState::Draining => "Draining",
        };
        self.violation(state, condition)
    }

    fn violation(&self, state: &'static str, condition: LinkIrq) -> Fault {
        Fault::Protocol {
            peripheral: Peripheral::Link,
            state,
            condition: condition.bits(),
        }
    }

    /// Run `f` with direct blocking access to the port
    ///
    /// Call with interrupts masked. Receive blocking is lifted and both
    /// directions enabled for the duration; the previous enable and block
    /// state is restored afterwards and stale flags are cleared.
    pub fn blocking_session<R>(
        &mut self,
        f: impl FnOnce(&mut P) -> Result<R, Fault>,
    ) -> Result<R, Fault> {
        let status = self.port.status();
        let rx_blocked = status.contains(LinkStatus::RXBLOCK);
        let rx_enabled = status.contains(LinkStatus::RXENS);
        let tx_enabled = status.contains(LinkStatus::TXENS);

        if rx_blocked {
            self.port.command(LinkCommand::RXBLOCKDIS);
        }
        if !rx_enabled {
            self.port.command(LinkCommand::RXEN);
        }
        if !tx_enabled {
            self.port.command(LinkCommand::TXEN);
        }
        let now = self.port.status();
        if !now.contains(LinkStatus::RXENS | LinkStatus::TXENS) {
            return Err(Fault::EnableFailed(Peripheral::Link));
        }
        self.port.command(LinkCommand::CLEARRX | LinkCommand::CLEARTX);

        let result = f(&mut self.port);

        if !rx_enabled {
            self.port.command(LinkCommand::RXDIS);
        }
        if rx_blocked {
            self.port.command(LinkCommand::RXBLOCKEN);
        }
        if !tx_enabled {
            self.port.command(LinkCommand::TXDIS);
        }
        let stale = self.port.pending_flags();
        self.port.clear_flags(stale);

        result
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

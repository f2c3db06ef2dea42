//! Interrupt driven two-wire master

use emlink_core::{Fault, NodeContext, Peripheral};
use emlink_hal::{EnergyMode, TwiCommand, TwiConfig, TwiIrq, TwiPort};

use super::transaction::{Transaction, TwiState, DIR_READ, DIR_WRITE};

/// The bus clock stops in EM2
pub const TWI_EM_BLOCK: EnergyMode = EnergyMode::Em2;

/// Clock pulses that free a slave stuck mid-byte
const RECOVERY_CLOCKS: u8 = 9;

/// Conditions the engine runs on
const ENGINE_IRQ: TwiIrq = TwiIrq::ACK
    .union(TwiIrq::NACK)
    .union(TwiIrq::RXDATAV)
    .union(TwiIrq::MSTOP);

/// Bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    pub twi: TwiConfig,
    /// Give up after this many consecutive NACKs; `None` retries forever
    pub max_nack_retries: Option<u16>,
}

impl BusConfig {
    /// 100 kHz, unbounded retry
    pub const STANDARD: Self = Self {
        twi: TwiConfig::STANDARD,
        max_nack_retries: None,
    };
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Two-wire bus master
///
/// One transaction at a time. The descriptor is owned by the master while
/// in flight and handed back from [`on_interrupt`](Self::on_interrupt)
/// when the stop condition completes.
pub struct TwiMaster<P> {
    port: P,
    config: BusConfig,
    state: TwiState,
    transaction: Option<Transaction>,
    nacks: u16,
    total_retries: u32,
}

impl<P: TwiPort> TwiMaster<P> {
    pub fn new(port: P, config: BusConfig) -> Self {
        Self {
            port,
            config,
            state: TwiState::Idle,
            transaction: None,
            nacks: 0,
            total_retries: 0,
        }
    }

    /// Configure the peripheral and recover the bus
    pub fn open(&mut self) -> Result<(), Fault> {
        self.check_flag_logic()?;

        self.port.configure(&self.config.twi);
        if !self.port.is_enabled() {
            return Err(Fault::EnableFailed(Peripheral::Twi));
        }

        self.recover()?;

        self.port.set_interrupts(ENGINE_IRQ);
        self.state = TwiState::Idle;
        self.transaction = None;
        Ok(())
    }

    /// Flags only latch when the peripheral clock runs
    fn check_flag_logic(&mut self) -> Result<(), Fault> {
        let flag = TwiIrq::START;
        if self.port.pending_flags().contains(flag) {
            self.port.clear_flags(flag);
            if self.port.pending_flags().contains(flag) {
                return Err(Fault::ClockTree(Peripheral::Twi));
            }
        } else {
            self.port.set_flags(flag);
            if !self.port.pending_flags().contains(flag) {
                return Err(Fault::ClockTree(Peripheral::Twi));
            }
            self.port.clear_flags(flag);
        }
        Ok(())
    }

    /// Clock out a slave that is holding SDA, then reset the master
    pub fn recover(&mut self) -> Result<(), Fault> {
        if !self.port.scl_is_high() || !self.port.sda_is_high() {
            return Err(Fault::BusNotIdle);
        }

        self.port.command(TwiCommand::CLEAR_TX);
        let pending = self.port.pending_flags();
        self.port.clear_flags(pending);

        self.port.drive_sda(true);
        for _ in 0..RECOVERY_CLOCKS {
            self.port.drive_scl(false);
            self.port.drive_scl(true);
        }

        self.port.command(TwiCommand::ABORT);
        Ok(())
    }

    /// Start a read transaction
    pub fn start_transaction(
        &mut self,
        ctx: &NodeContext,
        transaction: Transaction,
    ) -> Result<(), Fault> {
        if self.state != TwiState::Idle {
            return Err(Fault::BusBusy);
        }
        ctx.sleep.block(TWI_EM_BLOCK)?;

        self.state = TwiState::Start;
        self.nacks = 0;
        self.port.command(TwiCommand::START);
        self.port.write_tx(transaction.address_byte(DIR_WRITE));
        self.transaction = Some(transaction);
        Ok(())
    }

    /// Interrupt entry
    ///
    /// Returns the finished transaction when the stop condition completes.
    pub fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<Option<Transaction>, Fault> {
        let irq = self.port.take_interrupts();
        self.handle(ctx, irq)
    }

    /// Run the state machine for a set of conditions
    pub fn handle(&mut self, ctx: &NodeContext, irq: TwiIrq) -> Result<Option<Transaction>, Fault> {
        if irq.contains(TwiIrq::ACK) {
            self.on_ack()?;
        }
        if irq.contains(TwiIrq::NACK) {
            self.on_nack(ctx)?;
        }
        if irq.contains(TwiIrq::RXDATAV) {
            self.on_rxdatav()?;
        }
        if irq.contains(TwiIrq::MSTOP) {
            return self.on_mstop(ctx).map(Some);
        }
        Ok(None)
    }

    fn on_ack(&mut self) -> Result<(), Fault> {
        let txn = self.current(TwiIrq::ACK)?;
        match self.state {
            TwiState::Start => {
                self.state = TwiState::CommandWrite;
                self.port.write_tx(txn.command);
            }
            TwiState::CommandWrite => {
                self.state = TwiState::CommandRestartRead;
                self.port.command(TwiCommand::START);
                self.port.write_tx(txn.address_byte(DIR_READ));
            }
            TwiState::CommandRestartRead => {
                self.state = TwiState::ReceiveHighByte;
            }
            _ => return Err(self.violation(TwiIrq::ACK)),
        }
        self.nacks = 0;
        Ok(())
    }

    fn on_nack(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        let txn = self.current(TwiIrq::NACK)?;
        if !matches!(
            self.state,
            TwiState::CommandWrite | TwiState::CommandRestartRead
        ) {
            return Err(self.violation(TwiIrq::NACK));
        }

        self.nacks = self.nacks.saturating_add(1);
        self.total_retries = self.total_retries.saturating_add(1);
        if let Some(max) = self.config.max_nack_retries {
            if self.nacks > max {
                return Err(self.abort(ctx));
            }
        }

        // Device busy: repeat the step it refused
        if self.state == TwiState::CommandWrite {
            self.port.write_tx(txn.command);
        } else {
            self.port.command(TwiCommand::START);
            self.port.write_tx(txn.address_byte(DIR_READ));
        }
        Ok(())
    }

    fn on_rxdatav(&mut self) -> Result<(), Fault> {
        match self.state {
            TwiState::ReceiveHighByte => {
                let byte = self.port.read_rx();
                self.data_mut(TwiIrq::RXDATAV)?[0] = byte;
                self.port.command(TwiCommand::ACK);
                self.state = TwiState::ReceiveLowByte;
            }
            TwiState::ReceiveLowByte => {
                let byte = self.port.read_rx();
                self.data_mut(TwiIrq::RXDATAV)?[1] = byte;
                self.port.command(TwiCommand::NACK | TwiCommand::STOP);
                self.state = TwiState::Done;
            }
            _ => return Err(self.violation(TwiIrq::RXDATAV)),
        }
        Ok(())
    }

    fn on_mstop(&mut self, ctx: &NodeContext) -> Result<Transaction, Fault> {
        if self.state != TwiState::Done {
            return Err(self.violation(TwiIrq::MSTOP));
        }
        let txn = self
            .transaction
            .take()
            .ok_or_else(|| self.violation(TwiIrq::MSTOP))?;
        self.state = TwiState::Idle;
        ctx.post(txn.done);
        ctx.sleep.unblock(TWI_EM_BLOCK)?;
        Ok(txn)
    }

    /// Retry budget exhausted: release the bus and report
    fn abort(&mut self, ctx: &NodeContext) -> Fault {
        let retries = self.nacks;
        self.port.command(TwiCommand::ABORT);
        self.state = TwiState::Idle;
        self.transaction = None;
        self.nacks = 0;
        match ctx.sleep.unblock(TWI_EM_BLOCK) {
            Ok(()) => Fault::DeviceTimeout { retries },
            Err(fault) => fault,
        }
    }

    fn current(&self, condition: TwiIrq) -> Result<Transaction, Fault> {
        self.transaction.ok_or_else(|| self.violation(condition))
    }

    fn data_mut(&mut self, condition: TwiIrq) -> Result<&mut [u8; 2], Fault> {
        let fault = self.violation(condition);
        self.transaction
            .as_mut()
            .map(|txn| &mut txn.data)
            .ok_or(fault)
    }

    fn violation(&self, condition: TwiIrq) -> Fault {
        Fault::Protocol {
            peripheral: Peripheral::Twi,
            state: self.state.name(),
            condition: condition.bits(),
        }
    }

    pub fn state(&self) -> TwiState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state != TwiState::Idle
    }

    /// NACK retries since open
    pub fn total_retries(&self) -> u32 {
        self.total_retries
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

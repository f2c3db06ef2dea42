//! HM-10 link helper
//!
//! Queues outbound text in an [`OutboundRing`] and feeds it to the
//! [`SerialLink`] one message at a time. A write on an idle link starts
//! sending at once; a write while busy only queues, and each TX-done
//! drains the next message.

use heapless::Vec;

use emlink_core::traits::TextLink;
use emlink_core::{Fault, NodeContext, Peripheral};
use emlink_hal::LinkPort;
use emlink_protocol::{AtStep, NameExchange};

use crate::link::{LinkConfig, OutboundRing, SerialLink, TX_CAPACITY};

/// Outcome of a pop attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Popped {
    /// A queued message is now being sent
    Started,
    /// Messages are queued but the link is still sending
    Busy,
    Empty,
}

pub struct Hm10<P> {
    link: SerialLink<P>,
    ring: OutboundRing,
    scratch: Vec<u8, TX_CAPACITY>,
}

impl<P: LinkPort> Hm10<P> {
    pub fn new(port: P, config: LinkConfig) -> Self {
        Self {
            link: SerialLink::new(port, config),
            ring: OutboundRing::new(),
            scratch: Vec::new(),
        }
    }

    /// Start sending the oldest queued message if the link is idle
    pub fn pop(&mut self, ctx: &NodeContext) -> Result<Popped, Fault> {
        if self.ring.is_empty() {
            return Ok(Popped::Empty);
        }
        let Some(token) = self.link.try_acquire_tx() else {
            return Ok(Popped::Busy);
        };

        match self.ring.pop_into(&mut self.scratch) {
            Ok(Some(len)) => {
                self.link
                    .start_transmit(ctx, token, &self.scratch[..len])?;
                Ok(Popped::Started)
            }
            Ok(None) => {
                self.link.release_tx(token);
                Ok(Popped::Empty)
            }
            Err(fault) => {
                self.link.release_tx(token);
                Err(fault)
            }
        }
    }

    pub fn queued(&self) -> usize {
        self.ring.occupied()
    }

    pub fn link(&self) -> &SerialLink<P> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut SerialLink<P> {
        &mut self.link
    }
}

fn run_exchange<P: LinkPort>(port: &mut P, exchange: &NameExchange) -> Result<(), Fault> {
    for step in exchange.steps() {
        run_step(port, step)?;
    }
    Ok(())
}

fn run_step<P: LinkPort>(port: &mut P, step: &AtStep) -> Result<(), Fault> {
    port.write_blocking(step.request.as_bytes())
        .map_err(|_| Fault::LinkIo)?;
    port.flush().map_err(|_| Fault::LinkIo)?;

    let expected = step.response.as_bytes();
    let mut reply = [0u8; 24];
    let reply = &mut reply[..expected.len()];
    port.read_blocking(reply).map_err(|_| Fault::LinkIo)?;
    if reply != expected {
        return Err(Fault::ModuleResponse);
    }
    Ok(())
}

impl<P: LinkPort> TextLink for Hm10<P> {
    fn open(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        self.link.open(ctx)
    }

    fn write(&mut self, ctx: &NodeContext, text: &str) -> Result<(), Fault> {
        self.ring.push(text.as_bytes())?;
        self.pop(ctx)?;
        Ok(())
    }

    fn drain(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        self.pop(ctx)?;
        Ok(())
    }

    fn command(&self) -> &[u8] {
        self.link.command()
    }

    fn program_name(&mut self, name: &str) -> Result<(), Fault> {
        let exchange =
            NameExchange::new(name).map_err(|_| Fault::InvalidConfig(Peripheral::Link))?;
        let link = &mut self.link;
        critical_section::with(|_| {
            link.blocking_session(|port| run_exchange(port, &exchange))
        })
    }

    fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault> {
        self.link.on_interrupt(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::TxState;
    use crate::mock::MockLink;
    use emlink_core::Events;
    use emlink_hal::{LinkIrq, LinkStatus};

    fn opened() -> (NodeContext, Hm10<MockLink>) {
        let ctx = NodeContext::new();
        let mut ble = Hm10::new(MockLink::new(), LinkConfig::HM10);
        ble.open(&ctx).unwrap();
        (ctx, ble)
    }

    /// Clock out the current message and complete it
    fn finish_tx(ctx: &NodeContext, ble: &mut Hm10<MockLink>) {
        while ble.link().tx_state() == TxState::Transmitting {
            ble.link_mut().port_mut().raise(LinkIrq::TXBL);
            ble.on_interrupt(ctx).unwrap();
        }
        ble.link_mut().port_mut().raise(LinkIrq::TXC);
        ble.on_interrupt(ctx).unwrap();
    }

    #[test]
    fn test_write_on_idle_link_starts_at_once() {
        let (ctx, mut ble) = opened();
        ble.write(&ctx, "22.1 F\n").unwrap();
        assert!(ble.link().is_transmitting());
        assert_eq!(ble.queued(), 0);

        finish_tx(&ctx, &mut ble);
        assert_eq!(&ble.link().port().tx[..], b"22.1 F\n");
        assert_eq!(ctx.scheduler.pending(), Events::LINK_TX_DONE);
    }

    #[test]
    fn test_write_on_busy_link_queues() {
        let (ctx, mut ble) = opened();
        ble.write(&ctx, "one\n").unwrap();
        ble.write(&ctx, "two\n").unwrap();
        ble.write(&ctx, "three\n").unwrap();
        assert_eq!(ble.queued(), 5 + 7);
        assert_eq!(ble.pop(&ctx), Ok(Popped::Busy));

        finish_tx(&ctx, &mut ble);
        assert_eq!(&ble.link().port().tx[..], b"one\n");

        // Each TX-done drains the next message in order
        ctx.scheduler.remove(Events::LINK_TX_DONE);
        ble.drain(&ctx).unwrap();
        finish_tx(&ctx, &mut ble);
        ctx.scheduler.remove(Events::LINK_TX_DONE);
        ble.drain(&ctx).unwrap();
        finish_tx(&ctx, &mut ble);

        assert_eq!(&ble.link().port().tx[..], b"one\ntwo\nthree\n");
        assert_eq!(ble.pop(&ctx), Ok(Popped::Empty));
        assert!(!ble.link().is_transmitting());
    }

    #[test]
    fn test_drain_when_empty_is_noop() {
        let (ctx, mut ble) = opened();
        ble.drain(&ctx).unwrap();
        assert!(!ble.link().is_transmitting());
        assert!(ble.link().port().tx.is_empty());
    }

    #[test]
    fn test_program_name() {
        let (_ctx, mut ble) = opened();
        ble.link_mut()
            .port_mut()
            .respond("OKOK+Set:NodeAOK+RESET");
        ble.program_name("NodeA").unwrap();

        let port = ble.link().port();
        assert_eq!(&port.blocking_tx[..], b"ATAT+NAMENodeAAT+RESET");
        assert!(port.status.contains(LinkStatus::RXBLOCK));
        assert!(port.status.contains(LinkStatus::RXENS | LinkStatus::TXENS));
        assert!(port.blocking_rx.is_empty());
    }

    #[test]
    fn test_program_name_mismatch() {
        let (_ctx, mut ble) = opened();
        ble.link_mut().port_mut().respond("OKOK+Set:Other");
        assert_eq!(ble.program_name("NodeA"), Err(Fault::ModuleResponse));
        // Block state is restored even on failure
        assert!(ble.link().port().status.contains(LinkStatus::RXBLOCK));
    }

    #[test]
    fn test_program_name_silent_module() {
        let (_ctx, mut ble) = opened();
        assert_eq!(ble.program_name("NodeA"), Err(Fault::LinkIo));
    }

    #[test]
    fn test_program_name_rejects_bad_name() {
        let (_ctx, mut ble) = opened();
        assert_eq!(
            ble.program_name("has space"),
            Err(Fault::InvalidConfig(Peripheral::Link))
        );
        assert!(ble.link().port().blocking_tx.is_empty());
    }
}

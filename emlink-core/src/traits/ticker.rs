//! Periodic wake timer trait

use crate::context::NodeContext;
use crate::fault::Fault;

/// Low-energy periodic timer
pub trait Ticker {
    /// Program the timer, left stopped unless configured otherwise
    fn open(&mut self, ctx: &NodeContext) -> Result<(), Fault>;

    /// Start or stop ticking; idempotent
    fn start(&mut self, ctx: &NodeContext, enable: bool) -> Result<(), Fault>;

    fn is_running(&self) -> bool;

    /// Post events for pending timer conditions
    fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault>;
}

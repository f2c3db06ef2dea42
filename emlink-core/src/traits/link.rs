//! Text link trait

use crate::context::NodeContext;
use crate::fault::Fault;

/// Outbound text queue plus inbound command frames
pub trait TextLink {
    /// Bring up the link; reception waits for a start byte
    fn open(&mut self, ctx: &NodeContext) -> Result<(), Fault>;

    /// Queue `text` and start sending if the link is idle
    fn write(&mut self, ctx: &NodeContext, text: &str) -> Result<(), Fault>;

    /// Send the next queued message, if the link is idle
    fn drain(&mut self, ctx: &NodeContext) -> Result<(), Fault>;

    /// Payload of the last finalized inbound frame
    fn command(&self) -> &[u8];

    /// Rename the radio module (blocking, interrupts masked)
    fn program_name(&mut self, name: &str) -> Result<(), Fault>;

    /// Service pending link conditions
    fn on_interrupt(&mut self, ctx: &NodeContext) -> Result<(), Fault>;
}

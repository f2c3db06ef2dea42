//! Fault taxonomy
//!
//! Every failure in the node is one of three kinds:
//!
//! - [`Severity::Halt`]: the hardware or a driver state machine is in a
//!   state it cannot be in. Nothing sensible can continue.
//! - [`Severity::ContractViolation`]: a caller broke a documented
//!   precondition (starting a second transaction, overfilling the ring).
//! - [`Severity::Recoverable`]: the device did not answer within the
//!   configured retry budget.
//!
//! A busy device that NACKs is not a fault at all; it is retried.

use emlink_hal::EnergyMode;

/// Peripheral a fault originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    Timer,
    Twi,
    Link,
}

/// How a fault must be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    /// Stop the node
    Halt,
    /// Caller bug; stop the node
    ContractViolation,
    /// Log and carry on
    Recoverable,
}

/// Node fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Interrupt condition arrived in a state that does not expect it
    Protocol {
        peripheral: Peripheral,
        state: &'static str,
        condition: u32,
    },
    /// Bus lines not idle-high at bring-up
    BusNotIdle,
    /// Peripheral clock tree is not running
    ClockTree(Peripheral),
    /// Enable bits did not take effect
    EnableFailed(Peripheral),
    /// Radio module answered an AT command unexpectedly
    ModuleResponse,
    /// Blocking link I/O failed
    LinkIo,
    /// Bus transaction started while one is in flight
    BusBusy,
    /// Link reopened while a transmission owns it
    LinkBusy,
    /// Outbound message does not fit the ring
    RingFull { needed: usize, free: usize },
    /// Queued message does not fit the transmit scratch buffer
    MessageTooLong(usize),
    /// Sleep hold count reached the leak bound
    SleepBlockLeak(EnergyMode),
    /// Sleep unblock without a matching block
    SleepUnderflow(EnergyMode),
    /// Configuration rejected at open
    InvalidConfig(Peripheral),
    /// Device kept NACKing past the retry budget
    DeviceTimeout { retries: u16 },
}

impl Fault {
    pub fn severity(&self) -> Severity {
        match self {
            Fault::Protocol { .. }
            | Fault::BusNotIdle
            | Fault::ClockTree(_)
            | Fault::EnableFailed(_)
            | Fault::ModuleResponse
            | Fault::LinkIo => Severity::Halt,
            Fault::BusBusy
            | Fault::LinkBusy
            | Fault::RingFull { .. }
            | Fault::MessageTooLong(_)
            | Fault::SleepBlockLeak(_)
            | Fault::SleepUnderflow(_)
            | Fault::InvalidConfig(_) => Severity::ContractViolation,
            Fault::DeviceTimeout { .. } => Severity::Recoverable,
        }
    }

    /// Whether the node must stop
    pub fn is_fatal(&self) -> bool {
        self.severity() != Severity::Recoverable
    }
}

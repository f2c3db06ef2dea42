//! Transaction descriptor and protocol state

use emlink_core::Events;

/// Address byte direction bit for a write
pub const DIR_WRITE: u8 = 0;
/// Address byte direction bit for a read
pub const DIR_READ: u8 = 1;

/// One device read: write `command`, then read two bytes back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transaction {
    /// 7-bit device address
    pub address: u8,
    /// Command or register byte
    pub command: u8,
    /// Posted when the stop condition completes
    pub done: Events,
    /// Destination, most significant byte first
    pub data: [u8; 2],
}

impl Transaction {
    pub const fn read(address: u8, command: u8, done: Events) -> Self {
        Self {
            address,
            command,
            done,
            data: [0; 2],
        }
    }

    /// Address byte with the given direction bit
    pub const fn address_byte(&self, dir: u8) -> u8 {
        (self.address << 1) | dir
    }

    /// Received value, big-endian
    pub fn value(&self) -> u16 {
        u16::from_be_bytes(self.data)
    }
}

/// Bus protocol state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiState {
    Idle,
    /// Start and write address sent
    Start,
    /// Command byte sent
    CommandWrite,
    /// Repeated start and read address sent
    CommandRestartRead,
    ReceiveHighByte,
    ReceiveLowByte,
    /// NACK and stop issued, waiting for the stop to complete
    Done,
}

impl TwiState {
    pub const fn name(self) -> &'static str {
        match self {
            TwiState::Idle => "Idle",
            TwiState::Start => "Start",
            TwiState::CommandWrite => "CommandWrite",
            TwiState::CommandRestartRead => "CommandRestartRead",
            TwiState::ReceiveHighByte => "ReceiveHighByte",
            TwiState::ReceiveLowByte => "ReceiveLowByte",
            TwiState::Done => "Done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_byte() {
        let txn = Transaction::read(0x40, 0xF3, Events::SENSOR_DONE);
        assert_eq!(txn.address_byte(DIR_WRITE), 0x80);
        assert_eq!(txn.address_byte(DIR_READ), 0x81);
    }

    #[test]
    fn test_value_is_big_endian() {
        let mut txn = Transaction::read(0x40, 0xF3, Events::SENSOR_DONE);
        txn.data = [0x12, 0x34];
        assert_eq!(txn.value(), 0x1234);
    }
}

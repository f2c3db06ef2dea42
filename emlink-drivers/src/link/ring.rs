//! Outbound message ring
//!
//! Messages are stored as a one-byte length header followed by the payload.
//! Cursors are free running and wrap through a mask; one slot is never used
//! so `read == write` always means empty.

use heapless::Vec;

use emlink_core::Fault;

use super::serial::TX_CAPACITY;

pub const RING_CAPACITY: usize = 128;
const MASK: usize = RING_CAPACITY - 1;

const _: () = assert!(RING_CAPACITY.is_power_of_two());
const _: () = assert!(RING_CAPACITY <= 256);

/// Length-prefixed FIFO of outbound text
pub struct OutboundRing {
    buf: [u8; RING_CAPACITY],
    read: usize,
    write: usize,
}

impl Default for OutboundRing {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundRing {
    pub const fn new() -> Self {
        Self {
            buf: [0; RING_CAPACITY],
            read: 0,
            write: 0,
        }
    }

    /// Bytes in use, headers included
    pub fn occupied(&self) -> usize {
        self.write.wrapping_sub(self.read) & MASK
    }

    /// Bytes still writable
    pub fn free(&self) -> usize {
        RING_CAPACITY - 1 - self.occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Payload length of the oldest message
    pub fn peek_len(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.buf[self.read] as usize)
        }
    }

    /// Queue one message
    ///
    /// Nothing is written unless the header and the whole payload fit, and
    /// the message can later be popped into the transmit scratch.
    pub fn push(&mut self, message: &[u8]) -> Result<(), Fault> {
        let needed = message.len() + 1;
        if needed > TX_CAPACITY {
            return Err(Fault::MessageTooLong(message.len()));
        }
        let free = self.free();
        if needed > free {
            return Err(Fault::RingFull { needed, free });
        }

        self.put(message.len() as u8);
        for &byte in message {
            self.put(byte);
        }
        Ok(())
    }

    /// Move the oldest message into `scratch`, terminated with a NUL
    ///
    /// Returns the payload length, or `None` when the ring is empty.
    pub fn pop_into(&mut self, scratch: &mut Vec<u8, TX_CAPACITY>) -> Result<Option<usize>, Fault> {
        let Some(len) = self.peek_len() else {
            return Ok(None);
        };
        if len + 1 > TX_CAPACITY {
            return Err(Fault::MessageTooLong(len));
        }

        scratch.clear();
        self.read = (self.read + 1) & MASK;
        for _ in 0..len {
            let pushed = scratch.push(self.buf[self.read]);
            debug_assert!(pushed.is_ok(), "payload bounded above");
            self.read = (self.read + 1) & MASK;
        }
        let terminated = scratch.push(0);
        debug_assert!(terminated.is_ok(), "terminator bounded above");
        Ok(Some(len))
    }

    fn put(&mut self, byte: u8) {
        self.buf[self.write] = byte;
        self.write = (self.write + 1) & MASK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pop(ring: &mut OutboundRing) -> Option<Vec<u8, TX_CAPACITY>> {
        let mut scratch = Vec::new();
        let len = ring.pop_into(&mut scratch).unwrap()?;
        assert_eq!(scratch[len], 0);
        scratch.truncate(len);
        Some(scratch)
    }

    #[test]
    fn test_empty_ring() {
        let mut ring = OutboundRing::new();
        assert!(ring.is_empty());
        assert_eq!(ring.free(), RING_CAPACITY - 1);
        assert_eq!(pop(&mut ring), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut ring = OutboundRing::new();
        ring.push(b"22.1 F\n").unwrap();
        ring.push(b"").unwrap();
        ring.push(b"23.0 F\n").unwrap();
        assert_eq!(ring.occupied(), 8 + 1 + 8);

        assert_eq!(&pop(&mut ring).unwrap()[..], b"22.1 F\n");
        assert_eq!(&pop(&mut ring).unwrap()[..], b"");
        assert_eq!(&pop(&mut ring).unwrap()[..], b"23.0 F\n");
        assert!(ring.is_empty());
    }

    #[test]
    fn test_pop_appends_terminator() {
        let mut ring = OutboundRing::new();
        ring.push(b"ok").unwrap();
        let mut scratch = Vec::new();
        assert_eq!(ring.pop_into(&mut scratch), Ok(Some(2)));
        assert_eq!(&scratch[..], b"ok\0");
    }

    #[test]
    fn test_message_longer_than_scratch() {
        let mut ring = OutboundRing::new();
        assert_eq!(
            ring.push(&[b'a'; TX_CAPACITY]),
            Err(Fault::MessageTooLong(TX_CAPACITY))
        );
        ring.push(&[b'a'; TX_CAPACITY - 1]).unwrap();
    }

    #[test]
    fn test_longest_message_fills_scratch() {
        let mut ring = OutboundRing::new();
        ring.push(&[b'z'; TX_CAPACITY - 1]).unwrap();
        let mut scratch = Vec::new();
        assert_eq!(ring.pop_into(&mut scratch), Ok(Some(TX_CAPACITY - 1)));
        assert!(scratch.is_full());
        assert_eq!(scratch[TX_CAPACITY - 1], 0);
        assert!(scratch[..TX_CAPACITY - 1].iter().all(|&b| b == b'z'));
    }

    #[test]
    fn test_full_boundary_keeps_queued_messages() {
        let mut ring = OutboundRing::new();
        // 4 x (1 + 30) = 124 of 127 usable
        for i in 0..4u8 {
            ring.push(&[b'0' + i; 30]).unwrap();
        }
        assert_eq!(ring.free(), 3);
        assert_eq!(
            ring.push(b"abc"),
            Err(Fault::RingFull { needed: 4, free: 3 })
        );
        ring.push(b"ab").unwrap();
        assert_eq!(ring.free(), 0);
        assert!(ring.push(b"").is_err());

        for i in 0..4u8 {
            assert_eq!(&pop(&mut ring).unwrap()[..], &[b'0' + i; 30][..]);
        }
        assert_eq!(&pop(&mut ring).unwrap()[..], b"ab");
        assert!(ring.is_empty());
    }

    #[test]
    fn test_cursors_wrap() {
        let mut ring = OutboundRing::new();
        for round in 0..20u8 {
            ring.push(&[round; 20]).unwrap();
            ring.push(&[round ^ 0xFF; 9]).unwrap();
            assert_eq!(&pop(&mut ring).unwrap()[..], &[round; 20][..]);
            assert_eq!(&pop(&mut ring).unwrap()[..], &[round ^ 0xFF; 9][..]);
        }
        assert!(ring.is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fifo_round_trip(
                messages in proptest::collection::vec(
                    proptest::collection::vec(any::<u8>(), 0..TX_CAPACITY),
                    0..12,
                ),
                lead in 0usize..RING_CAPACITY,
            ) {
                let mut ring = OutboundRing::new();
                // Start from an arbitrary cursor position
                for _ in 0..lead {
                    ring.push(b"").unwrap();
                    pop(&mut ring).unwrap();
                }

                let mut queued = 0usize;
                let mut expected: std::vec::Vec<&[u8]> = std::vec::Vec::new();
                for m in &messages {
                    if queued + m.len() + 1 > RING_CAPACITY - 1 {
                        prop_assert!(ring.push(m).is_err());
                        continue;
                    }
                    ring.push(m).unwrap();
                    queued += m.len() + 1;
                    expected.push(m);
                }
                prop_assert_eq!(ring.occupied(), queued);
                for m in expected {
                    let got = pop(&mut ring).unwrap();
                    prop_assert_eq!(&got[..], m);
                }
                prop_assert!(ring.is_empty());
            }
        }
    }
}

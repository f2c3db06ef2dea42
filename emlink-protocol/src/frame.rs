//! Start/stop framed receive.
//!
//! [`FrameBuffer`] accumulates the payload of one inbound frame. It never
//! overflows: once full, the write cursor wraps to the front and the
//! newest bytes overwrite the oldest.
//!
//! [`FrameDetector`] reproduces the start-frame/signal-frame detection and
//! receive blocking that low-energy UARTs do in hardware, for ports whose
//! UART lacks it.

/// Receive payload capacity in bytes
pub const RX_CAPACITY: usize = 16;

/// Errors in framing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingError {
    /// Start and stop bytes are the same
    SameDelimiter,
}

/// Start/stop delimiter pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Framing {
    start: u8,
    stop: u8,
}

impl Framing {
    /// `<` ... `>`
    pub const ANGLE: Self = Self {
        start: b'<',
        stop: b'>',
    };

    /// Create a delimiter pair; the bytes must differ
    pub const fn new(start: u8, stop: u8) -> Result<Self, FramingError> {
        if start == stop {
            return Err(FramingError::SameDelimiter);
        }
        Ok(Self { start, stop })
    }

    pub const fn start(&self) -> u8 {
        self.start
    }

    pub const fn stop(&self) -> u8 {
        self.stop
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self::ANGLE
    }
}

/// Payload accumulator for one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    data: [u8; RX_CAPACITY],
    cursor: usize,
    filled: usize,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            data: [0; RX_CAPACITY],
            cursor: 0,
            filled: 0,
        }
    }

    /// Discard everything received so far
    pub fn clear(&mut self) {
        self.data = [0; RX_CAPACITY];
        self.cursor = 0;
        self.filled = 0;
    }

    /// Append a byte, wrapping to the front when full
    pub fn push(&mut self, byte: u8) {
        self.data[self.cursor] = byte;
        self.cursor = (self.cursor + 1) % RX_CAPACITY;
        if self.filled < RX_CAPACITY {
            self.filled += 1;
        }
    }

    /// Received payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }
}

/// What the detector made of one line byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Detected {
    /// Dropped while reception is blocked
    Discarded,
    /// Start byte seen; reception is now unblocked
    Start,
    /// Payload byte
    Data(u8),
    /// Stop byte seen
    Signal,
}

/// Software start/signal frame detector with receive blocking
#[derive(Debug, Clone)]
pub struct FrameDetector {
    framing: Framing,
    blocked: bool,
}

impl FrameDetector {
    /// New detector, initially blocked
    pub const fn new(framing: Framing) -> Self {
        Self {
            framing,
            blocked: true,
        }
    }

    pub fn set_framing(&mut self, framing: Framing) {
        self.framing = framing;
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Drop bytes until the next start byte
    pub fn block(&mut self) {
        self.blocked = true;
    }

    /// Deliver every byte
    pub fn unblock(&mut self) {
        self.blocked = false;
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Classify one byte from the line
    pub fn feed(&mut self, byte: u8) -> Detected {
        if byte == self.framing.start {
            self.blocked = false;
            return Detected::Start;
        }
        if self.blocked {
            return Detected::Discarded;
        }
        if byte == self.framing.stop {
            Detected::Signal
        } else {
            Detected::Data(byte)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Receive path as the link driver runs it, minus the hardware
    fn receive(detector: &mut FrameDetector, buf: &mut FrameBuffer, line: &[u8]) -> usize {
        let mut frames = 0;
        for &byte in line {
            match detector.feed(byte) {
                Detected::Start => buf.clear(),
                Detected::Data(b) => buf.push(b),
                Detected::Signal => {
                    detector.block();
                    frames += 1;
                }
                Detected::Discarded => {}
            }
        }
        frames
    }

    #[test]
    fn test_same_delimiter_rejected() {
        assert_eq!(Framing::new(b'#', b'#'), Err(FramingError::SameDelimiter));
        assert!(Framing::new(b'#', b'!').is_ok());
    }

    #[test]
    fn test_simple_frame() {
        let mut detector = FrameDetector::new(Framing::ANGLE);
        let mut buf = FrameBuffer::new();
        assert_eq!(receive(&mut detector, &mut buf, b"<abc>"), 1);
        assert_eq!(buf.as_bytes(), b"abc");
        assert!(detector.is_blocked());
    }

    #[test]
    fn test_last_start_wins() {
        let mut detector = FrameDetector::new(Framing::ANGLE);
        let mut buf = FrameBuffer::new();
        receive(&mut detector, &mut buf, b"<abc>");
        assert_eq!(receive(&mut detector, &mut buf, b"<xy<pq>"), 1);
        assert_eq!(buf.as_bytes(), b"pq");
    }

    #[test]
    fn test_garbage_before_start_is_dropped() {
        let mut detector = FrameDetector::new(Framing::ANGLE);
        let mut buf = FrameBuffer::new();
        assert_eq!(receive(&mut detector, &mut buf, b"zz>q<ok>"), 1);
        assert_eq!(buf.as_bytes(), b"ok");
    }

    #[test]
    fn test_overflow_wraps_to_front() {
        let mut buf = FrameBuffer::new();
        for b in 0..(RX_CAPACITY as u8 + 3) {
            buf.push(b);
        }
        assert_eq!(buf.len(), RX_CAPACITY);
        assert_eq!(&buf.as_bytes()[..3], &[16, 17, 18]);
        assert_eq!(buf.as_bytes()[3], 3);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn framed_payload_is_received_intact(
                payload in proptest::collection::vec(b'a'..=b'z', 0..=RX_CAPACITY),
                noise in proptest::collection::vec(b'a'..=b'z', 0..8),
            ) {
                let mut detector = FrameDetector::new(Framing::ANGLE);
                let mut buf = FrameBuffer::new();
                let mut line = noise.clone();
                line.push(b'<');
                line.extend_from_slice(&payload);
                line.push(b'>');
                prop_assert_eq!(receive(&mut detector, &mut buf, &line), 1);
                prop_assert_eq!(buf.as_bytes(), &payload[..]);
            }

            #[test]
            fn buffer_never_exceeds_capacity(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
                let mut buf = FrameBuffer::new();
                for &b in &bytes {
                    buf.push(b);
                }
                prop_assert_eq!(buf.len(), bytes.len().min(RX_CAPACITY));
            }
        }
    }
}

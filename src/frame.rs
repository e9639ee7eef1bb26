//! Received frames and the queue that holds them until the application reads them

use heapless::{Deque, Vec};

use crate::codec::{self, CodecError, MAX_PAYLOAD_SIZE};

/// Default number of frames buffered by a device
pub const DEFAULT_QUEUE_DEPTH: usize = 8;

/// One decoded inbound packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rssi: i16,
    snr: i8,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Build a frame from raw payload bytes
    pub fn new(rssi: i16, snr: i8, payload: &[u8]) -> Result<Self, CodecError> {
        let mut buffer = Vec::new();
        buffer
            .extend_from_slice(payload)
            .map_err(|_| CodecError::BufferTooSmall)?;
        Ok(Self {
            rssi,
            snr,
            payload: buffer,
        })
    }

    /// Build a frame from a hex-encoded payload
    pub fn from_hex(rssi: i16, snr: i8, hex: &str) -> Result<Self, CodecError> {
        Ok(Self {
            rssi,
            snr,
            payload: codec::decode(hex)?,
        })
    }

    /// Received signal strength in dBm
    pub fn rssi(&self) -> i16 {
        self.rssi
    }

    /// Signal to noise ratio in dB
    pub fn snr(&self) -> i8 {
        self.snr
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True for a zero-length payload
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Frame {{ rssi: {}, snr: {}, len: {} }}",
            self.rssi,
            self.snr,
            self.payload.len()
        )
    }
}

/// What to do with a new frame when the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Evict the oldest queued frame to make room
    #[default]
    DropOldest,
    /// Keep the queue as is and discard the new frame
    DropNewest,
}

/// Result of [`FrameQueue::push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PushOutcome {
    /// Frame queued, nothing lost
    Queued,
    /// Frame queued after evicting the oldest one
    Evicted,
    /// Queue full, frame discarded
    Rejected,
}

/// Bounded FIFO of received frames
pub struct FrameQueue<const N: usize> {
    frames: Deque<Frame, N>,
    policy: OverflowPolicy,
}

impl<const N: usize> FrameQueue<N> {
    /// Create an empty queue
    pub fn new(policy: OverflowPolicy) -> Self {
        Self {
            frames: Deque::new(),
            policy,
        }
    }

    /// Overflow policy in use
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Append a frame in arrival order
    pub fn push(&mut self, frame: Frame) -> PushOutcome {
        if !self.frames.is_full() {
            // Cannot fail, checked above.
            let _ = self.frames.push_back(frame);
            return PushOutcome::Queued;
        }
        match self.policy {
            OverflowPolicy::DropNewest => PushOutcome::Rejected,
            OverflowPolicy::DropOldest => {
                self.frames.pop_front();
                match self.frames.push_back(frame) {
                    Ok(()) => PushOutcome::Evicted,
                    // Only reachable with a zero-capacity queue
                    Err(_) => PushOutcome::Rejected,
                }
            }
        }
    }

    /// Number of queued frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frame is queued
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Copy of every queued frame, oldest first. The queue is left untouched.
    pub fn read(&self) -> Vec<Frame, N> {
        self.frames.iter().cloned().collect()
    }

    /// Iterate over queued frames, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Remove and return the oldest frame
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Remove frames oldest first as the iterator is consumed
    pub fn drain(&mut self) -> impl Iterator<Item = Frame> + '_ {
        core::iter::from_fn(move || self.frames.pop_front())
    }

    /// Drop every queued frame
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl<const N: usize> Default for FrameQueue<N> {
    fn default() -> Self {
        Self::new(OverflowPolicy::default())
    }
}

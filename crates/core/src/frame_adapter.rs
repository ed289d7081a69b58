//! Frame adapters for bridging variable-size host blocks to fixed-size engine frames.
//!
//! `InputAccumulator` collects whatever block length the host delivers and hands
//! out whole `FRAME_SIZE` frames; `OutputAccumulator` does the reverse. Partial
//! frames stay buffered across callbacks, so sample order is preserved no matter
//! how the stream is fragmented.

use crate::constants::FRAME_SIZE;
use crate::error::{RingBufferError, Underrun};
use crate::ring_buffer::RingBuffer;

/// One 10ms block of mono audio, the unit the denoiser operates on.
pub type Frame = [f32; FRAME_SIZE];

pub struct InputAccumulator {
    ring: RingBuffer<f32>,
}

impl InputAccumulator {
    /// Creates an accumulator able to hold `capacity_frames` whole frames.
    pub fn new(capacity_frames: usize) -> Self {
        Self {
            ring: RingBuffer::new(capacity_frames * FRAME_SIZE),
        }
    }

    /// Appends raw samples. Scaling is the caller's job.
    pub fn push(&mut self, samples: &[f32]) -> Result<(), RingBufferError> {
        self.ring.write(samples)
    }

    /// Number of complete frames ready to pop.
    pub fn available_frames(&self) -> usize {
        self.ring.len() / FRAME_SIZE
    }

    /// Removes the oldest complete frame, if there is one.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        let mut frame = [0.0; FRAME_SIZE];
        self.ring.read(&mut frame).ok()?;
        Some(frame)
    }

    pub fn buffered_samples(&self) -> usize {
        self.ring.len()
    }

    pub fn free_samples(&self) -> usize {
        self.ring.free_len()
    }
}

pub struct OutputAccumulator {
    ring: RingBuffer<f32>,
}

impl OutputAccumulator {
    pub fn new(capacity_frames: usize) -> Self {
        Self {
            ring: RingBuffer::new(capacity_frames * FRAME_SIZE),
        }
    }

    pub fn push_frame(&mut self, frame: &Frame) -> Result<(), RingBufferError> {
        self.ring.write(frame)
    }

    /// Fills `out` entirely from buffered audio. Never partially fills:
    /// on underrun `out` and the buffer are left untouched.
    pub fn pop(&mut self, out: &mut [f32]) -> Result<(), Underrun> {
        let requested = out.len();
        self.ring.read(out).map_err(|_| Underrun {
            requested,
            available: self.ring.len(),
        })
    }

    pub fn buffered_samples(&self) -> usize {
        self.ring.len()
    }

    pub fn free_samples(&self) -> usize {
        self.ring.free_len()
    }
}

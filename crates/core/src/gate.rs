//! Voice-activity gate with a frame-count grace period.
//!
//! RNNoise reports a per-frame speech probability. Thresholding that directly
//! chatters, so a detection holds the gate open for `grace_frames` further
//! frames before it mutes.

use crate::constants::{GRACE_FRAMES, VAD_THRESHOLD};
use crate::frame_adapter::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Filtered audio passes through unchanged
    Open,
    /// Frame replaced by silence
    Muted,
}

pub struct NoiseGate {
    grace_remaining: i64,
    vad_threshold: f32,
    grace_frames: i64,
}

impl Default for NoiseGate {
    fn default() -> Self {
        Self::new(VAD_THRESHOLD, GRACE_FRAMES)
    }
}

impl NoiseGate {
    pub fn new(vad_threshold: f32, grace_frames: u32) -> Self {
        Self {
            grace_remaining: 0,
            vad_threshold,
            grace_frames: i64::from(grace_frames),
        }
    }

    /// Advances the gate by one frame.
    ///
    /// A detection resets the counter (it does not add to it), and the
    /// detecting frame itself consumes one count.
    pub fn update(&mut self, vad_probability: f32) -> GateDecision {
        if vad_probability > self.vad_threshold {
            self.grace_remaining = self.grace_frames;
        }

        if self.grace_remaining >= 0 {
            self.grace_remaining -= 1;
            GateDecision::Open
        } else {
            GateDecision::Muted
        }
    }

    /// Advances the gate and silences `frame` if it is muted.
    pub fn apply(&mut self, vad_probability: f32, frame: &mut Frame) -> GateDecision {
        let decision = self.update(vad_probability);
        if decision == GateDecision::Muted {
            frame.fill(0.0);
        }
        decision
    }

    pub fn grace_remaining(&self) -> i64 {
        self.grace_remaining
    }
}

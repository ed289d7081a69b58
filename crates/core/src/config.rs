//! Tunables of the filter stream.

use crate::constants::{BUFFER_FRAMES, GRACE_FRAMES, PCM_SCALE, VAD_THRESHOLD};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Capacity of each ring buffer, in frames
    pub buffer_frames: usize,
    /// Voice probability that re-opens the gate (strictly greater than)
    pub vad_threshold: f32,
    /// Frames the gate stays open after a detection
    pub grace_frames: u32,
    /// Host-to-engine amplitude factor
    pub scale_factor: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            buffer_frames: BUFFER_FRAMES,
            vad_threshold: VAD_THRESHOLD,
            grace_frames: GRACE_FRAMES,
            scale_factor: PCM_SCALE,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_frames == 0 {
            return Err(ConfigError::EmptyBuffer);
        }
        if !(0.0..=1.0).contains(&self.vad_threshold) {
            return Err(ConfigError::VadThreshold(self.vad_threshold));
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(ConfigError::ScaleFactor(self.scale_factor));
        }
        Ok(())
    }
}

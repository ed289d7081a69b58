//! Amplitude mapping between host samples and the range RNNoise was trained on.
//!
//! Hosts deliver normalized floats in roughly [-1, 1]; RNNoise expects floats
//! spanning the 16-bit PCM range. No clamping is applied, so out-of-range host
//! samples leave the engine's range after scaling.

use crate::constants::PCM_SCALE;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy)]
pub struct FrameScaler {
    factor: f32,
}

impl Default for FrameScaler {
    fn default() -> Self {
        Self { factor: PCM_SCALE }
    }
}

impl FrameScaler {
    pub fn new(factor: f32) -> Result<Self, ConfigError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::ScaleFactor(factor));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Host range to engine range, in place.
    pub fn scale_up(&self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample *= self.factor;
        }
    }

    /// Engine range back to host range, in place.
    pub fn scale_down(&self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample /= self.factor;
        }
    }
}

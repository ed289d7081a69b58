//! Noise suppression backends.
//!
//! The stream core only needs "one frame in, one filtered frame plus a voice
//! probability out". Engines are created once per stream and released on drop.

use crate::constants::FRAME_SIZE;
use crate::error::EngineError;
use crate::frame_adapter::Frame;
use nnnoiseless::DenoiseState;

const _: () = assert!(DenoiseState::<'static>::FRAME_SIZE == FRAME_SIZE);

pub trait DenoiseEngine {
    /// Allocates engine state. Failure is fatal for the stream being built.
    fn create() -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Filters one frame (16-bit PCM range) and returns the voice
    /// probability in [0, 1].
    fn process(&mut self, input: &Frame, output: &mut Frame) -> f32;
}

/// RNNoise via the pure-Rust nnnoiseless port. Model weights are embedded.
pub struct RnNoise {
    state: Box<DenoiseState<'static>>,
}

impl DenoiseEngine for RnNoise {
    fn create() -> Result<Self, EngineError> {
        Ok(Self {
            state: DenoiseState::new(),
        })
    }

    fn process(&mut self, input: &Frame, output: &mut Frame) -> f32 {
        self.state.process_frame(output, input)
    }
}

//! Per-callback orchestration of the filter stream.
//!
//! Host block -> scale up -> input adapter -> [denoise -> gate]* -> output
//! adapter -> scale down -> host block. Everything is sized at construction;
//! `process` never allocates or blocks.

use crate::config::FilterConfig;
use crate::constants::FRAME_SIZE;
use crate::engine::{DenoiseEngine, RnNoise};
use crate::error::{FilterError, RingBufferError};
use crate::frame_adapter::{InputAccumulator, OutputAccumulator};
use crate::gate::{GateDecision, NoiseGate};
use crate::scaler::FrameScaler;

/// What happened to one host block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// First callback of the stream; output forced silent.
    WarmingUp,
    /// Output served from filtered audio.
    Filtered { frames: usize },
    /// Not enough filtered audio buffered; output silent.
    Underrun { frames: usize },
    /// Input did not fit the input ring and was dropped; output silent.
    Overflow,
    /// Input and output blocks differ in length; output silent.
    LengthMismatch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub callbacks: u64,
    pub frames: u64,
    pub muted_frames: u64,
    pub underruns: u64,
    pub overflows: u64,
}

pub struct StreamProcessor<E = RnNoise> {
    engine: E,
    input: InputAccumulator,
    output: OutputAccumulator,
    gate: NoiseGate,
    scaler: FrameScaler,
    warming_up: bool,
    stats: StreamStats,
}

impl<E: DenoiseEngine> StreamProcessor<E> {
    /// Validates `config` and creates the engine.
    pub fn new(config: FilterConfig) -> Result<Self, FilterError> {
        config.validate()?;
        let engine = E::create()?;
        Self::with_engine(engine, config)
    }

    /// Builds a stream around an existing engine.
    pub fn with_engine(engine: E, config: FilterConfig) -> Result<Self, FilterError> {
        config.validate()?;
        let scaler = FrameScaler::new(config.scale_factor)?;
        log::debug!(
            "Filter stream: {} frame buffers, VAD > {}, grace {} frames",
            config.buffer_frames,
            config.vad_threshold,
            config.grace_frames
        );
        Ok(Self {
            engine,
            input: InputAccumulator::new(config.buffer_frames),
            output: OutputAccumulator::new(config.buffer_frames),
            gate: NoiseGate::new(config.vad_threshold, config.grace_frames),
            scaler,
            warming_up: true,
            stats: StreamStats::default(),
        })
    }

    /// Runs one host callback. `input` and `output` must have the same length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> BlockOutcome {
        self.stats.callbacks += 1;

        if input.len() != output.len() {
            log::error!(
                "Block length mismatch: input={} output={}",
                input.len(),
                output.len()
            );
            output.fill(0.0);
            return BlockOutcome::LengthMismatch;
        }

        // Blocks larger than half the ring: filter what is already queued
        // first so the input ring has room again.
        let mut frames = 0;
        if !self.warming_up && input.len() > self.input.free_samples() {
            frames = self.drain_frames();
        }

        if let Err(e) = self.absorb(input) {
            log::error!("Input buffer overflow, dropping block: {}", e);
            self.stats.overflows += 1;
            self.warming_up = false;
            output.fill(0.0);
            return BlockOutcome::Overflow;
        }

        // No frame can have made the round trip yet
        if self.warming_up {
            self.warming_up = false;
            output.fill(0.0);
            return BlockOutcome::WarmingUp;
        }

        frames += self.drain_frames();

        match self.output.pop(output) {
            Ok(()) => {
                self.scaler.scale_down(output);
                BlockOutcome::Filtered { frames }
            }
            Err(underrun) => {
                output.fill(0.0);
                self.stats.underruns += 1;
                log::warn!("Output buffer underrun: {}", underrun);
                BlockOutcome::Underrun { frames }
            }
        }
    }

    /// Scales `input` into the engine range and queues it, all or nothing.
    fn absorb(&mut self, input: &[f32]) -> Result<(), RingBufferError> {
        let available = self.input.free_samples();
        if input.len() > available {
            return Err(RingBufferError::InsufficientSpace {
                requested: input.len(),
                available,
            });
        }

        let mut staging = [0.0f32; FRAME_SIZE];
        for chunk in input.chunks(FRAME_SIZE) {
            let staged = &mut staging[..chunk.len()];
            staged.copy_from_slice(chunk);
            self.scaler.scale_up(staged);
            self.input.push(staged)?;
        }
        Ok(())
    }

    /// Filters every complete input frame into the output adapter.
    fn drain_frames(&mut self) -> usize {
        let mut filtered = [0.0f32; FRAME_SIZE];
        let mut drained = 0;

        while self.input.available_frames() > 0 {
            if self.output.free_samples() < FRAME_SIZE {
                // Leave the rest queued in the input ring
                log::error!(
                    "Output buffer overflow, {} frames left pending",
                    self.input.available_frames()
                );
                self.stats.overflows += 1;
                break;
            }
            let Some(frame) = self.input.pop_frame() else {
                break;
            };

            let vad_probability = self.engine.process(&frame, &mut filtered);
            if self.gate.apply(vad_probability, &mut filtered) == GateDecision::Muted {
                self.stats.muted_frames += 1;
            }

            if let Err(e) = self.output.push_frame(&filtered) {
                log::error!("Dropping filtered frame: {}", e);
                self.stats.overflows += 1;
                break;
            }
            drained += 1;
        }

        self.stats.frames += drained as u64;
        drained
    }

    pub fn is_warming_up(&self) -> bool {
        self.warming_up
    }

    /// Samples currently held in both adapters.
    pub fn latency_samples(&self) -> usize {
        self.input.buffered_samples() + self.output.buffered_samples()
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn gate(&self) -> &NoiseGate {
        &self.gate
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Passes frames through and reports a fixed voice probability.
    struct Passthrough {
        probability: f32,
        calls: usize,
    }

    impl DenoiseEngine for Passthrough {
        fn create() -> Result<Self, crate::error::EngineError> {
            Ok(Self {
                probability: 1.0,
                calls: 0,
            })
        }

        fn process(&mut self, input: &crate::Frame, output: &mut crate::Frame) -> f32 {
            self.calls += 1;
            output.copy_from_slice(input);
            self.probability
        }
    }

    fn processor() -> StreamProcessor<Passthrough> {
        StreamProcessor::new(FilterConfig::default()).unwrap()
    }

    #[test]
    fn test_first_callback_is_silent() {
        let mut p = processor();
        let input = [0.5f32; 256];
        let mut output = [1.0f32; 256];

        assert_eq!(p.process(&input, &mut output), BlockOutcome::WarmingUp);
        assert!(output.iter().all(|s| *s == 0.0));
        assert!(!p.is_warming_up());
        assert_eq!(p.engine().calls, 0);
    }

    #[test]
    fn test_warm_up_happens_once() {
        let mut p = processor();
        let input = [0.5f32; FRAME_SIZE];
        let mut output = [0.0f32; FRAME_SIZE];

        p.process(&input, &mut output);
        for _ in 0..5 {
            assert_ne!(p.process(&input, &mut output), BlockOutcome::WarmingUp);
        }
    }

    #[test]
    fn test_one_callback_of_delay() {
        let mut p = processor();
        let first: Vec<f32> = (0..FRAME_SIZE).map(|i| i as f32 / 1000.0).collect();
        let second = [0.0f32; FRAME_SIZE];
        let mut output = [0.0f32; FRAME_SIZE];

        p.process(&first, &mut output);
        assert_eq!(
            p.process(&second, &mut output),
            BlockOutcome::Filtered { frames: 2 }
        );
        for (expected, got) in first.iter().zip(output.iter()) {
            assert!((expected - got).abs() < 1e-5, "expected {} got {}", expected, got);
        }
        assert_eq!(p.latency_samples(), FRAME_SIZE);
    }

    #[test]
    fn test_underrun_emits_silence() {
        let mut p = processor();
        let input = [0.3f32; 100];
        let mut output = [1.0f32; 100];

        p.process(&input, &mut output);
        for _ in 0..3 {
            output.fill(1.0);
            assert_eq!(
                p.process(&input, &mut output),
                BlockOutcome::Underrun { frames: 0 }
            );
            assert!(output.iter().all(|s| *s == 0.0));
        }
        assert_eq!(p.stats().underruns, 3);
        assert_eq!(p.engine().calls, 0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut p = processor();
        let input = [0.3f32; 64];
        let mut output = [1.0f32; 32];

        assert_eq!(p.process(&input, &mut output), BlockOutcome::LengthMismatch);
        assert!(output.iter().all(|s| *s == 0.0));
        // Rejected blocks do not consume the warm-up callback
        assert!(p.is_warming_up());
    }

    #[test]
    fn test_oversized_block_overflows() {
        let config = FilterConfig {
            buffer_frames: 2,
            ..Default::default()
        };
        let mut p: StreamProcessor<Passthrough> = StreamProcessor::new(config).unwrap();
        let input = vec![0.1f32; FRAME_SIZE * 2 + 1];
        let mut output = vec![1.0f32; FRAME_SIZE * 2 + 1];

        assert_eq!(p.process(&input, &mut output), BlockOutcome::Overflow);
        assert!(output.iter().all(|s| *s == 0.0));
        assert_eq!(p.stats().overflows, 1);
        assert_eq!(p.latency_samples(), 0, "overflowing block must not be partially queued");
        // The dropped block still counts as the warm-up callback
        assert!(!p.is_warming_up());

        let input = [0.1f32; FRAME_SIZE];
        let mut output = [0.0f32; FRAME_SIZE];
        assert_eq!(
            p.process(&input, &mut output),
            BlockOutcome::Filtered { frames: 1 }
        );
    }

    #[test]
    fn test_full_output_ring_keeps_frames_queued() {
        let config = FilterConfig {
            buffer_frames: 2,
            ..Default::default()
        };
        let mut p: StreamProcessor<Passthrough> = StreamProcessor::new(config).unwrap();
        let mut output = [0.0f32; FRAME_SIZE * 2];

        p.process(&[0.1; FRAME_SIZE * 2], &mut output);
        // Pre-drain fills the output ring; the new block's frames must wait
        assert_eq!(
            p.process(&[0.2; FRAME_SIZE * 2], &mut output),
            BlockOutcome::Filtered { frames: 2 }
        );
        assert!(output.iter().all(|s| (*s - 0.1).abs() < 1e-6));
        assert_eq!(p.stats().overflows, 1);
        assert_eq!(p.latency_samples(), FRAME_SIZE * 2, "pending frames stay in the input ring");

        // Nothing was lost: the queued block comes out next
        assert_eq!(
            p.process(&[0.3; FRAME_SIZE * 2], &mut output),
            BlockOutcome::Filtered { frames: 2 }
        );
        assert!(output.iter().all(|s| (*s - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_quiet_stream_gets_muted() {
        let mut p = processor();
        p.engine.probability = 0.0;

        let input = [0.2f32; FRAME_SIZE];
        let mut output = [0.0f32; FRAME_SIZE];
        p.process(&input, &mut output);
        // Frames 1 and 2: the first passes (counter starts at zero), the second is muted
        p.process(&input, &mut output);
        assert!(output.iter().all(|s| (*s - 0.2).abs() < 1e-6));
        p.process(&input, &mut output);
        assert!(output.iter().all(|s| *s == 0.0));
        assert_eq!(p.stats().muted_frames, 2);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let config = FilterConfig {
            scale_factor: -2.0,
            ..Default::default()
        };
        assert!(matches!(
            StreamProcessor::<Passthrough>::new(config),
            Err(FilterError::Config(_))
        ));
    }
}

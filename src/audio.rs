use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{info, warn};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use voidfilter_core::constants::{FRAME_SIZE, SAMPLE_RATE};
use voidfilter_core::{BlockOutcome, FilterConfig, StreamProcessor};

/// Largest slice of a device buffer handed to the filter as one block.
/// Keeps the scratch buffer fixed so the callback never allocates.
const MAX_BLOCK: usize = FRAME_SIZE * 8;

/// Live filter: microphone -> RNNoise + VAD gate -> output device.
///
/// The input callback owns the `StreamProcessor` and runs it synchronously on
/// every device buffer; filtered blocks reach the output callback through a
/// lock-free ring buffer.
pub struct FilterEngine {
    _input_stream: cpal::Stream,
    _output_stream: cpal::Stream,
    underruns: Arc<AtomicU64>,
    muted_frames: Arc<AtomicU64>,
}

impl FilterEngine {
    pub fn start(input_name: &str, output_name: &str, filter: FilterConfig) -> Result<Self> {
        let host = cpal::default_host();
        info!("Audio host: {}", host.id().name());

        let input_device = if input_name == "default" {
            host.default_input_device()
                .context("No default input found")?
        } else {
            host.input_devices()?
                .find(|d| d.name().ok().as_deref() == Some(input_name))
                .context("Input device not found")?
        };
        info!(
            "Using input device: {}",
            input_device.name().unwrap_or_default()
        );

        let output_device = if output_name == "default" {
            host.default_output_device()
                .context("No default output found")?
        } else {
            host.output_devices()?
                .find(|d| d.name().ok().as_deref() == Some(output_name))
                .context("Output device not found")?
        };
        info!(
            "Using output device: {}",
            output_device.name().unwrap_or_default()
        );

        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut processor: StreamProcessor =
            StreamProcessor::new(filter).context("Failed to create filter stream")?;

        let rb_out = HeapRb::<f32>::new(filter.buffer_frames * FRAME_SIZE);
        let (mut prod_out, mut cons_out) = rb_out.split();

        let underruns = Arc::new(AtomicU64::new(0));
        let underrun_writer = underruns.clone();
        let muted_frames = Arc::new(AtomicU64::new(0));
        let muted_writer = muted_frames.clone();

        let mut block = vec![0.0f32; MAX_BLOCK];

        let input_stream = input_device.build_input_stream(
            &config,
            move |data: &[f32], _| {
                for chunk in data.chunks(MAX_BLOCK) {
                    let out = &mut block[..chunk.len()];
                    if processor.process(chunk, out) == BlockOutcome::WarmingUp {
                        info!("Filter warmed up");
                    }
                    let pushed = prod_out.push_slice(out);
                    if pushed < out.len() {
                        warn!("Playback queue full, dropped {} samples", out.len() - pushed);
                    }
                }
                let stats = processor.stats();
                underrun_writer.store(stats.underruns, Ordering::Relaxed);
                muted_writer.store(stats.muted_frames, Ordering::Relaxed);
            },
            |err| warn!("Input stream error: {}", err),
            None,
        )?;

        let output_stream = output_device.build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                let read = cons_out.pop_slice(data);
                data[read..].fill(0.0);
            },
            |err| warn!("Output stream error: {}", err),
            None,
        )?;

        input_stream.play()?;
        output_stream.play()?;

        Ok(Self {
            _input_stream: input_stream,
            _output_stream: output_stream,
            underruns,
            muted_frames,
        })
    }

    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    pub fn muted_frames(&self) -> u64 {
        self.muted_frames.load(Ordering::Relaxed)
    }
}

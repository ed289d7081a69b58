//! Offline filtering of WAV files through the same stream processor the live
//! path uses, fed in fixed-size blocks to mimic device callbacks.

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use voidfilter_core::constants::{FRAME_SIZE, SAMPLE_RATE};
use voidfilter_core::{FilterConfig, StreamProcessor, StreamStats};

#[derive(Debug)]
pub struct FileReport {
    pub samples: usize,
    pub stats: StreamStats,
}

pub fn filter_file(
    input: &Path,
    output: &Path,
    block_size: usize,
    config: FilterConfig,
) -> Result<FileReport> {
    let reader = WavReader::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    filter_wav(reader, BufWriter::new(file), block_size, config)
}

/// Filters a mono 48kHz WAV stream into a 32-bit float WAV of equal length.
///
/// Output is delayed by the stream latency; the tail still buffered when the
/// input ends is not flushed.
pub fn filter_wav<R: Read, W: Write + Seek>(
    mut reader: WavReader<R>,
    writer: W,
    block_size: usize,
    config: FilterConfig,
) -> Result<FileReport> {
    if block_size == 0 {
        bail!("Block size must be at least one sample");
    }
    let max_block = config.buffer_frames * FRAME_SIZE / 2;
    if block_size > max_block {
        bail!(
            "Block size {} exceeds {} samples (half the {}-frame buffer)",
            block_size,
            max_block,
            config.buffer_frames
        );
    }
    let spec = reader.spec();
    if spec.channels != 1 {
        bail!("Expected mono audio, got {} channels", spec.channels);
    }
    if spec.sample_rate != SAMPLE_RATE {
        bail!(
            "Expected {}Hz audio, got {}Hz (resampling is not supported)",
            SAMPLE_RATE,
            spec.sample_rate
        );
    }

    let samples = read_normalized(&mut reader)?;
    let mut processor: StreamProcessor = StreamProcessor::new(config)?;

    let out_spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::new(writer, out_spec).context("Failed to write WAV header")?;

    let mut block = vec![0.0f32; block_size];
    for chunk in samples.chunks(block_size) {
        let out = &mut block[..chunk.len()];
        processor.process(chunk, out);
        for sample in out.iter() {
            writer.write_sample(*sample)?;
        }
    }
    writer.finalize().context("Failed to finalize WAV output")?;

    Ok(FileReport {
        samples: samples.len(),
        stats: processor.stats(),
    })
}

/// Reads all samples as floats in [-1, 1].
fn read_normalized<R: Read>(reader: &mut WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read float samples"),
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read integer samples")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn tone(len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| ((i as f32 * 0.06).sin() * 8000.0) as i16)
            .collect()
    }

    #[test]
    fn test_output_matches_input_length() {
        let input = wav_bytes(1, SAMPLE_RATE, &tone(4800));
        let reader = WavReader::new(Cursor::new(input)).unwrap();
        let mut out = Cursor::new(Vec::new());

        let report = filter_wav(reader, &mut out, 480, FilterConfig::default()).unwrap();
        assert_eq!(report.samples, 4800);
        assert_eq!(report.stats.callbacks, 10);

        let filtered = WavReader::new(Cursor::new(out.into_inner())).unwrap();
        assert_eq!(filtered.spec().sample_format, SampleFormat::Float);
        let samples: Vec<f32> = filtered.into_samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 4800);
        assert!(
            samples[..FRAME_SIZE].iter().all(|s| *s == 0.0),
            "warm-up block should be silent"
        );
    }

    #[test]
    fn test_odd_block_size() {
        let input = wav_bytes(1, SAMPLE_RATE, &tone(3000));
        let reader = WavReader::new(Cursor::new(input)).unwrap();
        let mut out = Cursor::new(Vec::new());

        let report = filter_wav(reader, &mut out, 333, FilterConfig::default()).unwrap();
        assert_eq!(report.samples, 3000);
        assert_eq!(report.stats.overflows, 0);
    }

    #[test]
    fn test_rejects_stereo() {
        let input = wav_bytes(2, SAMPLE_RATE, &tone(960));
        let reader = WavReader::new(Cursor::new(input)).unwrap();
        let mut out = Cursor::new(Vec::new());
        let err = filter_wav(reader, &mut out, 480, FilterConfig::default()).unwrap_err();
        assert!(err.to_string().contains("mono"), "unexpected error: {}", err);
    }

    #[test]
    fn test_rejects_other_sample_rates() {
        let input = wav_bytes(1, 44100, &tone(960));
        let reader = WavReader::new(Cursor::new(input)).unwrap();
        let mut out = Cursor::new(Vec::new());
        assert!(filter_wav(reader, &mut out, 480, FilterConfig::default()).is_err());
    }

    #[test]
    fn test_rejects_block_larger_than_half_the_buffer() {
        let input = wav_bytes(1, SAMPLE_RATE, &tone(480));
        let reader = WavReader::new(Cursor::new(input)).unwrap();
        let mut out = Cursor::new(Vec::new());
        let err = filter_wav(reader, &mut out, 30000, FilterConfig::default()).unwrap_err();
        assert!(err.to_string().contains("exceeds"), "unexpected error: {}", err);

        // Exactly half still works
        let input = wav_bytes(1, SAMPLE_RATE, &tone(480));
        let reader = WavReader::new(Cursor::new(input)).unwrap();
        let mut out = Cursor::new(Vec::new());
        assert!(filter_wav(reader, &mut out, 24000, FilterConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_zero_block_size() {
        let input = wav_bytes(1, SAMPLE_RATE, &tone(480));
        let reader = WavReader::new(Cursor::new(input)).unwrap();
        let mut out = Cursor::new(Vec::new());
        assert!(filter_wav(reader, &mut out, 0, FilterConfig::default()).is_err());
    }
}

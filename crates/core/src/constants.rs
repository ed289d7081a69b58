//! Shared constants for VoidFilter audio processing.

/// Sample rate the denoiser is trained for (48kHz)
pub const SAMPLE_RATE: u32 = 48000;

/// Frame size in samples (10ms at 48kHz = 480 samples)
pub const FRAME_SIZE: usize = 480;

/// Default ring buffer capacity, in frames (1s of audio)
pub const BUFFER_FRAMES: usize = 100;

/// Voice probability above which the gate re-opens
pub const VAD_THRESHOLD: f32 = 0.95;

/// Frames the gate stays open after the last detection (200ms)
pub const GRACE_FRAMES: u32 = 20;

/// Maps normalized [-1, 1] samples to the 16-bit range RNNoise expects
pub const PCM_SCALE: f32 = 32767.0;

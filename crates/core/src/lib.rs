pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod frame_adapter;
pub mod gate;
pub mod processor;
pub mod ring_buffer;
pub mod scaler;

pub use config::FilterConfig;
pub use engine::{DenoiseEngine, RnNoise};
pub use error::{ConfigError, EngineError, FilterError, RingBufferError, Underrun};
pub use frame_adapter::{Frame, InputAccumulator, OutputAccumulator};
pub use gate::{GateDecision, NoiseGate};
pub use processor::{BlockOutcome, StreamProcessor, StreamStats};
pub use ring_buffer::RingBuffer;
pub use scaler::FrameScaler;

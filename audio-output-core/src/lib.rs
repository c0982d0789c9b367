//! # audio-output-core
//!
//! Platform-agnostic streaming audio output core.
//!
//! Sustains glitch-free continuous PCM output where the consumer (a
//! device-owned refill callback) runs on its own clock and the producer
//! must be invoked exactly once per buffer period, with a configurable
//! trade-off between latency and underrun risk. Platform backends
//! implement the `PlaybackDevice`/`PlaybackEndpoint` traits and plug into
//! the generic `OutputStream`.
//!
//! ## Architecture
//!
//! ```text
//! audio-output-core (this crate)
//! ├── traits/   ← PlaybackDevice, PlaybackEndpoint, SampleProducer, StreamDelegate
//! ├── models/   ← StreamFormat, OpenConfig, BufferingPolicy, StreamState, OutputError
//! ├── buffer/   ← BufferPool (fixed ring of raw sample slots)
//! └── stream/   ← OutputStream (state machine + refill orchestration)
//! ```

pub mod buffer;
pub mod models;
pub mod stream;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use buffer::pool::BufferPool;
pub use models::config::OpenConfig;
pub use models::diagnostics::StreamDiagnostics;
pub use models::error::OutputError;
pub use models::format::StreamFormat;
pub use models::policy::{BufferingPolicy, DEFAULT_FRAMES_PER_BUFFER, STANDARD_SLOT_COUNT};
pub use models::state::StreamState;
pub use stream::output::OutputStream;
pub use traits::delegate::StreamDelegate;
pub use traits::device::{DeviceCapabilities, PlaybackDevice, PlaybackEndpoint, RefillHandler};
pub use traits::producer::SampleProducer;

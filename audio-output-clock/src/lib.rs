//! # audio-output-clock
//!
//! Clock-driven software playback device for audio-output-core.
//!
//! Provides:
//! - `ClockDevice` — device context implementing `PlaybackDevice`
//! - `ClockedEndpoint` — per-stream playback queue paced by a dedicated
//!   thread that ticks once per buffer period
//! - `PlaybackSink` / `NullSink` — destination for played slots
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use audio_output_clock::{ClockDevice, NullSink};
//! use audio_output_core::{OpenConfig, OutputStream, StreamFormat};
//!
//! let device = ClockDevice::new(Arc::new(NullSink));
//! let mut stream = OutputStream::new(device);
//! stream.open(StreamFormat::stereo(48_000), producer, OpenConfig::default())?;
//! stream.play();
//! ```

pub mod clock_device;
pub mod sink;

pub use clock_device::{ClockDevice, ClockedEndpoint};
pub use sink::{NullSink, PlaybackSink};

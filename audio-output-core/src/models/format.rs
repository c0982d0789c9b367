use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Immutable description of a PCM output stream's native format.
///
/// All three fields are fixed once a stream has been opened with this
/// format. The subsystem handles interleaved signed 16-bit samples only;
/// `validate` rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamFormat {
    /// Sample rate in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,

    /// Number of interleaved channels (1 = mono, 2 = stereo).
    pub channels: u16,

    /// Bits per sample. Fixed at 16.
    pub bits_per_sample: u16,
}

impl StreamFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample: 16,
        }
    }

    pub fn mono(sample_rate: u32) -> Self {
        Self::new(sample_rate, 1)
    }

    pub fn stereo(sample_rate: u32) -> Self {
        Self::new(sample_rate, 2)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.bits_per_sample != 16 {
            return Err(format!("unsupported bit depth: {}", self.bits_per_sample));
        }
        Ok(())
    }

    /// Bytes per sample on a single channel.
    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }

    /// Bytes per frame (one sample for every channel).
    pub fn frame_bytes(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }

    pub fn frames_to_bytes(&self, frames: usize) -> usize {
        frames * self.frame_bytes()
    }

    pub fn bytes_to_frames(&self, bytes: usize) -> usize {
        bytes / self.frame_bytes()
    }

    /// Bytes covering `micros` microseconds of audio at this format,
    /// rounded to the nearest whole frame.
    pub fn duration_to_bytes(&self, micros: u64) -> usize {
        let frames = (self.sample_rate as u64 * micros + 500_000) / 1_000_000;
        self.frames_to_bytes(frames as usize)
    }

    /// Wall-clock duration represented by `bytes` of audio at this format.
    ///
    /// Partial trailing frames are ignored.
    pub fn bytes_to_duration(&self, bytes: usize) -> Duration {
        let frames = self.bytes_to_frames(bytes) as u64;
        Duration::from_nanos(frames * 1_000_000_000 / self.sample_rate as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_math_stereo_16bit() {
        let format = StreamFormat::stereo(44_100);
        assert_eq!(format.bytes_per_sample(), 2);
        assert_eq!(format.frame_bytes(), 4);
        assert_eq!(format.frames_to_bytes(192), 768);
        assert_eq!(format.bytes_to_frames(768), 192);
    }

    #[test]
    fn frame_math_mono() {
        let format = StreamFormat::mono(48_000);
        assert_eq!(format.frame_bytes(), 2);
        assert_eq!(format.frames_to_bytes(100), 200);
    }

    #[test]
    fn duration_to_bytes_rounds_to_nearest_frame() {
        // 20ms at 44.1kHz stereo: round(44100 * 20000 / 1e6) = 882 frames.
        let format = StreamFormat::stereo(44_100);
        assert_eq!(format.duration_to_bytes(20_000), 882 * 4);

        // 44100 * 11 / 1e6 = 0.4851 -> rounds to 0 frames.
        assert_eq!(format.duration_to_bytes(11), 0);

        // 44100 * 12 / 1e6 = 0.5292 -> rounds to 1 frame.
        assert_eq!(format.duration_to_bytes(12), 4);
    }

    #[test]
    fn bytes_to_duration_inverts_frame_count() {
        let format = StreamFormat::stereo(48_000);
        let bytes = format.frames_to_bytes(480); // 10ms
        assert_relative_eq!(
            format.bytes_to_duration(bytes).as_secs_f64(),
            0.010,
            epsilon = 1e-9
        );
    }

    #[test]
    fn validate_accepts_mono_and_stereo() {
        assert!(StreamFormat::mono(8_000).validate().is_ok());
        assert!(StreamFormat::stereo(192_000).validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_fields() {
        assert!(StreamFormat::stereo(0).validate().is_err());
        assert!(StreamFormat::new(44_100, 6).validate().is_err());

        let mut format = StreamFormat::stereo(44_100);
        format.bits_per_sample = 24;
        assert!(format.validate().is_err());
    }
}

use crate::models::config::OpenConfig;
use crate::models::format::StreamFormat;
use crate::traits::device::DeviceCapabilities;

/// Fallback callback quantum when the device does not report a preferred
/// frames-per-buffer value.
pub const DEFAULT_FRAMES_PER_BUFFER: u32 = 192;

/// Slot count on the standard (latency-tolerant) path.
pub const STANDARD_SLOT_COUNT: usize = 8;

/// Slot layout negotiated at open time from the stream format, the open
/// configuration, and the device's capabilities.
///
/// - Low-latency path: one slot if the device supports a single-buffer
///   queue, otherwise two; each slot holds one device-preferred callback
///   period of audio.
/// - Standard path: eight slots splitting the wanted total latency evenly.
///
/// Slot sizes are always a whole number of frames and at least one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferingPolicy {
    pub slot_count: usize,
    pub slot_bytes: usize,
}

impl BufferingPolicy {
    pub fn derive(format: StreamFormat, config: &OpenConfig, caps: &DeviceCapabilities) -> Self {
        if config.low_latency_hint {
            let slot_count = if caps.single_buffer_low_latency { 1 } else { 2 };
            let frames = caps
                .preferred_frames_per_buffer
                .unwrap_or(DEFAULT_FRAMES_PER_BUFFER);
            Self {
                slot_count,
                slot_bytes: format.frames_to_bytes(frames.max(1) as usize),
            }
        } else {
            let frame_bytes = format.frame_bytes();
            let per_slot = format.duration_to_bytes(config.wanted_latency_micros) / STANDARD_SLOT_COUNT;
            Self {
                slot_count: STANDARD_SLOT_COUNT,
                slot_bytes: (per_slot - per_slot % frame_bytes).max(frame_bytes),
            }
        }
    }

    /// Size of the whole slot pool in bytes.
    pub fn total_bytes(&self) -> usize {
        self.slot_count * self.slot_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(single_buffer: bool, frames: Option<u32>) -> DeviceCapabilities {
        DeviceCapabilities {
            single_buffer_low_latency: single_buffer,
            preferred_frames_per_buffer: frames,
        }
    }

    #[test]
    fn standard_path_44100_stereo_splits_20ms_into_8_slots() {
        let policy = BufferingPolicy::derive(
            StreamFormat::stereo(44_100),
            &OpenConfig::default(),
            &caps(false, None),
        );
        assert_eq!(policy.slot_count, 8);
        // 882 frames of 4 bytes over 8 slots = 441 bytes, trimmed down to
        // the 440-byte frame boundary.
        assert_eq!(policy.slot_bytes, 440);
        assert_eq!(policy.total_bytes(), 3520);
    }

    #[test]
    fn standard_path_48000_divides_evenly() {
        let policy = BufferingPolicy::derive(
            StreamFormat::stereo(48_000),
            &OpenConfig::default(),
            &caps(false, None),
        );
        // 960 frames / 8 slots = 120 frames = 480 bytes, already aligned.
        assert_eq!(policy.slot_bytes, 480);
    }

    #[test]
    fn low_latency_single_buffer_device() {
        let policy = BufferingPolicy::derive(
            StreamFormat::stereo(48_000),
            &OpenConfig::low_latency(),
            &caps(true, None),
        );
        assert_eq!(policy.slot_count, 1);
        assert_eq!(policy.slot_bytes, 192 * 4);
    }

    #[test]
    fn low_latency_without_single_buffer_support_uses_two_slots() {
        let policy = BufferingPolicy::derive(
            StreamFormat::stereo(48_000),
            &OpenConfig::low_latency(),
            &caps(false, None),
        );
        assert_eq!(policy.slot_count, 2);
    }

    #[test]
    fn low_latency_honors_device_preferred_quantum() {
        let policy = BufferingPolicy::derive(
            StreamFormat::mono(48_000),
            &OpenConfig::low_latency(),
            &caps(true, Some(256)),
        );
        assert_eq!(policy.slot_bytes, 256 * 2);
    }

    #[test]
    fn slot_bytes_is_always_a_positive_frame_multiple() {
        let rates = [8_000u32, 11_025, 22_050, 44_100, 48_000, 96_000, 192_000];
        let latencies = [1u64, 500, 5_000, 20_000, 100_000];

        for &rate in &rates {
            for channels in [1u16, 2] {
                let format = StreamFormat::new(rate, channels);
                for low_latency in [false, true] {
                    for single in [false, true] {
                        for &latency in &latencies {
                            let config = OpenConfig {
                                low_latency_hint: low_latency,
                                wanted_latency_micros: latency,
                            };
                            let policy =
                                BufferingPolicy::derive(format, &config, &caps(single, None));
                            assert!(policy.slot_count >= 1);
                            assert!(policy.slot_bytes > 0);
                            assert_eq!(
                                policy.slot_bytes % format.frame_bytes(),
                                0,
                                "unaligned slot for {}Hz {}ch low_latency={} latency={}",
                                rate,
                                channels,
                                low_latency,
                                latency
                            );
                        }
                    }
                }
            }
        }
    }
}

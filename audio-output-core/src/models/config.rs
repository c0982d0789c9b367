use serde::{Deserialize, Serialize};

/// Configuration supplied to `OutputStream::open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenConfig {
    /// Prefer the smallest queue the device supports, trading underrun
    /// headroom for output delay.
    pub low_latency_hint: bool,

    /// Target total queued latency on the standard path, in microseconds
    /// (default: 20 000). Ignored when `low_latency_hint` is set.
    pub wanted_latency_micros: u64,
}

impl OpenConfig {
    pub fn low_latency() -> Self {
        Self {
            low_latency_hint: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.wanted_latency_micros == 0 {
            return Err("wanted latency must be positive".into());
        }
        Ok(())
    }
}

impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            low_latency_hint: false,
            wanted_latency_micros: 20_000,
        }
    }
}

use std::sync::Arc;

use crate::models::error::OutputError;
use crate::models::format::StreamFormat;
use crate::models::policy::BufferingPolicy;

/// Buffering-relevant facts reported by a playback device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Whether the device accepts a single-buffer low-latency queue.
    pub single_buffer_low_latency: bool,

    /// Device-preferred callback quantum in frames, if known.
    pub preferred_frames_per_buffer: Option<u32>,
}

/// Handler the device invokes exactly once per buffer period.
///
/// Runs on the device's own execution context; the device never runs two
/// invocations concurrently. The handler must finish within one buffer
/// period's worth of wall-clock time.
pub type RefillHandler = Arc<dyn Fn() + Send + Sync + 'static>;

/// Process-wide handle to the platform audio subsystem.
///
/// The single mixer resource all streams share: created once by the host
/// process, torn down once. Hands out playback endpoints sized for a
/// stream's negotiated slot layout.
pub trait PlaybackDevice: Send + Sync {
    type Endpoint: PlaybackEndpoint + 'static;

    /// Whether the underlying audio subsystem is initialized and usable.
    fn is_available(&self) -> bool;

    /// Capabilities consulted when deriving a stream's buffering policy.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Create a playback endpoint with a queue of `policy.slot_count`
    /// slots of `policy.slot_bytes` each.
    fn create_endpoint(
        &self,
        format: StreamFormat,
        policy: &BufferingPolicy,
    ) -> Result<Arc<Self::Endpoint>, OutputError>;
}

/// A device-level playback queue created for one stream.
pub trait PlaybackEndpoint: Send + Sync {
    /// Install the handler the device invokes once per buffer period.
    fn register_refill(&self, handler: RefillHandler);

    /// Remove the refill handler.
    ///
    /// Must not return while an invocation is in flight; once this returns
    /// the device makes no further refill calls. This is what makes
    /// closing a stream during playback safe.
    fn unregister_refill(&self);

    /// Hand one filled slot's worth of samples to the device for playback.
    fn enqueue(&self, data: &[u8]) -> Result<(), OutputError>;

    /// Start or stop consuming queued slots.
    ///
    /// Stopping must not return while a refill invocation is in flight, so
    /// callers can mutate slot state as soon as it does.
    fn set_playing(&self, playing: bool) -> Result<(), OutputError>;

    /// Drop every slot currently queued for playback.
    fn discard_queued(&self);

    /// Tear the endpoint down. Idempotent; never fails.
    fn destroy(&self);
}

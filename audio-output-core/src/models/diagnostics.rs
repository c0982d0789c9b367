/// Counters for debugging playback streams.
///
/// Updated on the refill and control paths, snapshot-readable through
/// `OutputStream::diagnostics`. Refill-deadline tracking is deliberately
/// absent; a missed deadline surfaces only as audible underrun downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamDiagnostics {
    /// Refill handler invocations delivered by the device.
    pub refill_count: u64,

    /// Producer calls made while priming the queue at first play.
    pub primed_slots: u64,

    /// Slots the device refused to accept.
    pub enqueue_failures: u64,

    /// Times the queued audio was discarded via `flush`.
    pub flush_count: u64,

    /// Total bytes requested from the producer callback.
    pub bytes_produced: u64,
}

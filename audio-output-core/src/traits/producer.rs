use std::sync::Arc;

/// Callback that produces interleaved 16-bit PCM on demand.
///
/// Must write exactly `buf.len()` bytes before returning, within one
/// buffer period of wall-clock time. Fires on the device's refill context,
/// except while a first `play` primes the queue, when it runs on the
/// caller. It must never block on the stream's own control operations;
/// doing so deadlocks playback against `pause` and `close`.
pub type SampleProducer = Arc<dyn Fn(&mut [u8]) + Send + Sync + 'static>;

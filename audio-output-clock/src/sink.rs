/// Destination for slots the device has finished scheduling.
///
/// `play` fires on the device clock thread, once per buffer period, in
/// queue order. Keep processing shorter than one buffer period or every
/// stream on the device falls behind.
pub trait PlaybackSink: Send + Sync {
    fn play(&self, data: &[u8]);
}

/// Sink that discards everything played into it.
pub struct NullSink;

impl PlaybackSink for NullSink {
    fn play(&self, _data: &[u8]) {}
}

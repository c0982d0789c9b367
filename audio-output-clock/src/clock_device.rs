//! Clock-driven playback device.
//!
//! Models a platform audio subsystem as a dedicated worker thread: each
//! endpoint is paced by a thread that wakes once per buffer period, hands
//! the oldest queued slot to the sink, and invokes the stream's registered
//! refill handler. Slot storage is recycled, so nothing allocates on the
//! tick or enqueue paths after creation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use audio_output_core::models::error::OutputError;
use audio_output_core::models::format::StreamFormat;
use audio_output_core::models::policy::BufferingPolicy;
use audio_output_core::traits::device::{
    DeviceCapabilities, PlaybackDevice, PlaybackEndpoint, RefillHandler,
};

use crate::sink::PlaybackSink;

/// Process-wide clock-driven device context.
///
/// The host creates one of these per output sink, up front, and binds
/// streams to it. Capabilities are fixed at construction.
pub struct ClockDevice {
    capabilities: DeviceCapabilities,
    sink: Arc<dyn PlaybackSink>,
}

impl ClockDevice {
    pub fn new(sink: Arc<dyn PlaybackSink>) -> Self {
        Self {
            capabilities: DeviceCapabilities::default(),
            sink,
        }
    }

    pub fn with_capabilities(sink: Arc<dyn PlaybackSink>, capabilities: DeviceCapabilities) -> Self {
        Self { capabilities, sink }
    }
}

impl PlaybackDevice for ClockDevice {
    type Endpoint = ClockedEndpoint;

    fn is_available(&self) -> bool {
        true
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn create_endpoint(
        &self,
        format: StreamFormat,
        policy: &BufferingPolicy,
    ) -> Result<Arc<ClockedEndpoint>, OutputError> {
        ClockedEndpoint::spawn(format, policy, Arc::clone(&self.sink))
    }
}

/// Recycled slot storage: every buffer is allocated once at creation and
/// moves between the free list and the playback queue.
struct SlotQueue {
    free: Vec<Box<[u8]>>,
    queued: VecDeque<Box<[u8]>>,
}

/// Playback queue paced by a dedicated clock thread.
///
/// Lock order is handler → queue. The clock thread holds the handler lock
/// for the whole tick, which is what lets `set_playing(false)` and
/// `unregister_refill` guarantee no refill is in flight once they return.
pub struct ClockedEndpoint {
    period: Duration,
    slot_bytes: usize,
    handler: Mutex<Option<RefillHandler>>,
    queue: Mutex<SlotQueue>,
    playing: AtomicBool,
    running: Arc<AtomicBool>,
    clock_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ClockedEndpoint {
    fn spawn(
        format: StreamFormat,
        policy: &BufferingPolicy,
        sink: Arc<dyn PlaybackSink>,
    ) -> Result<Arc<Self>, OutputError> {
        if policy.slot_count == 0 || policy.slot_bytes == 0 {
            return Err(OutputError::DeviceCreation(
                "slot layout must be non-empty".into(),
            ));
        }

        let period = format.bytes_to_duration(policy.slot_bytes);
        let endpoint = Arc::new(Self {
            period,
            slot_bytes: policy.slot_bytes,
            handler: Mutex::new(None),
            queue: Mutex::new(SlotQueue {
                free: (0..policy.slot_count)
                    .map(|_| vec![0u8; policy.slot_bytes].into_boxed_slice())
                    .collect(),
                queued: VecDeque::with_capacity(policy.slot_count),
            }),
            playing: AtomicBool::new(false),
            running: Arc::new(AtomicBool::new(true)),
            clock_handle: Mutex::new(None),
        });

        // The clock thread only holds a weak reference, so dropping the
        // last strong handle tears the endpoint down.
        let weak = Arc::downgrade(&endpoint);
        let running = Arc::clone(&endpoint.running);
        let handle = thread::Builder::new()
            .name("audio-clock".into())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    thread::sleep(period);
                    let Some(endpoint) = weak.upgrade() else {
                        break;
                    };
                    endpoint.tick(&sink);
                }
            })
            .map_err(|e| {
                OutputError::DeviceCreation(format!("failed to spawn clock thread: {}", e))
            })?;
        *endpoint.clock_handle.lock() = Some(handle);

        log::debug!(
            "clocked endpoint created: {} slot(s) of {} bytes, period {:?}",
            policy.slot_count,
            policy.slot_bytes,
            period
        );
        Ok(endpoint)
    }

    /// Duration of audio held by one slot (the refill deadline).
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of slots currently waiting to be played.
    pub fn queued_slots(&self) -> usize {
        self.queue.lock().queued.len()
    }

    /// One buffer period: play the oldest queued slot into the sink, then
    /// ask the stream for a refill.
    fn tick(&self, sink: &Arc<dyn PlaybackSink>) {
        let handler = self.handler.lock();
        if !self.playing.load(Ordering::SeqCst) {
            return;
        }

        let slot = self.queue.lock().queued.pop_front();
        match slot {
            Some(slot) => {
                sink.play(&slot);
                self.queue.lock().free.push(slot);
            }
            // Queue ran dry: audible underrun downstream, not a reported
            // error. The refill below is the recovery.
            None => log::debug!("clock tick with no queued slot"),
        }

        if let Some(ref handler) = *handler {
            handler();
        }
    }
}

impl PlaybackEndpoint for ClockedEndpoint {
    fn register_refill(&self, handler: RefillHandler) {
        *self.handler.lock() = Some(handler);
    }

    fn unregister_refill(&self) {
        // Acquiring the lock waits out an in-flight tick; once cleared the
        // clock can never invoke the handler again.
        *self.handler.lock() = None;
    }

    fn enqueue(&self, data: &[u8]) -> Result<(), OutputError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(OutputError::DeviceOperation("endpoint destroyed".into()));
        }
        if data.len() != self.slot_bytes {
            return Err(OutputError::DeviceOperation(format!(
                "enqueue of {} bytes into {}-byte slots",
                data.len(),
                self.slot_bytes
            )));
        }

        let mut queue = self.queue.lock();
        let Some(mut slot) = queue.free.pop() else {
            return Err(OutputError::DeviceOperation("playback queue full".into()));
        };
        slot.copy_from_slice(data);
        queue.queued.push_back(slot);
        Ok(())
    }

    fn set_playing(&self, playing: bool) -> Result<(), OutputError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(OutputError::DeviceOperation("endpoint destroyed".into()));
        }
        if playing {
            self.playing.store(true, Ordering::SeqCst);
        } else {
            // Hold the handler lock so a tick in progress finishes before
            // this returns; callers may then mutate slot state safely.
            let _quiesce = self.handler.lock();
            self.playing.store(false, Ordering::SeqCst);
        }
        Ok(())
    }

    fn discard_queued(&self) {
        let mut queue = self.queue.lock();
        while let Some(slot) = queue.queued.pop_front() {
            queue.free.push(slot);
        }
    }

    fn destroy(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.playing.store(false, Ordering::SeqCst);
        if let Some(handle) = self.clock_handle.lock().take() {
            // The clock thread itself can drop the final strong handle;
            // joining would then self-deadlock.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        self.discard_queued();
        log::debug!("clocked endpoint destroyed");
    }
}

impl Drop for ClockedEndpoint {
    fn drop(&mut self) {
        self.destroy();
    }
}

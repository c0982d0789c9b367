use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::pool::BufferPool;
use crate::models::config::OpenConfig;
use crate::models::diagnostics::StreamDiagnostics;
use crate::models::error::OutputError;
use crate::models::format::StreamFormat;
use crate::models::policy::BufferingPolicy;
use crate::models::state::StreamState;
use crate::traits::delegate::StreamDelegate;
use crate::traits::device::{PlaybackDevice, PlaybackEndpoint, RefillHandler};
use crate::traits::producer::SampleProducer;

/// State shared between the control path and the device's refill context.
struct RefillShared {
    pool: BufferPool,
    producer: SampleProducer,
    diagnostics: StreamDiagnostics,
}

/// Streaming PCM output driven by a device-owned refill clock.
///
/// Owns the slot pool, negotiates the buffering policy at open time,
/// registers the refill handler with the playback endpoint, and forwards
/// buffer-fill requests to the producer callback:
///
/// ```text
/// open → play → (device tick → producer fill → enqueue)* → pause/flush → close
/// ```
///
/// A single control path issues `open`/`play`/`pause`/`flush`/`close`; the
/// device invokes the refill handler on its own context, serialized by the
/// device. Control operations that mutate slot state halt refill delivery
/// first (pause or unregister), so a refill can never observe a freed or
/// reset buffer.
pub struct OutputStream<D: PlaybackDevice> {
    device: D,
    state: StreamState,
    format: Option<StreamFormat>,
    policy: Option<BufferingPolicy>,
    endpoint: Option<Arc<D::Endpoint>>,
    shared: Option<Arc<Mutex<RefillShared>>>,
    queued: bool,
    delegate: Option<Arc<dyn StreamDelegate>>,
}

impl<D: PlaybackDevice> OutputStream<D> {
    /// Create a closed stream bound to `device`.
    pub fn new(device: D) -> Self {
        Self {
            device,
            state: StreamState::Closed,
            format: None,
            policy: None,
            endpoint: None,
            shared: None,
            queued: false,
            delegate: None,
        }
    }

    /// Install an event observer.
    ///
    /// Install before `open` to also receive warnings raised on the
    /// device's refill context.
    pub fn set_delegate(&mut self, delegate: Arc<dyn StreamDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    pub fn policy(&self) -> Option<BufferingPolicy> {
        self.policy
    }

    /// Snapshot of the stream's counters. Zeroed once the stream closes.
    pub fn diagnostics(&self) -> StreamDiagnostics {
        self.shared
            .as_ref()
            .map(|shared| shared.lock().diagnostics)
            .unwrap_or_default()
    }

    /// Open the stream: derive the buffering policy, allocate the slot
    /// pool, create the device endpoint, and register the refill handler.
    /// Playback does not start until `play`.
    ///
    /// Opening an already-open stream logs a warning and returns `Ok`
    /// without touching any state or allocating anything. If endpoint
    /// creation fails, the pool allocated for it is released and the
    /// stream stays Closed.
    pub fn open(
        &mut self,
        format: StreamFormat,
        producer: SampleProducer,
        config: OpenConfig,
    ) -> Result<(), OutputError> {
        if self.endpoint.is_some() {
            log::warn!("stream already open");
            return Ok(());
        }
        if !self.device.is_available() {
            return Err(OutputError::Configuration(
                "audio device context not available".into(),
            ));
        }
        format.validate().map_err(OutputError::Configuration)?;
        config.validate().map_err(OutputError::Configuration)?;

        let policy = BufferingPolicy::derive(format, &config, &self.device.capabilities());
        let shared = Arc::new(Mutex::new(RefillShared {
            pool: BufferPool::new(policy.slot_count, policy.slot_bytes),
            producer,
            diagnostics: StreamDiagnostics::default(),
        }));

        let endpoint = self.device.create_endpoint(format, &policy)?;
        endpoint.register_refill(Self::refill_handler(
            &shared,
            &endpoint,
            self.delegate.clone(),
        ));

        log::debug!(
            "opened playback {} Hz, {} channel(s), {} slot(s) of {} bytes",
            format.sample_rate,
            format.channels,
            policy.slot_count,
            policy.slot_bytes
        );

        self.format = Some(format);
        self.policy = Some(policy);
        self.shared = Some(shared);
        self.endpoint = Some(endpoint);
        self.queued = false;
        self.set_state(StreamState::Open);
        Ok(())
    }

    /// Start (or resume) playback. No-op unless Open or Paused.
    ///
    /// On the first call after `open` or `flush`, fills and enqueues every
    /// slot exactly once, in index order, before asking the device to
    /// start, so the queue never starts empty. A device-level start failure
    /// is logged and leaves the stream in its prior state.
    pub fn play(&mut self) {
        if !matches!(self.state, StreamState::Open | StreamState::Paused) {
            return;
        }
        let (endpoint, shared) = match (self.endpoint.as_ref(), self.shared.as_ref()) {
            (Some(endpoint), Some(shared)) => (Arc::clone(endpoint), Arc::clone(shared)),
            _ => return,
        };

        if !self.queued {
            let mut guard = shared.lock();
            let RefillShared {
                pool,
                producer,
                diagnostics,
            } = &mut *guard;
            for index in 0..pool.slot_count() {
                producer(pool.slot_mut(index));
                diagnostics.primed_slots += 1;
                diagnostics.bytes_produced += pool.slot_bytes() as u64;
                if let Err(error) = endpoint.enqueue(pool.slot(index)) {
                    diagnostics.enqueue_failures += 1;
                    log::warn!("priming enqueue failed for slot {}: {}", index, error);
                }
            }
            drop(guard);
            self.queued = true;
        }

        match endpoint.set_playing(true) {
            Ok(()) => {
                log::debug!("started playback");
                self.set_state(StreamState::Playing);
            }
            Err(error) => {
                log::warn!("failed to start playback: {}", error);
                self.notify_warning(&error);
            }
        }
    }

    /// Pause playback. No-op unless Playing.
    ///
    /// Slots already queued to the device are kept; the next `play`
    /// resumes from the same queue position without re-priming. A device
    /// failure is logged and leaves the stream Playing.
    pub fn pause(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        let Some(endpoint) = self.endpoint.as_ref().map(Arc::clone) else {
            return;
        };
        match endpoint.set_playing(false) {
            Ok(()) => {
                log::debug!("paused playback");
                self.set_state(StreamState::Paused);
            }
            Err(error) => {
                log::warn!("failed to pause playback: {}", error);
                self.notify_warning(&error);
            }
        }
    }

    /// Discard queued audio without tearing the stream down.
    ///
    /// Pauses first if playing, drops every slot queued to the device, and
    /// resets the fill cursor so the next `play` primes again from slot 0.
    /// No-op on a closed stream.
    pub fn flush(&mut self) {
        if self.endpoint.is_none() {
            return;
        }
        self.pause();
        log::debug!("discarding queued samples");
        if let Some(endpoint) = self.endpoint.as_ref() {
            endpoint.discard_queued();
        }
        if let Some(shared) = self.shared.as_ref() {
            let mut guard = shared.lock();
            guard.pool.reset_cursor();
            guard.diagnostics.flush_count += 1;
        }
        self.queued = false;
    }

    /// Close the stream and release everything it owns. Never fails; safe
    /// to call at any time, from any state.
    ///
    /// The refill handler is unregistered before the endpoint is destroyed
    /// and the pool freed, so no refill call can observe a freed slot.
    pub fn close(&mut self) {
        let Some(endpoint) = self.endpoint.take() else {
            log::debug!("close called on a stream that is not open");
            return;
        };
        log::debug!("closing stream");
        if let Err(error) = endpoint.set_playing(false) {
            log::debug!("stop on close failed: {}", error);
        }
        endpoint.unregister_refill();
        endpoint.destroy();
        drop(endpoint);

        self.shared = None;
        self.format = None;
        self.policy = None;
        self.queued = false;
        self.set_state(StreamState::Closed);
    }

    /// Build the handler the device invokes once per buffer period: fill
    /// the cursor slot via the producer, hand it back to the device, and
    /// advance the cursor modulo the slot count.
    fn refill_handler(
        shared: &Arc<Mutex<RefillShared>>,
        endpoint: &Arc<D::Endpoint>,
        delegate: Option<Arc<dyn StreamDelegate>>,
    ) -> RefillHandler {
        let shared = Arc::clone(shared);
        let endpoint = Arc::clone(endpoint);
        Arc::new(move || {
            let mut guard = shared.lock();
            let RefillShared {
                pool,
                producer,
                diagnostics,
            } = &mut *guard;

            let index = pool.cursor();
            producer(pool.slot_mut(index));
            diagnostics.refill_count += 1;
            diagnostics.bytes_produced += pool.slot_bytes() as u64;

            if let Err(error) = endpoint.enqueue(pool.slot(index)) {
                diagnostics.enqueue_failures += 1;
                log::warn!("enqueue failed for slot {}: {}", index, error);
                if let Some(ref delegate) = delegate {
                    delegate.on_device_warning(&error);
                }
            }
            pool.advance();
        })
    }

    fn set_state(&mut self, state: StreamState) {
        self.state = state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }

    fn notify_warning(&self, error: &OutputError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_device_warning(error);
        }
    }
}

impl<D: PlaybackDevice> Drop for OutputStream<D> {
    fn drop(&mut self) {
        self.close();
    }
}

use crate::models::error::OutputError;
use crate::models::state::StreamState;

/// Observer for output stream notifications.
///
/// Methods fire on whichever context performs the transition: the control
/// path for open/play/pause/flush/close, the device context for refill
/// warnings. Implementations should marshal to their own thread if needed.
pub trait StreamDelegate: Send + Sync {
    /// Called after every state transition.
    fn on_state_changed(&self, state: StreamState);

    /// Called when a non-fatal device operation fails.
    fn on_device_warning(&self, error: &OutputError);
}

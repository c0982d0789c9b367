use thiserror::Error;

/// Errors surfaced by the output subsystem.
///
/// `Configuration` and `DeviceCreation` come back from `open` and leave the
/// stream Closed with nothing allocated. `DeviceOperation` failures during
/// play/pause transitions are logged by the stream and leave its state
/// unchanged; `close` never fails and is the recovery path from any error
/// state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("device creation failed: {0}")]
    DeviceCreation(String),

    #[error("device operation failed: {0}")]
    DeviceOperation(String),
}

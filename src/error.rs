//! Error types for the monitor

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the monitor and its capture backend
#[derive(Debug, Error)]
pub enum Error {
    /// The user or platform refused microphone access
    #[error("microphone access denied")]
    PermissionDenied,

    /// No usable input device, or the device went away during setup
    #[error("audio input device unavailable: {0}")]
    DeviceUnavailable(String),

    /// `connect()` called while a capture graph is already live
    #[error("monitor is already connected")]
    AlreadyConnected,

    /// `volume()` called while disconnected
    #[error("monitor is not connected")]
    NotConnected,

    /// Failure building or running the capture stream
    #[error("audio stream error: {0}")]
    Stream(String),

    /// Invalid or unreadable configuration
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

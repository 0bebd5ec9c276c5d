//! Device error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while acquiring, reading or writing devices
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("X-Arcade not found: {0}")]
    NotFound(String),

    #[error("Failed to get exclusive access to {path:?}: {source}")]
    Busy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create virtual device: {0}")]
    CreateSink(#[source] std::io::Error),

    #[error("Failed to emit event: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to read events: {0}")]
    Read(#[source] std::io::Error),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Device already released")]
    Released,

    #[error("Event kind {0} cannot be written to this device")]
    Unsupported(&'static str),
}

impl DeviceError {
    /// Classify a failed `EVIOCGRAB`
    ///
    /// `EBUSY` means another process holds the grab; anything else is a plain
    /// open failure.
    pub fn from_grab(path: PathBuf, source: std::io::Error) -> Self {
        if source.raw_os_error() == Some(libc::EBUSY) {
            DeviceError::Busy { path, source }
        } else {
            DeviceError::Open { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grab_ebusy_is_busy() {
        let err = DeviceError::from_grab(
            PathBuf::from("/dev/input/event3"),
            std::io::Error::from_raw_os_error(libc::EBUSY),
        );
        assert!(matches!(err, DeviceError::Busy { .. }));
        assert!(err.to_string().starts_with("Failed to get exclusive access"));
    }

    #[test]
    fn test_grab_other_errno_is_open() {
        let err = DeviceError::from_grab(
            PathBuf::from("/dev/input/event3"),
            std::io::Error::from_raw_os_error(libc::EACCES),
        );
        assert!(matches!(err, DeviceError::Open { .. }));
    }
}

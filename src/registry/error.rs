//! Registry error types
//!
//! Error types for capture registry operations.

use crate::capture::CaptureError;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Negative video device ID
    InvalidVideoDevice(i32),
    /// Negative audio device ID
    InvalidAudioDevice(i32),
    /// Backend failed to construct a capture
    Capture(CaptureError),
    /// Device enumerator failed to initialize or enumerate
    Enumerator(CaptureError),
    /// No format registered under this name
    UnknownFormat(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::InvalidVideoDevice(id) => write!(f, "Invalid video device ID: {}", id),
            RegistryError::InvalidAudioDevice(id) => write!(f, "Invalid audio device ID: {}", id),
            RegistryError::Capture(err) => write!(f, "Capture initialization error: {}", err),
            RegistryError::Enumerator(err) => write!(f, "Device enumerator error: {}", err),
            RegistryError::UnknownFormat(name) => write!(f, "Unknown format: {}", name),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Capture(err) | RegistryError::Enumerator(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CaptureError> for RegistryError {
    fn from(err: CaptureError) -> Self {
        RegistryError::Capture(err)
    }
}

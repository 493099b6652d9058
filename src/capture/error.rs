//! Capture error types
//!
//! Errors reported by capture backends, either while constructing a handle
//! or later as the handle's runtime error state.

use std::path::PathBuf;

/// Error raised by a capture device or capture backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No device with this ID is attached
    DeviceNotFound(i32),
    /// The device or file could not be opened
    OpenFailed(String),
    /// The device opened but refused to start streaming
    StartFailed(String),
    /// The device went away while capturing (e.g. unplugged)
    Disconnected(String),
    /// Source file for a file capture does not exist
    FileNotFound(PathBuf),
    /// Any other backend failure
    Backend(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::DeviceNotFound(id) => write!(f, "Capture device not found: {}", id),
            CaptureError::OpenFailed(msg) => write!(f, "Failed to open capture: {}", msg),
            CaptureError::StartFailed(msg) => write!(f, "Failed to start capture: {}", msg),
            CaptureError::Disconnected(msg) => write!(f, "Capture device disconnected: {}", msg),
            CaptureError::FileNotFound(path) => {
                write!(f, "Capture file not found: {}", path.display())
            }
            CaptureError::Backend(msg) => write!(f, "Capture backend error: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CaptureError::DeviceNotFound(2).to_string(),
            "Capture device not found: 2"
        );
        assert_eq!(
            CaptureError::FileNotFound(PathBuf::from("/tmp/clip.mp4")).to_string(),
            "Capture file not found: /tmp/clip.mp4"
        );
    }
}

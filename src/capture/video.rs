//! Video capture handle contract
//!
//! A video capture is owned by a backend (a camera driver, a file decoder).
//! The registry only needs to know where a capture reads from, whether it is
//! healthy, and how to reopen it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::CaptureError;

/// Shared handle to a video capture
///
/// Captures are reference counted: the registry and any number of callers
/// may hold the same handle.
pub type VideoCaptureHandle = Arc<dyn VideoCapture>;

/// Callback invoked by a capture when it enters an error state
pub type ErrorListener = Arc<dyn Fn(&CaptureError) + Send + Sync>;

/// Where a capture reads its frames from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaptureSource {
    /// Physical device, by enumeration ID
    Device(i32),
    /// Media file on disk
    File(PathBuf),
}

impl CaptureSource {
    /// Device ID, if this is a physical device
    pub fn device_id(&self) -> Option<i32> {
        match self {
            CaptureSource::Device(id) => Some(*id),
            CaptureSource::File(_) => None,
        }
    }

    /// File path, if this is a file-backed source
    pub fn path(&self) -> Option<&Path> {
        match self {
            CaptureSource::Device(_) => None,
            CaptureSource::File(path) => Some(path),
        }
    }
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSource::Device(id) => write!(f, "device:{}", id),
            CaptureSource::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// A video capture as seen by the registry
///
/// Implementations must not hold internal locks while invoking error
/// listeners; listeners call back into the registry.
pub trait VideoCapture: Send + Sync + fmt::Debug {
    /// Source this capture reads from
    fn source(&self) -> &CaptureSource;

    /// Device ID for device-backed captures
    fn device_id(&self) -> Option<i32> {
        self.source().device_id()
    }

    /// Open (or reopen) the underlying device or file
    ///
    /// A successful open clears the error state; a failed one leaves it set.
    fn open(&self) -> Result<(), CaptureError>;

    /// Start producing frames
    ///
    /// A failed start leaves the error state set.
    fn start(&self) -> Result<(), CaptureError>;

    /// Stop producing frames
    fn stop(&self);

    /// Current error state, `None` while healthy
    fn error(&self) -> Option<CaptureError>;

    /// Register a listener fired on each transition into an error state
    ///
    /// Errors raised before the listener was registered must not be replayed
    /// to it; callers check [`error`](Self::error) after registering.
    fn on_error(&self, listener: ErrorListener);
}

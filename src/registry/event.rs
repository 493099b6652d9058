//! Registry notifications

use crate::capture::{CaptureError, VideoCaptureHandle};

/// Event broadcast to registry subscribers
///
/// Cheap to clone: captures are shared handles.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A capture was created, or recovered by a reload sweep
    CaptureLoaded(VideoCaptureHandle),
    /// A tracked capture entered an error state
    CaptureError {
        capture: VideoCaptureHandle,
        error: CaptureError,
    },
}

impl RegistryEvent {
    /// The capture this event is about
    pub fn capture(&self) -> &VideoCaptureHandle {
        match self {
            RegistryEvent::CaptureLoaded(capture) => capture,
            RegistryEvent::CaptureError { capture, .. } => capture,
        }
    }

    /// Whether this is a [`RegistryEvent::CaptureLoaded`]
    pub fn is_loaded(&self) -> bool {
        matches!(self, RegistryEvent::CaptureLoaded(_))
    }

    /// Whether this is a [`RegistryEvent::CaptureError`]
    pub fn is_error(&self) -> bool {
        matches!(self, RegistryEvent::CaptureError { .. })
    }
}

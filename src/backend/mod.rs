//! Capture backends
//!
//! A backend is the factory the registry calls into: it hands out the device
//! enumerator and constructs capture handles. Native camera and audio
//! libraries plug in here.
//!
//! The [`memory`] backend simulates devices in-process and is what the
//! tests and the demo run against.

use std::path::Path;
use std::sync::Arc;

use crate::capture::{AudioCaptureHandle, AudioParams, CaptureError, VideoCaptureHandle};
use crate::device::DeviceEnumerator;

pub mod memory;

pub use memory::{MemoryAudioCapture, MemoryBackend, MemoryEnumerator, MemoryVideoCapture};

/// Factory for device enumerators and capture handles
pub trait CaptureBackend: Send + Sync {
    /// Create the enumerator the registry will own
    fn device_enumerator(&self) -> Result<Arc<dyn DeviceEnumerator>, CaptureError>;

    /// Construct a video capture bound to a physical device
    ///
    /// The returned capture is already opened and started.
    fn open_video_device(&self, device_id: i32) -> Result<VideoCaptureHandle, CaptureError>;

    /// Construct a video capture reading from a media file
    fn open_video_file(&self, path: &Path) -> Result<VideoCaptureHandle, CaptureError>;

    /// Construct an audio capture on an input device
    fn open_audio_device(&self, params: &AudioParams) -> Result<AudioCaptureHandle, CaptureError>;
}

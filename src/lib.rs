//! Registry for video and audio capture devices
//!
//! `capture-registry` creates, caches and supervises capture handles on top
//! of a pluggable [`CaptureBackend`](backend::CaptureBackend):
//!
//! - One shared video capture per physical device, created on demand
//! - Untracked file and audio captures
//! - Error notifications and a reload sweep for captures that fail at runtime
//! - A catalog of supported media formats
//!
//! # Example
//!
//! ```
//! use capture_registry::backend::MemoryBackend;
//! use capture_registry::CaptureRegistry;
//!
//! let backend = MemoryBackend::new().with_video_device(0, "Integrated Camera");
//! let registry = CaptureRegistry::new(backend).unwrap();
//!
//! registry.load_video_captures().unwrap();
//! let camera = registry.create_video_capture(0).unwrap();
//! assert!(camera.error().is_none());
//! assert_eq!(registry.video_capture_count(), 1);
//!
//! registry.shutdown();
//! ```

pub mod backend;
pub mod capture;
pub mod device;
pub mod format;
pub mod registry;

pub use capture::{
    AudioCapture, AudioCaptureHandle, CaptureError, CaptureSource, SampleFormat, VideoCapture,
    VideoCaptureHandle,
};
pub use device::{Device, DeviceEnumerator, DeviceKind};
pub use format::{Format, FormatCatalog};
pub use registry::{CaptureRegistry, RegistryConfig, RegistryError, RegistryEvent};

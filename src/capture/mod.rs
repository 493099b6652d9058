//! Capture handles
//!
//! This module defines the contracts the registry relies on:
//! - Video captures (device or file backed, reopenable, report errors)
//! - Audio captures (device backed, never cached)
//! - The error type shared by both

pub mod audio;
pub mod error;
pub mod video;

pub use audio::{AudioCapture, AudioCaptureHandle, AudioParams, SampleFormat};
pub use error::CaptureError;
pub use video::{CaptureSource, ErrorListener, VideoCapture, VideoCaptureHandle};

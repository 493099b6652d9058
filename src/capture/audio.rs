//! Audio capture handle contract

use std::fmt;
use std::sync::Arc;

use super::error::CaptureError;

/// Shared handle to an audio capture
pub type AudioCaptureHandle = Arc<dyn AudioCapture>;

/// Sample format delivered by an audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// Signed 8-bit integer
    S8,
    /// Signed 16-bit integer
    S16,
    /// Signed 24-bit integer
    S24,
    /// Signed 32-bit integer
    S32,
    /// 32-bit float, normalized to [-1, 1]
    F32,
    /// 64-bit float, normalized to [-1, 1]
    F64,
}

impl SampleFormat {
    /// Size of one sample in bytes
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::S8 => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S24 => 3,
            SampleFormat::S32 | SampleFormat::F32 => 4,
            SampleFormat::F64 => 8,
        }
    }

    /// Short name as used by common media tooling
    pub fn name(self) -> &'static str {
        match self {
            SampleFormat::S8 => "s8",
            SampleFormat::S16 => "s16",
            SampleFormat::S24 => "s24",
            SampleFormat::S32 => "s32",
            SampleFormat::F32 => "flt",
            SampleFormat::F64 => "dbl",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for opening an audio input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioParams {
    /// Device enumeration ID
    pub device_id: i32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Samples per second per channel
    pub sample_rate: u32,
    /// Sample format
    pub format: SampleFormat,
}

impl AudioParams {
    /// Create audio parameters
    pub fn new(device_id: i32, channels: u16, sample_rate: u32, format: SampleFormat) -> Self {
        Self {
            device_id,
            channels,
            sample_rate,
            format,
        }
    }

    /// Bytes in one frame (one sample for every channel)
    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.format.bytes_per_sample()
    }
}

/// An audio capture as seen by the registry
pub trait AudioCapture: Send + Sync + fmt::Debug {
    /// Parameters the capture was opened with
    fn params(&self) -> &AudioParams;

    fn device_id(&self) -> i32 {
        self.params().device_id
    }

    fn open(&self) -> Result<(), CaptureError>;

    fn start(&self) -> Result<(), CaptureError>;

    fn stop(&self);

    /// Current error state, `None` while healthy
    fn error(&self) -> Option<CaptureError>;
}

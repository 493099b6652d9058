//! Media format and codec descriptors

use std::fmt;

/// Video codec settings for a format
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCodec {
    /// Display name (e.g. "H.264")
    pub name: String,
    /// Encoder identifier (e.g. "libx264")
    pub encoder: String,
    /// Frame width in pixels (0 = source)
    pub width: u32,
    /// Frame height in pixels (0 = source)
    pub height: u32,
    /// Frames per second (0 = source)
    pub fps: f64,
    /// Target bitrate in bits/sec (0 = encoder default)
    pub bit_rate: u64,
    /// Pixel format name (e.g. "yuv420p")
    pub pixel_fmt: String,
}

impl VideoCodec {
    pub fn new(name: impl Into<String>, encoder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoder: encoder.into(),
            width: 0,
            height: 0,
            fps: 0.0,
            bit_rate: 0,
            pixel_fmt: String::new(),
        }
    }

    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    pub fn pixel_fmt(mut self, pixel_fmt: impl Into<String>) -> Self {
        self.pixel_fmt = pixel_fmt.into();
        self
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.encoder)?;
        if self.width > 0 && self.height > 0 {
            write!(f, " {}x{}", self.width, self.height)?;
        }
        if self.fps > 0.0 {
            write!(f, " @{}fps", self.fps)?;
        }
        Ok(())
    }
}

/// Audio codec settings for a format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCodec {
    /// Display name (e.g. "AAC")
    pub name: String,
    /// Encoder identifier (e.g. "aac")
    pub encoder: String,
    /// Channel count (0 = source)
    pub channels: u16,
    /// Sample rate in Hz (0 = source)
    pub sample_rate: u32,
    /// Target bitrate in bits/sec (0 = encoder default)
    pub bit_rate: u64,
    /// Sample format name (e.g. "fltp")
    pub sample_fmt: String,
}

impl AudioCodec {
    pub fn new(name: impl Into<String>, encoder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoder: encoder.into(),
            channels: 0,
            sample_rate: 0,
            bit_rate: 0,
            sample_fmt: String::new(),
        }
    }

    pub fn channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    pub fn sample_fmt(mut self, sample_fmt: impl Into<String>) -> Self {
        self.sample_fmt = sample_fmt.into();
        self
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.encoder)?;
        if self.channels > 0 {
            write!(f, " {}ch", self.channels)?;
        }
        if self.sample_rate > 0 {
            write!(f, " {}Hz", self.sample_rate)?;
        }
        Ok(())
    }
}

/// Which streams a format carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Neither video nor audio configured
    None,
    /// Video only
    Video,
    /// Audio only
    Audio,
    /// Video and audio multiplexed
    Multiplex,
}

/// A named output format with optional video and audio codecs
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    /// Display name, unique within a catalog (e.g. "MP4")
    pub name: String,
    /// Short container identifier (e.g. "mp4")
    pub id: String,
    /// Video codec, if the format carries video
    pub video: Option<VideoCodec>,
    /// Audio codec, if the format carries audio
    pub audio: Option<AudioCodec>,
    /// Higher priority formats sort first
    pub priority: i32,
}

impl Format {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            video: None,
            audio: None,
            priority: 0,
        }
    }

    pub fn with_video(mut self, codec: VideoCodec) -> Self {
        self.video = Some(codec);
        self
    }

    pub fn with_audio(mut self, codec: AudioCodec) -> Self {
        self.audio = Some(codec);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Derive the format kind from the configured codecs
    pub fn kind(&self) -> FormatKind {
        match (&self.video, &self.audio) {
            (Some(_), Some(_)) => FormatKind::Multiplex,
            (Some(_), None) => FormatKind::Video,
            (None, Some(_)) => FormatKind::Audio,
            (None, None) => FormatKind::None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

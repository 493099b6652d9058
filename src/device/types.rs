//! Device descriptors

use std::fmt;

/// Kind of capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Camera or other video source
    Video,
    /// Microphone or other audio input
    Audio,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Video => f.write_str("video"),
            DeviceKind::Audio => f.write_str("audio"),
        }
    }
}

/// A capture device reported by the platform enumerator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Video or audio
    pub kind: DeviceKind,
    /// Enumeration ID, used to open the device
    pub id: i32,
    /// Human-readable name
    pub name: String,
    /// Stable platform identifier (may be empty)
    pub guid: String,
    /// Whether the platform marks this as the default device
    pub is_default: bool,
}

impl Device {
    /// Create a video device descriptor
    pub fn video(id: i32, name: impl Into<String>) -> Self {
        Self::new(DeviceKind::Video, id, name)
    }

    /// Create an audio device descriptor
    pub fn audio(id: i32, name: impl Into<String>) -> Self {
        Self::new(DeviceKind::Audio, id, name)
    }

    fn new(kind: DeviceKind, id: i32, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
            guid: String::new(),
            is_default: false,
        }
    }

    /// Set the platform identifier
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    /// Mark as the platform default
    pub fn set_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.id, self.name, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_descriptor() {
        let camera = Device::video(0, "Front Camera")
            .with_guid("usb-0000:00:14.0-1")
            .set_default(true);
        assert_eq!(camera.kind, DeviceKind::Video);
        assert_eq!(camera.guid, "usb-0000:00:14.0-1");
        assert!(camera.is_default);
        assert_eq!(camera.to_string(), "[0] Front Camera (video)");

        let mic = Device::audio(3, "Headset");
        assert!(mic.guid.is_empty());
        assert!(!mic.is_default);
        assert_eq!(mic.to_string(), "[3] Headset (audio)");
    }
}

//! Device enumeration contract

use crate::capture::CaptureError;

use super::types::Device;

/// Lists the capture devices attached to the system
///
/// The registry initializes the enumerator when it is built and
/// uninitializes it on shutdown.
pub trait DeviceEnumerator: Send + Sync {
    /// Bring up the enumeration backend
    fn initialize(&self) -> Result<(), CaptureError>;

    /// Release the enumeration backend
    fn uninitialize(&self);

    /// Currently attached video capture devices
    fn video_capture_devices(&self) -> Result<Vec<Device>, CaptureError>;

    /// Currently attached audio input devices
    fn audio_input_devices(&self) -> Result<Vec<Device>, CaptureError>;

    /// The default video device: the one flagged as default, else the first
    fn default_video_capture_device(&self) -> Result<Option<Device>, CaptureError> {
        Ok(pick_default(self.video_capture_devices()?))
    }

    /// The default audio input: the one flagged as default, else the first
    fn default_audio_input_device(&self) -> Result<Option<Device>, CaptureError> {
        Ok(pick_default(self.audio_input_devices()?))
    }
}

fn pick_default(devices: Vec<Device>) -> Option<Device> {
    let index = devices.iter().position(|d| d.is_default).unwrap_or(0);
    devices.into_iter().nth(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEnumerator(Vec<Device>);

    impl DeviceEnumerator for FixedEnumerator {
        fn initialize(&self) -> Result<(), CaptureError> {
            Ok(())
        }

        fn uninitialize(&self) {}

        fn video_capture_devices(&self) -> Result<Vec<Device>, CaptureError> {
            Ok(self.0.clone())
        }

        fn audio_input_devices(&self) -> Result<Vec<Device>, CaptureError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_default_prefers_flagged_device() {
        let enumerator = FixedEnumerator(vec![
            Device::video(0, "Integrated Camera"),
            Device::video(1, "USB Webcam").set_default(true),
        ]);

        let device = enumerator.default_video_capture_device().unwrap().unwrap();
        assert_eq!(device.id, 1);
    }

    #[test]
    fn test_default_falls_back_to_first() {
        let enumerator = FixedEnumerator(vec![
            Device::video(5, "Capture Card"),
            Device::video(6, "USB Webcam"),
        ]);

        let device = enumerator.default_video_capture_device().unwrap().unwrap();
        assert_eq!(device.id, 5);
        assert!(enumerator.default_audio_input_device().unwrap().is_none());
    }
}

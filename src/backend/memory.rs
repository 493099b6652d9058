//! In-process capture backend
//!
//! Simulates a set of attached devices without touching hardware. Devices
//! can be unplugged and plugged back in, and individual devices can be made
//! to fail on open, which is enough to drive the registry through every
//! lifecycle path.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::capture::{
    AudioCapture, AudioCaptureHandle, AudioParams, CaptureError, CaptureSource, ErrorListener,
    VideoCapture, VideoCaptureHandle,
};
use crate::device::{Device, DeviceEnumerator};

use super::CaptureBackend;

#[derive(Debug, Default)]
struct BackendState {
    video_devices: Vec<Device>,
    audio_devices: Vec<Device>,
    unplugged: HashSet<i32>,
    failing: HashSet<i32>,
    stalling: HashSet<i32>,
    fail_init: bool,
    initialized: bool,
    /// Construction attempts per video device
    opened: HashMap<i32, usize>,
    /// Device captures handed out, for unplug notification
    live: Vec<Weak<MemoryVideoCapture>>,
}

type SharedState = Arc<Mutex<BackendState>>;

fn lock(state: &Mutex<BackendState>) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Backend over a simulated set of devices
///
/// Cloning is cheap and every clone controls the same devices, so a test can
/// hand one clone to the registry and keep another to pull plugs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: SharedState,
}

impl MemoryBackend {
    /// Create a backend with no devices
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a video device; the first one added is the default
    pub fn with_video_device(self, id: i32, name: impl Into<String>) -> Self {
        {
            let mut state = lock(&self.state);
            let is_default = state.video_devices.is_empty();
            state
                .video_devices
                .push(Device::video(id, name).set_default(is_default));
        }
        self
    }

    /// Attach an audio input; the first one added is the default
    pub fn with_audio_device(self, id: i32, name: impl Into<String>) -> Self {
        {
            let mut state = lock(&self.state);
            let is_default = state.audio_devices.is_empty();
            state
                .audio_devices
                .push(Device::audio(id, name).set_default(is_default));
        }
        self
    }

    /// Simulate pulling a device's cable
    ///
    /// The device disappears from enumeration and every live capture bound
    /// to it enters an error state.
    pub fn unplug(&self, device_id: i32) {
        let captures: Vec<Arc<MemoryVideoCapture>> = {
            let mut state = lock(&self.state);
            state.unplugged.insert(device_id);
            state.live.retain(|weak| weak.strong_count() > 0);
            state
                .live
                .iter()
                .filter_map(Weak::upgrade)
                .filter(|capture| capture.source.device_id() == Some(device_id))
                .collect()
        };

        tracing::debug!(
            device_id = device_id,
            captures = captures.len(),
            "Simulated device unplugged"
        );

        for capture in captures {
            capture.fail(CaptureError::Disconnected(format!(
                "device {} unplugged",
                device_id
            )));
        }
    }

    /// Reattach a previously unplugged device
    pub fn plug(&self, device_id: i32) {
        lock(&self.state).unplugged.remove(&device_id);
        tracing::debug!(device_id = device_id, "Simulated device plugged in");
    }

    /// Make every future open of this device fail
    pub fn fail_open(&self, device_id: i32) {
        lock(&self.state).failing.insert(device_id);
    }

    /// Make every future start of this device fail after a successful open
    pub fn fail_start(&self, device_id: i32) {
        lock(&self.state).stalling.insert(device_id);
    }

    /// Undo [`fail_open`](Self::fail_open) and [`fail_start`](Self::fail_start)
    pub fn clear_failure(&self, device_id: i32) {
        let mut state = lock(&self.state);
        state.failing.remove(&device_id);
        state.stalling.remove(&device_id);
    }

    /// Make the enumerator refuse to initialize
    pub fn fail_enumerator_init(self) -> Self {
        lock(&self.state).fail_init = true;
        self
    }

    /// Number of times a capture was constructed for this device
    pub fn opened_count(&self, device_id: i32) -> usize {
        lock(&self.state)
            .opened
            .get(&device_id)
            .copied()
            .unwrap_or(0)
    }

    /// Whether the enumerator is currently initialized
    pub fn is_initialized(&self) -> bool {
        lock(&self.state).initialized
    }
}

impl CaptureBackend for MemoryBackend {
    fn device_enumerator(&self) -> Result<Arc<dyn DeviceEnumerator>, CaptureError> {
        Ok(Arc::new(MemoryEnumerator {
            state: Arc::clone(&self.state),
        }))
    }

    fn open_video_device(&self, device_id: i32) -> Result<VideoCaptureHandle, CaptureError> {
        {
            let mut state = lock(&self.state);
            if !state.video_devices.iter().any(|d| d.id == device_id) {
                return Err(CaptureError::DeviceNotFound(device_id));
            }
            *state.opened.entry(device_id).or_insert(0) += 1;
        }

        let capture = Arc::new(MemoryVideoCapture::new(
            CaptureSource::Device(device_id),
            Arc::clone(&self.state),
        ));
        capture.open()?;
        capture.start()?;

        lock(&self.state).live.push(Arc::downgrade(&capture));
        Ok(capture)
    }

    fn open_video_file(&self, path: &Path) -> Result<VideoCaptureHandle, CaptureError> {
        let capture = Arc::new(MemoryVideoCapture::new(
            CaptureSource::File(path.to_path_buf()),
            Arc::clone(&self.state),
        ));
        capture.open()?;
        capture.start()?;
        Ok(capture)
    }

    fn open_audio_device(&self, params: &AudioParams) -> Result<AudioCaptureHandle, CaptureError> {
        let capture = Arc::new(MemoryAudioCapture {
            params: *params,
            backend: Arc::clone(&self.state),
            status: Mutex::new(CaptureStatus::default()),
        });
        capture.open()?;
        capture.start()?;
        Ok(capture)
    }
}

/// Enumerator over the simulated devices
#[derive(Debug)]
pub struct MemoryEnumerator {
    state: SharedState,
}

impl MemoryEnumerator {
    fn attached(
        &self,
        devices: impl Fn(&BackendState) -> &Vec<Device>,
    ) -> Result<Vec<Device>, CaptureError> {
        let state = lock(&self.state);
        if !state.initialized {
            return Err(CaptureError::Backend("enumerator not initialized".into()));
        }
        Ok(devices(&state)
            .iter()
            .filter(|d| !state.unplugged.contains(&d.id))
            .cloned()
            .collect())
    }
}

impl DeviceEnumerator for MemoryEnumerator {
    fn initialize(&self) -> Result<(), CaptureError> {
        let mut state = lock(&self.state);
        if state.fail_init {
            return Err(CaptureError::Backend("device subsystem unavailable".into()));
        }
        state.initialized = true;
        Ok(())
    }

    fn uninitialize(&self) {
        lock(&self.state).initialized = false;
    }

    fn video_capture_devices(&self) -> Result<Vec<Device>, CaptureError> {
        self.attached(|state| &state.video_devices)
    }

    fn audio_input_devices(&self) -> Result<Vec<Device>, CaptureError> {
        self.attached(|state| &state.audio_devices)
    }
}

#[derive(Debug, Default)]
struct CaptureStatus {
    opened: bool,
    running: bool,
    error: Option<CaptureError>,
}

/// Simulated video capture
pub struct MemoryVideoCapture {
    source: CaptureSource,
    backend: SharedState,
    status: Mutex<CaptureStatus>,
    listeners: Mutex<Vec<ErrorListener>>,
}

impl MemoryVideoCapture {
    fn new(source: CaptureSource, backend: SharedState) -> Self {
        Self {
            source,
            backend,
            status: Mutex::new(CaptureStatus::default()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn status(&self) -> MutexGuard<'_, CaptureStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the capture is currently producing frames
    pub fn is_running(&self) -> bool {
        self.status().running
    }

    /// Put the capture into an error state
    ///
    /// Listeners fire only on the transition from healthy to failed.
    pub fn fail(&self, error: CaptureError) {
        {
            let mut status = self.status();
            if status.error.is_some() {
                return;
            }
            status.error = Some(error.clone());
            status.opened = false;
            status.running = false;
        }

        let listeners: Vec<ErrorListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in listeners {
            listener(&error);
        }
    }

    fn check_source(&self) -> Result<(), CaptureError> {
        match &self.source {
            CaptureSource::Device(id) => {
                let state = lock(&self.backend);
                if state.unplugged.contains(id) || !state.video_devices.iter().any(|d| d.id == *id)
                {
                    Err(CaptureError::DeviceNotFound(*id))
                } else if state.failing.contains(id) {
                    Err(CaptureError::OpenFailed(format!("device {} is busy", id)))
                } else {
                    Ok(())
                }
            }
            CaptureSource::File(path) if path.exists() => Ok(()),
            CaptureSource::File(path) => Err(CaptureError::FileNotFound(path.clone())),
        }
    }
}

impl fmt::Debug for MemoryVideoCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryVideoCapture")
            .field("source", &self.source)
            .field("status", &*self.status())
            .finish()
    }
}

impl VideoCapture for MemoryVideoCapture {
    fn source(&self) -> &CaptureSource {
        &self.source
    }

    fn open(&self) -> Result<(), CaptureError> {
        let checked = self.check_source();
        let mut status = self.status();
        match checked {
            Ok(()) => {
                status.opened = true;
                status.error = None;
                Ok(())
            }
            Err(err) => {
                status.opened = false;
                status.running = false;
                status.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn start(&self) -> Result<(), CaptureError> {
        let stalled = match self.source.device_id() {
            Some(id) => lock(&self.backend).stalling.contains(&id),
            None => false,
        };

        let mut status = self.status();
        let result = if !status.opened {
            Err(CaptureError::StartFailed("capture is not open".into()))
        } else if stalled {
            Err(CaptureError::StartFailed("device stopped responding".into()))
        } else {
            Ok(())
        };

        match result {
            Ok(()) => {
                status.running = true;
                Ok(())
            }
            Err(err) => {
                status.running = false;
                status.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn stop(&self) {
        self.status().running = false;
    }

    fn error(&self) -> Option<CaptureError> {
        self.status().error.clone()
    }

    fn on_error(&self, listener: ErrorListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}

/// Simulated audio capture
#[derive(Debug)]
pub struct MemoryAudioCapture {
    params: AudioParams,
    backend: SharedState,
    status: Mutex<CaptureStatus>,
}

impl MemoryAudioCapture {
    fn status(&self) -> MutexGuard<'_, CaptureStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the capture is currently delivering samples
    pub fn is_running(&self) -> bool {
        self.status().running
    }
}

impl AudioCapture for MemoryAudioCapture {
    fn params(&self) -> &AudioParams {
        &self.params
    }

    fn open(&self) -> Result<(), CaptureError> {
        let id = self.params.device_id;
        let checked = {
            let state = lock(&self.backend);
            if state.unplugged.contains(&id) || !state.audio_devices.iter().any(|d| d.id == id) {
                Err(CaptureError::DeviceNotFound(id))
            } else if self.params.channels == 0 || self.params.sample_rate == 0 {
                Err(CaptureError::OpenFailed(format!(
                    "unsupported stream: {} channels at {} Hz",
                    self.params.channels, self.params.sample_rate
                )))
            } else {
                Ok(())
            }
        };

        let mut status = self.status();
        status.opened = checked.is_ok();
        status.error = checked.clone().err();
        checked
    }

    fn start(&self) -> Result<(), CaptureError> {
        let mut status = self.status();
        if !status.opened {
            return Err(CaptureError::StartFailed("capture is not open".into()));
        }
        status.running = true;
        Ok(())
    }

    fn stop(&self) {
        self.status().running = false;
    }

    fn error(&self) -> Option<CaptureError> {
        self.status().error.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::capture::SampleFormat;

    fn backend() -> MemoryBackend {
        MemoryBackend::new()
            .with_video_device(0, "Integrated Camera")
            .with_video_device(1, "USB Webcam")
            .with_audio_device(0, "Built-in Microphone")
    }

    #[test]
    fn test_enumerator_requires_initialize() {
        let backend = backend();
        let enumerator = backend.device_enumerator().unwrap();

        assert!(enumerator.video_capture_devices().is_err());

        enumerator.initialize().unwrap();
        assert!(backend.is_initialized());
        assert_eq!(enumerator.video_capture_devices().unwrap().len(), 2);
        assert_eq!(
            enumerator.default_video_capture_device().unwrap().unwrap().id,
            0
        );

        enumerator.uninitialize();
        assert!(!backend.is_initialized());
    }

    #[test]
    fn test_enumerator_init_failure() {
        let backend = backend().fail_enumerator_init();
        let enumerator = backend.device_enumerator().unwrap();
        assert!(matches!(
            enumerator.initialize(),
            Err(CaptureError::Backend(_))
        ));
    }

    #[test]
    fn test_unplug_fires_listener_once() {
        let backend = backend();
        let capture = backend.open_video_device(1).unwrap();
        assert!(capture.error().is_none());

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        capture.on_error(Arc::new(move |err: &CaptureError| {
            assert!(matches!(err, CaptureError::Disconnected(_)));
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        backend.unplug(1);
        backend.unplug(1);

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(capture.error().is_some());

        // Still unplugged: reopen fails and the error stays
        assert_eq!(capture.open(), Err(CaptureError::DeviceNotFound(1)));
        assert!(capture.error().is_some());

        backend.plug(1);
        capture.open().unwrap();
        capture.start().unwrap();
        assert!(capture.error().is_none());
    }

    #[test]
    fn test_unplugged_device_hidden_from_enumeration() {
        let backend = backend();
        let enumerator = backend.device_enumerator().unwrap();
        enumerator.initialize().unwrap();

        backend.unplug(0);
        let ids: Vec<i32> = enumerator
            .video_capture_devices()
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_open_failures() {
        let backend = backend();
        assert_eq!(
            backend.open_video_device(7).unwrap_err(),
            CaptureError::DeviceNotFound(7)
        );

        backend.fail_open(0);
        assert!(matches!(
            backend.open_video_device(0),
            Err(CaptureError::OpenFailed(_))
        ));
        assert_eq!(backend.opened_count(0), 1);

        backend.clear_failure(0);
        assert!(backend.open_video_device(0).is_ok());
        assert_eq!(backend.opened_count(0), 2);
    }

    #[test]
    fn test_file_capture_requires_existing_path() {
        let backend = backend();
        let missing = Path::new("/nonexistent/capture-registry/clip.mp4");
        assert_eq!(
            backend.open_video_file(missing).unwrap_err(),
            CaptureError::FileNotFound(missing.to_path_buf())
        );

        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        let capture = backend.open_video_file(&manifest).unwrap();
        assert_eq!(capture.device_id(), None);
        assert_eq!(capture.source().path(), Some(manifest.as_path()));
    }

    #[test]
    fn test_audio_capture() {
        let backend = backend();

        let params = AudioParams::new(0, 2, 48_000, SampleFormat::F32);
        let capture = backend.open_audio_device(&params).unwrap();
        assert_eq!(capture.device_id(), 0);
        assert!(capture.error().is_none());

        let bad = AudioParams::new(0, 0, 48_000, SampleFormat::F32);
        assert!(matches!(
            backend.open_audio_device(&bad),
            Err(CaptureError::OpenFailed(_))
        ));

        let missing = AudioParams::new(3, 2, 48_000, SampleFormat::S16);
        assert_eq!(
            backend.open_audio_device(&missing).unwrap_err(),
            CaptureError::DeviceNotFound(3)
        );
    }

    #[test]
    fn test_failed_start_keeps_error() {
        let backend = backend();
        let capture = backend.open_video_device(0).unwrap();

        backend.unplug(0);
        backend.plug(0);
        backend.fail_start(0);

        // Open clears the error, the failed start sets it again
        assert!(matches!(capture.start(), Err(CaptureError::StartFailed(_))));
        capture.open().unwrap();
        assert!(matches!(capture.start(), Err(CaptureError::StartFailed(_))));
        assert!(matches!(capture.error(), Some(CaptureError::StartFailed(_))));

        backend.clear_failure(0);
        capture.open().unwrap();
        capture.start().unwrap();
        assert!(capture.error().is_none());
    }

    #[test]
    fn test_running_state() {
        let backend = backend();

        let video = MemoryVideoCapture::new(CaptureSource::Device(1), Arc::clone(&backend.state));
        assert!(!video.is_running());
        video.open().unwrap();
        video.start().unwrap();
        assert!(video.is_running());
        video.stop();
        assert!(!video.is_running());

        let audio = MemoryAudioCapture {
            params: AudioParams::new(0, 1, 16_000, SampleFormat::S16),
            backend: Arc::clone(&backend.state),
            status: Mutex::new(CaptureStatus::default()),
        };
        audio.open().unwrap();
        audio.start().unwrap();
        assert!(audio.is_running());
        audio.stop();
        assert!(!audio.is_running());
    }
}

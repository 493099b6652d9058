//! Capture registry implementation
//!
//! The central registry that owns the device enumerator and the format
//! catalog, and tracks at most one video capture per physical device.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

use tokio::sync::broadcast;

use crate::backend::CaptureBackend;
use crate::capture::{
    AudioCaptureHandle, AudioParams, CaptureError, SampleFormat, VideoCaptureHandle,
};
use crate::device::DeviceEnumerator;
use crate::format::FormatCatalog;

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::event::RegistryEvent;

/// Tracked video captures, keyed by device ID
pub type VideoCaptureMap = BTreeMap<i32, VideoCaptureHandle>;

/// Outcome of a reload sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// Captures in an error state or left over from a failed sweep
    pub attempted: usize,
    /// Captures reopened and healthy again
    pub recovered: usize,
    /// Captures still failing
    pub failed: usize,
}

struct RegistryState {
    devices: Arc<dyn DeviceEnumerator>,
    formats: FormatCatalog,
    video_captures: VideoCaptureMap,
    /// Devices whose last reload failed, retried even if the capture
    /// no longer reports an error
    retry: BTreeSet<i32>,
    /// Bumped every time tracked captures are dropped
    generation: u64,
    initialized: bool,
}

struct Shared {
    state: Mutex<RegistryState>,
    backend: Arc<dyn CaptureBackend>,
    events: broadcast::Sender<RegistryEvent>,
    owner: ThreadId,
    config: RegistryConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn assert_owner_thread(&self, operation: &str) {
        if self.config.enforce_owner_thread {
            assert_eq!(
                thread::current().id(),
                self.owner,
                "{} must run on the thread that created the capture registry",
                operation
            );
        }
    }

    fn emit(&self, event: RegistryEvent) {
        // send() only fails when nobody is subscribed
        let receivers = self.events.send(event).unwrap_or(0);
        tracing::trace!(receivers = receivers, "Registry event emitted");
    }

    fn on_video_capture_error(&self, device_id: i32, generation: u64, error: &CaptureError) {
        let (capture, current) = {
            let state = self.lock();
            (state.video_captures.get(&device_id).cloned(), state.generation)
        };

        if generation != current {
            tracing::debug!(
                device_id = device_id,
                error = %error,
                "Ignoring error from unloaded video capture"
            );
            return;
        }

        match capture {
            Some(capture) => {
                tracing::warn!(device_id = device_id, error = %error, "Video capture error");
                self.emit(RegistryEvent::CaptureError {
                    capture,
                    error: error.clone(),
                });
            }
            // Captures only leave the map through unload, which bumps the generation
            None => panic!(
                "video capture {} reported an error but is not tracked by the registry",
                device_id
            ),
        }
    }

    fn release(&self) {
        let (devices, captures) = {
            let mut state = self.lock();
            if !state.initialized {
                return;
            }
            state.initialized = false;
            state.generation += 1;
            state.retry.clear();
            (
                Arc::clone(&state.devices),
                std::mem::take(&mut state.video_captures),
            )
        };

        devices.uninitialize();
        tracing::info!(captures = captures.len(), "Capture registry shut down");
    }
}

/// Registry of capture handles
///
/// Build one per process and share it as `Arc<CaptureRegistry>`. Enumeration,
/// reload and shutdown must happen on the thread that built it; everything
/// else is thread-safe behind a single lock. Readers get snapshots so they
/// never iterate while holding that lock.
pub struct CaptureRegistry {
    shared: Arc<Shared>,
}

impl CaptureRegistry {
    /// Create a registry over a backend with default configuration
    pub fn new<B: CaptureBackend + 'static>(backend: B) -> Result<Self, RegistryError> {
        Self::with_config(backend, RegistryConfig::default())
    }

    /// Create a registry with custom configuration
    ///
    /// Initializes the backend's device enumerator. The calling thread
    /// becomes the owner thread.
    pub fn with_config<B: CaptureBackend + 'static>(
        backend: B,
        config: RegistryConfig,
    ) -> Result<Self, RegistryError> {
        let backend: Arc<dyn CaptureBackend> = Arc::new(backend);

        let devices = backend
            .device_enumerator()
            .map_err(RegistryError::Enumerator)?;
        devices.initialize().map_err(RegistryError::Enumerator)?;

        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let load_on_start = config.load_on_start;

        let registry = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RegistryState {
                    devices,
                    formats: FormatCatalog::new(),
                    video_captures: VideoCaptureMap::new(),
                    retry: BTreeSet::new(),
                    generation: 0,
                    initialized: true,
                }),
                backend,
                events,
                owner: thread::current().id(),
                config,
            }),
        };

        tracing::debug!("Capture registry initialized");

        if load_on_start {
            registry.load_video_captures()?;
        }

        Ok(registry)
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.shared.config
    }

    /// Subscribe to capture loaded/error events
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.shared.events.subscribe()
    }

    /// The device enumerator owned by this registry
    pub fn devices(&self) -> Arc<dyn DeviceEnumerator> {
        Arc::clone(&self.shared.lock().devices)
    }

    /// Snapshot of the format catalog
    pub fn formats(&self) -> FormatCatalog {
        self.shared.lock().formats.clone()
    }

    /// Mutate the format catalog under the registry lock
    pub fn update_formats<R>(&self, f: impl FnOnce(&mut FormatCatalog) -> R) -> R {
        f(&mut self.shared.lock().formats)
    }

    /// Create a capture for every attached video device
    ///
    /// A device that fails to open is logged and skipped. Returns the number
    /// of devices that now have a capture.
    ///
    /// # Panics
    ///
    /// Panics when called off the owner thread.
    pub fn load_video_captures(&self) -> Result<usize, RegistryError> {
        tracing::debug!("Loading video captures");
        self.shared.assert_owner_thread("load_video_captures");

        let devices = self
            .devices()
            .video_capture_devices()
            .map_err(RegistryError::Enumerator)?;

        let mut loaded = 0;
        for device in &devices {
            match self.create_video_capture(device.id) {
                Ok(_) => loaded += 1,
                Err(err) => {
                    tracing::error!(
                        device_id = device.id,
                        device = %device.name,
                        error = %err,
                        "Cannot load video capture"
                    );
                }
            }
        }

        Ok(loaded)
    }

    /// Try to reopen every tracked capture that is in an error state
    ///
    /// Recovered captures are announced with [`RegistryEvent::CaptureLoaded`].
    /// Captures that still fail are retried by the next sweep, even when the
    /// backend cleared their error during the failed reopen.
    ///
    /// # Panics
    ///
    /// Panics when called off the owner thread.
    pub fn reload_failed_video_captures(&self) -> ReloadReport {
        tracing::debug!("Reloading failed video captures");
        self.shared.assert_owner_thread("reload_failed_video_captures");

        let mut report = ReloadReport::default();

        let (captures, retry) = {
            let state = self.shared.lock();
            (state.video_captures.clone(), state.retry.clone())
        };

        for (device_id, capture) in captures {
            let error = capture.error();
            if error.is_none() && !retry.contains(&device_id) {
                continue;
            }
            report.attempted += 1;

            tracing::trace!(device_id = device_id, error = ?error, "Reloading capture");

            let recovered = match capture.open().and_then(|()| capture.start()) {
                Ok(()) if capture.error().is_none() => true,
                Ok(()) => {
                    tracing::warn!(
                        device_id = device_id,
                        "Video capture still failing after reload"
                    );
                    false
                }
                Err(err) => {
                    tracing::warn!(
                        device_id = device_id,
                        error = %err,
                        "Capture initialization error"
                    );
                    false
                }
            };

            if recovered {
                report.recovered += 1;
                self.shared.lock().retry.remove(&device_id);
                tracing::info!(device_id = device_id, "Video capture reloaded");
                self.shared
                    .emit(RegistryEvent::CaptureLoaded(Arc::clone(&capture)));
            } else {
                report.failed += 1;
                let mut state = self.shared.lock();
                // Skip captures unloaded while this sweep ran
                if state
                    .video_captures
                    .get(&device_id)
                    .is_some_and(|tracked| Arc::ptr_eq(tracked, &capture))
                {
                    state.retry.insert(device_id);
                }
            }
        }

        report
    }

    /// Snapshot of tracked video captures
    pub fn video_captures(&self) -> VideoCaptureMap {
        self.shared.lock().video_captures.clone()
    }

    /// Tracked video capture for a device, if any
    pub fn video_capture(&self, device_id: i32) -> Option<VideoCaptureHandle> {
        self.shared.lock().video_captures.get(&device_id).cloned()
    }

    /// Number of tracked video captures
    pub fn video_capture_count(&self) -> usize {
        self.shared.lock().video_captures.len()
    }

    /// Stop tracking every video capture
    ///
    /// Captures are not stopped here; each one is torn down when its last
    /// handle is dropped.
    pub fn unload_video_captures(&self) {
        let captures = {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.retry.clear();
            std::mem::take(&mut state.video_captures)
        };

        tracing::debug!(captures = captures.len(), "Video captures unloaded");
    }

    /// Get or create the video capture for a physical device
    ///
    /// Returns the tracked capture if one exists. Otherwise the backend opens
    /// and starts a new one, which is tracked and announced with
    /// [`RegistryEvent::CaptureLoaded`]. Construction errors go straight to
    /// the caller and never show up as [`RegistryEvent::CaptureError`].
    pub fn create_video_capture(&self, device_id: i32) -> Result<VideoCaptureHandle, RegistryError> {
        tracing::trace!(device_id = device_id, "Creating video capture");

        if device_id < 0 {
            return Err(RegistryError::InvalidVideoDevice(device_id));
        }

        let (capture, generation) = {
            let mut state = self.shared.lock();

            if let Some(capture) = state.video_captures.get(&device_id) {
                tracing::debug!(device_id = device_id, "Video capture already loaded");
                return Ok(Arc::clone(capture));
            }

            let capture = self.shared.backend.open_video_device(device_id)?;
            state
                .video_captures
                .insert(device_id, Arc::clone(&capture));

            tracing::info!(
                device_id = device_id,
                captures = state.video_captures.len(),
                "Video capture loaded"
            );
            self.shared
                .emit(RegistryEvent::CaptureLoaded(Arc::clone(&capture)));

            (capture, state.generation)
        };

        // Attached after the capture has started; failures while opening or
        // starting are reported through the Err path above.
        let fired = Arc::new(AtomicBool::new(false));
        let listener_fired = Arc::clone(&fired);
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        capture.on_error(Arc::new(move |error: &CaptureError| {
            listener_fired.store(true, Ordering::SeqCst);
            if let Some(shared) = shared.upgrade() {
                shared.on_video_capture_error(device_id, generation, error);
            }
        }));

        // A capture that failed before the listener existed never fires it
        if let Some(error) = capture.error() {
            if !fired.load(Ordering::SeqCst) {
                self.shared
                    .on_video_capture_error(device_id, generation, &error);
            }
        }

        Ok(capture)
    }

    /// Create an untracked capture reading from a media file
    ///
    /// Every call opens a fresh capture.
    pub fn create_file_capture(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<VideoCaptureHandle, RegistryError> {
        let path = path.as_ref();
        tracing::trace!(path = %path.display(), "Creating video file capture");

        Ok(self.shared.backend.open_video_file(path)?)
    }

    /// Create an untracked capture on an audio input device
    ///
    /// Audio captures are not cached; every call opens a fresh capture.
    pub fn create_audio_capture(
        &self,
        device_id: i32,
        channels: u16,
        sample_rate: u32,
        format: SampleFormat,
    ) -> Result<AudioCaptureHandle, RegistryError> {
        tracing::trace!(device_id = device_id, "Creating audio capture");

        if device_id < 0 {
            return Err(RegistryError::InvalidAudioDevice(device_id));
        }

        let params = AudioParams::new(device_id, channels, sample_rate, format);
        Ok(self.shared.backend.open_audio_device(&params)?)
    }

    /// Drop every tracked capture and release the device enumerator
    ///
    /// # Panics
    ///
    /// Panics when called off the owner thread.
    pub fn shutdown(self) {
        self.shared.assert_owner_thread("shutdown");
        self.shared.release();
    }
}

impl Drop for CaptureRegistry {
    fn drop(&mut self) {
        self.shared.release();
    }
}

impl fmt::Debug for CaptureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("CaptureRegistry")
            .field("video_captures", &state.video_captures.keys())
            .field("formats", &state.formats.len())
            .field("initialized", &state.initialized)
            .field("owner", &self.shared.owner)
            .finish()
    }
}

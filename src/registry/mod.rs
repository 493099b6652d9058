//! Capture registry
//!
//! The registry owns the device enumerator and format catalog, and keeps one
//! shared video capture per physical device. Errors reported by tracked
//! captures are fanned out to subscribers through a `tokio::sync::broadcast`
//! channel.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<CaptureRegistry>
//!                  ┌──────────────────────────────┐
//!                  │ Mutex<                       │
//!                  │   devices: DeviceEnumerator, │
//!                  │   formats: FormatCatalog,    │
//!                  │   video_captures:            │
//!                  │     BTreeMap<id, Arc<dyn     │
//!                  │       VideoCapture>>         │
//!                  │ >                            │
//!                  │ events: broadcast::Tx        │
//!                  └──────┬───────────────▲───────┘
//!                         │               │ on_error(listener)
//!        create_video_    │               │
//!        capture(id) ─────┼──► backend ───┴── VideoCapture
//!                         │
//!                         ▼
//!             CaptureLoaded / CaptureError ──► subscribers
//! ```
//!
//! # Snapshots
//!
//! Readers (`video_captures()`, `formats()`, the reload sweep) copy what they
//! need under the lock and iterate afterwards. A snapshot can be stale, but
//! nobody iterates or calls into a backend while holding the registry lock.

pub mod config;
pub mod error;
pub mod event;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use event::RegistryEvent;
pub use store::{CaptureRegistry, ReloadReport, VideoCaptureMap};

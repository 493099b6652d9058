//! Capture device discovery

pub mod enumerator;
pub mod types;

pub use enumerator::DeviceEnumerator;
pub use types::{Device, DeviceKind};

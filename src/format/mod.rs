//! Supported media formats

pub mod catalog;
pub mod codec;

pub use catalog::FormatCatalog;
pub use codec::{AudioCodec, Format, FormatKind, VideoCodec};

//! Format catalog
//!
//! Named formats the application can record or stream in, with an optional
//! default.

use crate::registry::RegistryError;

use super::codec::Format;

/// Catalog of supported media formats, keyed by name
#[derive(Debug, Clone, Default)]
pub struct FormatCatalog {
    formats: Vec<Format>,
    default: Option<String>,
}

impl FormatCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a format, replacing any existing format with the same name
    pub fn register(&mut self, format: Format) {
        match self.formats.iter_mut().find(|f| f.name == format.name) {
            Some(existing) => *existing = format,
            None => self.formats.push(format),
        }
    }

    /// Remove a format by name
    ///
    /// Returns false if no such format was registered. Removing the default
    /// format clears the default.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.formats.len();
        self.formats.retain(|f| f.name != name);

        if self.default.as_deref() == Some(name) {
            self.default = None;
        }

        self.formats.len() != before
    }

    /// Look up a format by name
    pub fn get(&self, name: &str) -> Option<&Format> {
        self.formats.iter().find(|f| f.name == name)
    }

    /// Look up a format by its short container ID
    ///
    /// When several formats share an ID, the highest priority one wins.
    pub fn get_by_id(&self, id: &str) -> Option<&Format> {
        self.formats
            .iter()
            .filter(|f| f.id == id)
            .max_by_key(|f| f.priority)
    }

    /// Look up a format by name, falling back to the default format
    pub fn get_or_default(&self, name: &str) -> Option<&Format> {
        self.get(name).or_else(|| self.default_format())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set the default format
    pub fn set_default(&mut self, name: &str) -> Result<(), RegistryError> {
        if !self.exists(name) {
            return Err(RegistryError::UnknownFormat(name.to_string()));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    /// The default format, if one is set
    pub fn default_format(&self) -> Option<&Format> {
        self.default.as_deref().and_then(|name| self.get(name))
    }

    /// All formats, highest priority first, ties ordered by name
    pub fn formats(&self) -> Vec<&Format> {
        let mut formats: Vec<&Format> = self.formats.iter().collect();
        formats.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
        formats
    }

    /// Remove every format and the default
    pub fn clear(&mut self) {
        self.formats.clear();
        self.default = None;
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::codec::{AudioCodec, VideoCodec};

    fn mp4() -> Format {
        Format::new("MP4", "mp4")
            .with_video(VideoCodec::new("H.264", "libx264"))
            .with_audio(AudioCodec::new("AAC", "aac"))
            .with_priority(10)
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut catalog = FormatCatalog::new();
        catalog.register(mp4());
        catalog.register(mp4().with_priority(3));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("MP4").unwrap().priority, 3);
    }

    #[test]
    fn test_formats_sorted_by_priority() {
        let mut catalog = FormatCatalog::new();
        catalog.register(Format::new("WebM", "webm").with_priority(5));
        catalog.register(mp4());
        catalog.register(Format::new("FLV", "flv").with_priority(5));

        let names: Vec<&str> = catalog.formats().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["MP4", "FLV", "WebM"]);
    }

    #[test]
    fn test_default_format() {
        let mut catalog = FormatCatalog::new();
        catalog.register(mp4());

        assert!(catalog.default_format().is_none());
        assert_eq!(
            catalog.set_default("MKV"),
            Err(RegistryError::UnknownFormat("MKV".into()))
        );

        catalog.set_default("MP4").unwrap();
        assert_eq!(catalog.get_or_default("MKV").unwrap().name, "MP4");

        // Dropping the default clears it
        assert!(catalog.unregister("MP4"));
        assert!(catalog.default_format().is_none());
        assert!(!catalog.unregister("MP4"));
    }

    #[test]
    fn test_get_by_id_prefers_priority() {
        let mut catalog = FormatCatalog::new();
        catalog.register(Format::new("MP4 (fast)", "mp4").with_priority(1));
        catalog.register(mp4());

        assert_eq!(catalog.get_by_id("mp4").unwrap().name, "MP4");
        assert!(catalog.get_by_id("ogg").is_none());

        catalog.clear();
        assert!(catalog.is_empty());
    }
}

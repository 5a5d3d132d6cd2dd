//! Asset and derived key naming

use std::fmt;

/// Prefix under which every derivative is stored
pub const RESIZED_PREFIX: &str = "resized/";

/// Key of an original object in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    /// Returns `None` for empty or blank keys
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last non-empty path segment
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.0)
    }

    /// Lowercased extension of the file name, if any
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// MIME type guessed from the extension
    pub fn content_type(&self) -> mime::Mime {
        match self.extension().as_deref() {
            Some("jpg" | "jpeg" | "jpe") => mime::IMAGE_JPEG,
            Some("png") => mime::IMAGE_PNG,
            Some("gif") => mime::IMAGE_GIF,
            Some("bmp") => mime::IMAGE_BMP,
            Some("svg") => mime::IMAGE_SVG,
            Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
            Some("tif" | "tiff") => "image/tiff".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
            Some("ico") => "image/x-icon".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
            _ => mime::APPLICATION_OCTET_STREAM,
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store key of the `size` derivative of `key`.
///
/// The size is embedded verbatim in front of the original key, matching
/// objects already written under `resized/`.
pub fn derive_key(size: u32, key: &AssetKey) -> String {
    format!("{RESIZED_PREFIX}{size}{}", key.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> AssetKey {
        AssetKey::new(raw).unwrap()
    }

    #[test]
    fn test_blank_keys_rejected() {
        assert!(AssetKey::new("").is_none());
        assert!(AssetKey::new("   ").is_none());
        assert!(AssetKey::new("a.jpg").is_some());
    }

    #[test]
    fn test_derive_key_format() {
        assert_eq!(derive_key(500, &key("photo.jpg")), "resized/500photo.jpg");
        assert_eq!(
            derive_key(120, &key("/events/2018/cover.png")),
            "resized/120/events/2018/cover.png"
        );
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let k = key("events/cover.jpg");
        assert_eq!(derive_key(300, &k), derive_key(300, &k));
    }

    #[test]
    fn test_distinct_sizes_give_distinct_keys() {
        let k = key("events/cover.jpg");
        let derived: std::collections::HashSet<_> =
            [1, 10, 100, 250, 500, 1000].iter().map(|s| derive_key(*s, &k)).collect();
        assert_eq!(derived.len(), 6);
    }

    #[test]
    fn test_file_name_and_extension() {
        let k = key("events/2018/Cover.JPG");
        assert_eq!(k.file_name(), "Cover.JPG");
        assert_eq!(k.extension().as_deref(), Some("jpg"));
        assert_eq!(k.content_type(), mime::IMAGE_JPEG);

        let k = key("events/folder/");
        assert_eq!(k.file_name(), "folder");
        assert_eq!(k.extension(), None);

        assert_eq!(key(".hidden").extension(), None);
    }

    #[test]
    fn test_content_type_fallback() {
        assert_eq!(key("a.png").content_type(), mime::IMAGE_PNG);
        assert_eq!(key("a.webp").content_type().essence_str(), "image/webp");
        assert_eq!(key("archive.bin").content_type(), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(key("noext").content_type(), mime::APPLICATION_OCTET_STREAM);
    }
}

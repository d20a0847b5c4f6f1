use ahash::{AHashMap, AHashSet};

/// Label given to files whose extension is not registered.
pub const UNKNOWN_MEDIA_TYPE: &str = "unknown";

/// Seed used for a fresh store when the configuration names no media types.
pub const DEFAULT_MEDIA_TYPES: &[(&str, &str)] = &[
    (".jpg", "image"),
    (".jpeg", "image"),
    (".png", "image"),
    (".bmp", "image"),
    (".tif", "image"),
    (".tiff", "image"),
    (".webp", "image"),
    (".heic", "image"),
    (".gif", "gif"),
    (".mp4", "video"),
    (".mov", "video"),
    (".mkv", "video"),
    (".avi", "video"),
    (".webm", "video"),
    (".mp3", "audio"),
    (".flac", "audio"),
    (".wav", "audio"),
    (".ogg", "audio"),
    (".m4a", "audio"),
];

/// Lower-cases an extension and makes sure it carries its leading dot.
pub fn normalize_extension(extension: &str) -> String {
    let lower = extension.trim().to_lowercase();
    if lower.is_empty() || lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// Extension → media type label, plus the set of extensions the scanner keeps.
/// Loaded once per coordinator and not changed afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    extension_to_type: AHashMap<String, String>,
    valid_extensions: AHashSet<String>,
}

impl ExtensionRegistry {
    pub fn from_mappings<I, K, V>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let extension_to_type: AHashMap<String, String> = mappings
            .into_iter()
            .map(|(ext, label)| (normalize_extension(ext.as_ref()), label.into()))
            .filter(|(ext, _)| !ext.is_empty())
            .collect();
        let valid_extensions = extension_to_type.keys().cloned().collect();
        Self {
            extension_to_type,
            valid_extensions,
        }
    }

    pub fn media_type_for(&self, extension: &str) -> &str {
        self.extension_to_type
            .get(&normalize_extension(extension))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_MEDIA_TYPE)
    }

    pub fn is_valid(&self, extension: &str) -> bool {
        self.valid_extensions.contains(&normalize_extension(extension))
    }

    pub fn valid_extensions(&self) -> &AHashSet<String> {
        &self.valid_extensions
    }

    pub fn len(&self) -> usize {
        self.extension_to_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension_to_type.is_empty()
    }
}

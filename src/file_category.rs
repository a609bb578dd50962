//! Extension-to-category lookup for extension based sorting.
//!
//! This module provides the [`ExtensionMap`] consulted by the extension
//! classifier, the built-in default table it starts from, and the helpers
//! that split a file name into stem and extension.
//!
//! # Examples
//!
//! ```
//! use dirsort::file_category::ExtensionMap;
//!
//! let map = ExtensionMap::default();
//! assert_eq!(map.category_for("PNG"), "PNG Images");
//! assert_eq!(map.category_for("xyz"), "XYZ");
//! ```

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Built-in extension table used when no profile is configured.
pub const DEFAULT_EXTENSION_TABLE: &[(&str, &str)] = &[
    // Documents
    ("txt", "Text Files"),
    ("doc", "Word Documents"),
    ("docx", "Word Documents"),
    ("xls", "Excel Workbooks"),
    ("xlsx", "Excel Workbooks"),
    ("ppt", "PowerPoint Presentations"),
    ("pptx", "PowerPoint Presentations"),
    ("pdf", "PDF Files"),
    ("csv", "CSV Tables"),
    ("rtf", "RTF Documents"),
    ("odt", "OpenDocument Text"),
    ("ods", "OpenDocument Spreadsheets"),
    ("odp", "OpenDocument Presentations"),
    ("md", "Markdown Files"),
    ("epub", "EPUB Ebooks"),
    ("mobi", "MOBI Ebooks"),
    ("azw3", "AZW3 Ebooks"),
    ("djvu", "DjVu Documents"),
    ("chm", "CHM Help Files"),
    ("wps", "WPS Documents"),
    ("vsd", "Visio Drawings"),
    ("vsdx", "Visio Drawings"),
    ("one", "OneNote Documents"),
    // Images
    ("jpg", "JPEG Images"),
    ("jpeg", "JPEG Images"),
    ("png", "PNG Images"),
    ("gif", "GIF Images"),
    ("bmp", "BMP Images"),
    ("svg", "SVG Images"),
    ("tif", "TIFF Images"),
    ("tiff", "TIFF Images"),
    ("webp", "WebP Images"),
    ("ico", "Icon Files"),
    ("psd", "Photoshop Files"),
    ("ai", "Illustrator Files"),
    ("raw", "RAW Images"),
    ("heic", "HEIC Images"),
    ("heif", "HEIF Images"),
    // Video
    ("mp4", "MP4 Videos"),
    ("avi", "AVI Videos"),
    ("mov", "MOV Videos"),
    ("mkv", "MKV Videos"),
    ("wmv", "WMV Videos"),
    ("flv", "FLV Videos"),
    ("webm", "WebM Videos"),
    ("m4v", "M4V Videos"),
    ("mpg", "MPEG Videos"),
    ("mpeg", "MPEG Videos"),
    ("3gp", "3GP Videos"),
    ("rmvb", "RMVB Videos"),
    ("ogv", "OGG Videos"),
    // Audio
    ("mp3", "MP3 Audio"),
    ("wav", "WAV Audio"),
    ("flac", "FLAC Audio"),
    ("aac", "AAC Audio"),
    ("ogg", "OGG Audio"),
    ("oga", "OGG Audio"),
    ("wma", "WMA Audio"),
    ("m4a", "M4A Audio"),
    ("opus", "Opus Audio"),
    ("mid", "MIDI Audio"),
    ("midi", "MIDI Audio"),
    ("aiff", "AIFF Audio"),
    // Archives
    ("zip", "Archives"),
    ("rar", "Archives"),
    ("7z", "Archives"),
    ("tar", "Archives"),
    ("gz", "Archives"),
    ("bz2", "BZip2 Archives"),
    ("xz", "XZ Archives"),
    ("cab", "CAB Archives"),
    ("jar", "Java Archives"),
    // Source code
    ("py", "Python Files"),
    ("java", "Java Files"),
    ("class", "Java Bytecode"),
    ("js", "JavaScript Files"),
    ("jsx", "JSX Files"),
    ("ts", "TypeScript Files"),
    ("tsx", "TSX Files"),
    ("vue", "Vue Files"),
    ("html", "HTML Files"),
    ("css", "CSS Files"),
    ("scss", "SCSS Files"),
    ("sass", "Sass Files"),
    ("less", "Less Files"),
    ("json", "JSON Files"),
    ("xml", "XML Files"),
    ("sql", "SQL Files"),
    ("c", "C Files"),
    ("h", "Header Files"),
    ("cpp", "C++ Files"),
    ("cs", "C# Files"),
    ("go", "Go Files"),
    ("rs", "Rust Files"),
    ("php", "PHP Files"),
    ("rb", "Ruby Files"),
    ("swift", "Swift Files"),
    ("kt", "Kotlin Files"),
    ("scala", "Scala Files"),
    ("dart", "Dart Files"),
    ("lua", "Lua Files"),
    ("pl", "Perl Files"),
    ("r", "R Files"),
    ("hs", "Haskell Files"),
    ("ex", "Elixir Files"),
    ("erl", "Erlang Files"),
    ("asm", "Assembly Files"),
    // Scripts and configuration
    ("sh", "Shell Scripts"),
    ("bash", "Bash Scripts"),
    ("zsh", "Zsh Scripts"),
    ("ps1", "PowerShell Scripts"),
    ("bat", "Batch Files"),
    ("cmd", "Command Scripts"),
    ("yaml", "YAML Files"),
    ("yml", "YAML Files"),
    ("toml", "TOML Files"),
    ("ini", "INI Files"),
    ("cfg", "Config Files"),
    ("conf", "Config Files"),
    ("env", "Environment Files"),
    ("lock", "Lock Files"),
    // Executables and libraries
    ("exe", "Executables"),
    ("msi", "Installers"),
    ("apk", "Android Packages"),
    ("ipa", "iOS Packages"),
    ("dll", "Dynamic Libraries"),
    ("so", "Shared Libraries"),
    ("dylib", "Dynamic Libraries"),
    ("lib", "Static Libraries"),
    ("a", "Static Libraries"),
    ("o", "Object Files"),
    // Fonts
    ("ttf", "TrueType Fonts"),
    ("otf", "OpenType Fonts"),
    ("woff", "WOFF Fonts"),
    ("woff2", "WOFF2 Fonts"),
    // Databases and data
    ("db", "Database Files"),
    ("sqlite", "SQLite Databases"),
    ("mdb", "Access Databases"),
    ("accdb", "Access Databases"),
    ("parquet", "Parquet Data"),
    ("npy", "NumPy Arrays"),
    ("pkl", "Python Pickles"),
    ("onnx", "ONNX Models"),
    ("safetensors", "SafeTensors Models"),
    // Disk images
    ("iso", "Disc Images"),
    ("img", "Disk Images"),
    ("dmg", "Mac Disk Images"),
    ("vmdk", "VMware Disks"),
    ("vhd", "Virtual Hard Disks"),
    ("vhdx", "Virtual Hard Disks"),
    // Certificates and keys
    ("cer", "Certificates"),
    ("crt", "Certificates"),
    ("pem", "PEM Certificates"),
    ("key", "Key Files"),
    ("p12", "PKCS12 Certificates"),
    ("pfx", "PFX Certificates"),
    // Mail and calendars
    ("eml", "Emails"),
    ("msg", "Outlook Messages"),
    ("pst", "Outlook Data Files"),
    ("ics", "Calendar Files"),
    ("vcf", "vCard Files"),
    // CAD and 3D
    ("dwg", "AutoCAD Drawings"),
    ("dxf", "DXF Files"),
    ("step", "STEP Files"),
    ("stp", "STEP Files"),
    ("fbx", "FBX Models"),
    ("blend", "Blender Files"),
    ("skp", "SketchUp Files"),
    // Miscellaneous
    ("bak", "Backup Files"),
    ("tmp", "Temporary Files"),
    ("temp", "Temporary Files"),
    ("log", "Log Files"),
    ("dat", "Data Files"),
    ("bin", "Binary Files"),
    ("torrent", "Torrent Files"),
    ("m3u", "Playlists"),
    ("m3u8", "Playlists"),
    ("ds_store", "Desktop Services Store"),
];

/// Errors raised while parsing a serialized extension map.
#[derive(Debug, Error)]
pub enum ExtensionMapError {
    #[error("extension map is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("extension map must be a JSON object")]
    NotAnObject,
    #[error("category for extension '{0}' must be a string")]
    InvalidCategory(String),
}

/// Maps lowercase extensions (without the leading dot) to category names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMap {
    entries: HashMap<String, String>,
}

impl ExtensionMap {
    /// Creates an empty map. Every extension falls back to its uppercased form.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Builds a map from extension/category pairs, normalizing the keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (ext, category) in pairs {
            map.insert(ext.as_ref(), category);
        }
        map
    }

    /// Parses a map serialized as a JSON object of `"ext": "Category"` pairs.
    ///
    /// # Errors
    ///
    /// Fails if the text is not JSON, the root is not an object, or a value
    /// is not a string.
    pub fn from_json(text: &str) -> Result<Self, ExtensionMapError> {
        let value: Value = serde_json::from_str(text)?;
        let object = value.as_object().ok_or(ExtensionMapError::NotAnObject)?;

        let mut map = Self::new();
        for (ext, category) in object {
            let category = category
                .as_str()
                .ok_or_else(|| ExtensionMapError::InvalidCategory(ext.clone()))?;
            map.insert(ext, category);
        }
        Ok(map)
    }

    /// Serializes the map as a pretty-printed JSON object with sorted keys.
    pub fn to_json(&self) -> String {
        let sorted: std::collections::BTreeMap<_, _> = self.iter().collect();
        serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| "{}".to_string())
    }

    /// Inserts a mapping. The extension is lowercased and stripped of leading dots.
    pub fn insert(&mut self, extension: &str, category: impl Into<String>) {
        self.entries
            .insert(normalize_extension(extension), category.into());
    }

    /// Looks up the configured category for an extension, ignoring case.
    pub fn get(&self, extension: &str) -> Option<&str> {
        self.entries
            .get(&normalize_extension(extension))
            .map(String::as_str)
    }

    /// Returns the category for an extension, falling back to the uppercased
    /// extension when it is not in the map.
    pub fn category_for(&self, extension: &str) -> String {
        match self.get(extension) {
            Some(category) => category.to_string(),
            None => extension.to_uppercase(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(extension, category)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for ExtensionMap {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_EXTENSION_TABLE.iter().copied())
    }
}

/// Lowercases an extension and drops any leading dots.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

/// Returns the lowercased text after the last `.` in a file name, or an empty
/// string when the name contains no dot.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::get_extension;
///
/// assert_eq!(get_extension("archive.TAR.GZ"), "gz");
/// assert_eq!(get_extension("Makefile"), "");
/// ```
pub fn get_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Splits a file name into `(stem, extension)`, where the extension keeps its
/// leading dot. Dots at the very start of the name do not begin an extension,
/// so `.bashrc` has no extension.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    if let Some(dot) = file_name.rfind('.')
        && file_name[..dot].chars().any(|c| c != '.')
    {
        return file_name.split_at(dot);
    }
    (file_name, "")
}

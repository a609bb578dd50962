//! Application settings and saved presets.
//!
//! Two kinds of configuration live here:
//! - [`AppConfig`], TOML defaults for the command line (scan policy, mode,
//!   delimiter settings, preset directory).
//! - Preset stores in JSON: named extension profiles ([`ExtensionProfiles`])
//!   and named delimiter presets ([`DelimiterPresets`]).
//!
//! # Configuration File Format
//!
//! ```toml
//! [scan]
//! recursive = true
//! depth_limited = false
//! max_depth = 1
//!
//! [run]
//! delete_source = false
//! mode = "extension"
//!
//! [delimiter]
//! start_token = "_"
//! end_token = "_"
//! start_pos = 1
//! end_pos = 2
//!
//! [presets]
//! dir = "/home/me/.config/dirsort"
//! ```

use crate::classifier::DelimiterSpec;
use crate::file_category::{ExtensionMap, normalize_extension};
use crate::orchestrator::ClassificationMode;
use crate::scanner::ScanPolicy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the extension profile store.
pub const EXTENSION_PRESETS_FILE: &str = "extension_configs.json";
/// File name of the delimiter preset store.
pub const DELIMITER_PRESETS_FILE: &str = "delimiter_configs.json";
/// Profile used when none is named.
pub const DEFAULT_PROFILE: &str = "default";

/// Errors that can occur while loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML/JSON syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading or writing configuration.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Profile '{0}' does not exist")]
    ProfileNotFound(String),
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),
    #[error("Extension '{0}' does not exist")]
    MappingNotFound(String),
    #[error("Preset '{name}' is invalid: {reason}")]
    InvalidPreset { name: String, reason: String },
    #[error("Preset '{0}' already exists")]
    DuplicatePreset(String),
    #[error("Preset '{0}' not found")]
    PresetNotFound(String),
}

/// Command line defaults, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub delimiter: DelimiterSpec,
    #[serde(default)]
    pub presets: PresetSettings,
}

/// Scan switches as users see them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    #[serde(default)]
    pub depth_limited: bool,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_recursive() -> bool {
    true
}

fn default_max_depth() -> usize {
    1
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            recursive: default_recursive(),
            depth_limited: false,
            max_depth: default_max_depth(),
        }
    }
}

impl ScanSettings {
    pub fn policy(&self) -> ScanPolicy {
        ScanPolicy::from_flags(self.recursive, self.depth_limited, self.max_depth)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSettings {
    #[serde(default)]
    pub delete_source: bool,
    #[serde(default)]
    pub mode: ClassificationMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetSettings {
    /// Directory holding the JSON preset stores.
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dirsortrc.toml` in the current directory
    /// 3. Look for `~/.config/dirsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".dirsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home_config) = home_config_dir().map(|dir| dir.join("config.toml"))
            && home_config.exists()
        {
            return Self::load_from_file(&home_config);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Directory of the preset stores: the configured one, else `~/.config/dirsort`,
    /// else `./config`.
    pub fn presets_dir(&self) -> PathBuf {
        self.presets
            .dir
            .clone()
            .or_else(home_config_dir)
            .unwrap_or_else(|| PathBuf::from("config"))
    }
}

fn home_config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("dirsort"))
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
}

fn write_json(dir: &Path, path: &Path, value: &Value) -> Result<(), ConfigError> {
    fs::create_dir_all(dir).map_err(|e| ConfigError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
    fs::write(path, text).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Named extension maps stored as one JSON object of profiles.
///
/// ```json
/// { "default": { "jpg": "Images", "pdf": "Documents" }, "work": { ... } }
/// ```
#[derive(Debug, Clone)]
pub struct ExtensionProfiles {
    dir: PathBuf,
    mappings: BTreeMap<String, String>,
    profiles: Vec<String>,
    current: String,
}

impl ExtensionProfiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            mappings: BTreeMap::new(),
            profiles: Vec::new(),
            current: DEFAULT_PROFILE.to_string(),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(EXTENSION_PRESETS_FILE)
    }

    /// Loads `profile` (or `default`) from disk, replacing the in-memory mappings.
    ///
    /// Keys are lowercased and stripped of leading dots. Entries whose
    /// category is not a string are skipped.
    pub fn load(&mut self, profile: Option<&str>) -> Result<(), ConfigError> {
        self.mappings.clear();
        let target = profile.unwrap_or(DEFAULT_PROFILE);

        let data = read_json(&self.file_path())?;
        let root = data.as_object().ok_or_else(|| {
            ConfigError::ConfigInvalid("root element must be an object".to_string())
        })?;
        self.profiles = root.keys().cloned().collect();

        let entries = root
            .get(target)
            .ok_or_else(|| ConfigError::ProfileNotFound(target.to_string()))?
            .as_object()
            .ok_or_else(|| {
                ConfigError::ConfigInvalid(format!("profile '{}' must be an object", target))
            })?;

        for (ext, category) in entries {
            if let Some(category) = category.as_str() {
                self.mappings
                    .insert(normalize_extension(ext), category.to_string());
            }
        }
        self.current = target.to_string();
        Ok(())
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    pub fn current_profile(&self) -> &str {
        &self.current
    }

    /// The loaded mappings as an [`ExtensionMap`] ready for a run.
    pub fn extension_map(&self) -> ExtensionMap {
        ExtensionMap::from_pairs(self.mappings.iter().map(|(k, v)| (k, v.clone())))
    }

    pub fn category(&self, extension: &str) -> Option<&str> {
        self.mappings
            .get(&normalize_extension(extension))
            .map(String::as_str)
    }

    /// Sorted list of configured extensions.
    pub fn extensions(&self) -> Vec<&str> {
        self.mappings.keys().map(String::as_str).collect()
    }

    /// Adds or replaces a mapping after validating it.
    ///
    /// Extensions may only contain letters, digits and `_`.
    pub fn add_mapping(&mut self, extension: &str, category: &str) -> Result<(), ConfigError> {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(ConfigError::InvalidMapping(
                "extension must not be empty".to_string(),
            ));
        }
        if category.is_empty() {
            return Err(ConfigError::InvalidMapping(
                "category must not be empty".to_string(),
            ));
        }
        if !extension.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ConfigError::InvalidMapping(format!(
                "extension '{}' may only contain letters, digits and underscores",
                extension
            )));
        }
        self.mappings
            .insert(extension.to_lowercase(), category.to_string());
        Ok(())
    }

    pub fn update_mapping(&mut self, extension: &str, category: &str) -> Result<(), ConfigError> {
        let key = normalize_extension(extension);
        if !self.mappings.contains_key(&key) {
            return Err(ConfigError::MappingNotFound(extension.to_string()));
        }
        if category.is_empty() {
            return Err(ConfigError::InvalidMapping(
                "category must not be empty".to_string(),
            ));
        }
        self.mappings.insert(key, category.to_string());
        Ok(())
    }

    pub fn delete_mapping(&mut self, extension: &str) -> Result<(), ConfigError> {
        self.mappings
            .remove(&normalize_extension(extension))
            .map(|_| ())
            .ok_or_else(|| ConfigError::MappingNotFound(extension.to_string()))
    }

    /// Case-insensitive search over extensions and categories.
    pub fn search(&self, keyword: &str) -> Vec<(&str, &str)> {
        let keyword = keyword.to_lowercase();
        self.mappings
            .iter()
            .filter(|(ext, cat)| ext.contains(&keyword) || cat.to_lowercase().contains(&keyword))
            .map(|(ext, cat)| (ext.as_str(), cat.as_str()))
            .collect()
    }

    /// Merges a JSON object of mappings, skipping unusable entries.
    ///
    /// Returns how many mappings were imported.
    pub fn import_json(&mut self, text: &str) -> Result<usize, ConfigError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        let object = value.as_object().ok_or_else(|| {
            ConfigError::ConfigInvalid("imported data must be an object".to_string())
        })?;

        let mut imported = 0;
        for (ext, category) in object {
            let key = normalize_extension(ext);
            if let Some(category) = category.as_str()
                && !key.is_empty()
                && !category.is_empty()
            {
                self.mappings.insert(key, category.to_string());
                imported += 1;
            }
        }
        Ok(imported)
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
    }

    /// Writes the current profile back, keeping the other profiles in the file.
    pub fn save(&mut self) -> Result<(), ConfigError> {
        let path = self.file_path();
        let mut root = match read_json(&path) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let profile: Map<String, Value> = self
            .mappings
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        root.insert(self.current.clone(), Value::Object(profile));
        self.profiles = root.keys().cloned().collect();

        write_json(&self.dir, &path, &Value::Object(root))
    }

    /// Selects the profile that `save` writes to.
    pub fn set_profile(&mut self, profile: &str) {
        self.current = profile.to_string();
    }
}

fn default_token() -> String {
    "_".to_string()
}

fn default_start_pos() -> i32 {
    1
}

fn default_end_pos() -> i32 {
    2
}

/// A saved delimiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterPreset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_token")]
    pub delimiter_start: String,
    #[serde(default = "default_token")]
    pub delimiter_end: String,
    #[serde(default = "default_start_pos")]
    pub start_pos: i32,
    #[serde(default = "default_end_pos")]
    pub end_pos: i32,
    /// A sample file name shown next to the preset.
    #[serde(default)]
    pub preview_example: String,
}

impl DelimiterPreset {
    pub fn spec(&self) -> DelimiterSpec {
        DelimiterSpec::new(
            self.delimiter_start.clone(),
            self.delimiter_end.clone(),
            self.start_pos,
            self.end_pos,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::InvalidPreset {
                name: String::new(),
                reason: "name must not be empty".to_string(),
            });
        }
        self.spec()
            .validate()
            .map_err(|e| ConfigError::InvalidPreset {
                name: self.name.clone(),
                reason: e.to_string(),
            })
    }
}

/// Named delimiter presets stored as a JSON array.
#[derive(Debug, Clone)]
pub struct DelimiterPresets {
    dir: PathBuf,
    presets: Vec<DelimiterPreset>,
}

impl DelimiterPresets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            presets: Vec::new(),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(DELIMITER_PRESETS_FILE)
    }

    /// Loads every preset. A single invalid entry fails the whole load.
    pub fn load(&mut self) -> Result<(), ConfigError> {
        self.presets.clear();

        let data = read_json(&self.file_path())?;
        let items = data.as_array().ok_or_else(|| {
            ConfigError::ConfigInvalid("root element must be an array".to_string())
        })?;

        let mut presets = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if !item.is_object() {
                return Err(ConfigError::ConfigInvalid(format!(
                    "preset {} must be an object",
                    index + 1
                )));
            }
            let preset: DelimiterPreset = serde_json::from_value(item.clone()).map_err(|e| {
                ConfigError::InvalidPreset {
                    name: (index + 1).to_string(),
                    reason: e.to_string(),
                }
            })?;
            preset.validate().map_err(|e| match e {
                ConfigError::InvalidPreset { name, reason } if name.is_empty() => {
                    ConfigError::InvalidPreset {
                        name: (index + 1).to_string(),
                        reason,
                    }
                }
                other => other,
            })?;
            presets.push(preset);
        }

        self.presets = presets;
        Ok(())
    }

    pub fn presets(&self) -> &[DelimiterPreset] {
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&DelimiterPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    /// Validates, appends and saves a new preset.
    pub fn add(&mut self, preset: DelimiterPreset) -> Result<(), ConfigError> {
        preset.validate()?;
        if self.get(&preset.name).is_some() {
            return Err(ConfigError::DuplicatePreset(preset.name));
        }
        self.presets.push(preset);
        self.save()
    }

    /// Replaces the preset called `old_name` and saves.
    pub fn update(&mut self, old_name: &str, preset: DelimiterPreset) -> Result<(), ConfigError> {
        preset.validate()?;
        let index = self
            .presets
            .iter()
            .position(|p| p.name == old_name)
            .ok_or_else(|| ConfigError::PresetNotFound(old_name.to_string()))?;
        if old_name != preset.name && self.get(&preset.name).is_some() {
            return Err(ConfigError::DuplicatePreset(preset.name));
        }
        self.presets[index] = preset;
        self.save()
    }

    pub fn delete(&mut self, name: &str) -> Result<(), ConfigError> {
        let index = self
            .presets
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?;
        self.presets.remove(index);
        self.save()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let value = serde_json::to_value(&self.presets)
            .map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        write_json(&self.dir, &self.file_path(), &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn preset(name: &str, start_pos: i32, end_pos: i32) -> DelimiterPreset {
        DelimiterPreset {
            name: name.to_string(),
            description: String::new(),
            delimiter_start: "_".to_string(),
            delimiter_end: "_".to_string(),
            start_pos,
            end_pos,
            preview_example: "img_2024_01.png".to_string(),
        }
    }

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert!(config.scan.recursive);
        assert_eq!(config.scan.policy(), ScanPolicy::Recursive);
        assert_eq!(config.run.mode, ClassificationMode::Extension);
        assert_eq!(config.delimiter, DelimiterSpec::default());
    }

    #[test]
    fn test_load_app_config_from_toml() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[scan]
depth_limited = true
max_depth = 3

[run]
mode = "delimiter"
delete_source = true

[delimiter]
start_token = "-"
end_pos = -1
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).expect("Failed to load config");
        assert_eq!(config.scan.policy(), ScanPolicy::Bounded(3));
        assert_eq!(config.run.mode, ClassificationMode::Delimiter);
        assert!(config.run.delete_source);
        assert_eq!(config.delimiter, DelimiterSpec::new("-", "_", 1, -1));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let result = AppConfig::load(Some(Path::new("/non/existent/dirsort.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[scan\nrecursive = ").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(ConfigError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_extension_profiles_load_and_normalize() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(
            temp_dir.path().join(EXTENSION_PRESETS_FILE),
            r#"{"default": {".JPG": "Images", "pdf": "Docs", "bad": 1}, "work": {"xlsx": "Sheets"}}"#,
        )
        .unwrap();

        let mut profiles = ExtensionProfiles::new(temp_dir.path());
        profiles.load(None).expect("Failed to load profiles");

        assert_eq!(profiles.category("jpg"), Some("Images"));
        assert_eq!(profiles.category("bad"), None);
        assert_eq!(profiles.extensions(), vec!["jpg", "pdf"]);
        assert_eq!(profiles.profiles(), ["default".to_string(), "work".to_string()]);

        profiles.load(Some("work")).unwrap();
        assert_eq!(profiles.current_profile(), "work");
        assert_eq!(profiles.extension_map().get("XLSX"), Some("Sheets"));

        assert!(matches!(
            profiles.load(Some("missing")),
            Err(ConfigError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_extension_profiles_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut profiles = ExtensionProfiles::new(temp_dir.path());
        assert!(matches!(
            profiles.load(None),
            Err(ConfigError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn test_mapping_crud_and_save() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("presets");
        let mut profiles = ExtensionProfiles::new(&dir);

        profiles.add_mapping(".RAW", "Camera").unwrap();
        profiles.add_mapping("heic", "Camera").unwrap();
        assert!(profiles.add_mapping("tar.gz", "Archives").is_err());
        assert!(profiles.add_mapping("", "Empty").is_err());
        assert!(profiles.add_mapping("x", "").is_err());

        profiles.update_mapping("RAW", "Raw Photos").unwrap();
        assert!(matches!(
            profiles.update_mapping("nope", "x"),
            Err(ConfigError::MappingNotFound(_))
        ));
        profiles.delete_mapping("heic").unwrap();
        assert!(profiles.delete_mapping("heic").is_err());

        assert_eq!(profiles.search("photo"), vec![("raw", "Raw Photos")]);
        profiles.save().expect("Failed to save profiles");

        let mut reloaded = ExtensionProfiles::new(&dir);
        reloaded.load(None).unwrap();
        assert_eq!(reloaded.category("raw"), Some("Raw Photos"));
    }

    #[test]
    fn test_save_keeps_other_profiles() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(
            temp_dir.path().join(EXTENSION_PRESETS_FILE),
            r#"{"default": {"txt": "Text"}, "work": {"xlsx": "Sheets"}}"#,
        )
        .unwrap();

        let mut profiles = ExtensionProfiles::new(temp_dir.path());
        profiles.load(Some("work")).unwrap();
        profiles.add_mapping("csv", "Sheets").unwrap();
        profiles.save().unwrap();

        let mut other = ExtensionProfiles::new(temp_dir.path());
        other.load(None).unwrap();
        assert_eq!(other.category("txt"), Some("Text"));
        other.load(Some("work")).unwrap();
        assert_eq!(other.category("csv"), Some("Sheets"));
    }

    #[test]
    fn test_import_json_skips_invalid_entries() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut profiles = ExtensionProfiles::new(temp_dir.path());
        let imported = profiles
            .import_json(r#"{"mp3": "Music", "wav": 5, "": "Nothing", "ogg": ""}"#)
            .unwrap();
        assert_eq!(imported, 1);
        assert!(profiles.import_json("[1, 2]").is_err());
    }

    #[test]
    fn test_delimiter_presets_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut presets = DelimiterPresets::new(temp_dir.path());

        presets.add(preset("dates", 1, 2)).unwrap();
        presets.add(preset("prefix", -1, 1)).unwrap();
        assert!(matches!(
            presets.add(preset("dates", 1, 3)),
            Err(ConfigError::DuplicatePreset(_))
        ));
        assert!(presets.add(preset("broken", -1, -1)).is_err());
        assert!(presets.add(preset("", 1, 2)).is_err());

        presets.update("prefix", preset("head", -1, 1)).unwrap();
        assert!(matches!(
            presets.update("prefix", preset("again", 1, 2)),
            Err(ConfigError::PresetNotFound(_))
        ));

        let mut reloaded = DelimiterPresets::new(temp_dir.path());
        reloaded.load().unwrap();
        assert_eq!(reloaded.names(), vec!["dates", "head"]);
        assert_eq!(
            reloaded.get("head").map(|p| p.spec()),
            Some(DelimiterSpec::new("_", "_", -1, 1))
        );

        reloaded.delete("dates").unwrap();
        assert_eq!(reloaded.names(), vec!["head"]);
    }

    #[test]
    fn test_delimiter_presets_defaults_and_validation() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DELIMITER_PRESETS_FILE);

        fs::write(&path, r#"[{"name": "minimal"}]"#).unwrap();
        let mut presets = DelimiterPresets::new(temp_dir.path());
        presets.load().unwrap();
        assert_eq!(
            presets.get("minimal").map(|p| p.spec()),
            Some(DelimiterSpec::default())
        );

        fs::write(&path, r#"[{"name": "ok"}, {"name": "zero", "start_pos": 0}]"#).unwrap();
        assert!(matches!(
            presets.load(),
            Err(ConfigError::InvalidPreset { name, .. }) if name == "zero"
        ));
        assert!(presets.presets().is_empty());

        fs::write(&path, r#"{"name": "not a list"}"#).unwrap();
        assert!(matches!(presets.load(), Err(ConfigError::ConfigInvalid(_))));
    }
}

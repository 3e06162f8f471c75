//! Tool configuration.
//!
//! Settings live in a JSON file under the platform config directory
//! (`<config_dir>/jamlist/config.json`). Every field has a default, so a missing
//! file simply yields [`JamConfig::default`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, FileSystemError, Result};

/// Default audio extensions picked up by scans and listings.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".mp3"];

/// Largest embedded cover the player displays without stuttering.
pub const DEFAULT_MAX_ARTWORK_SIZE: u32 = 450;

/// JPEG quality used when re-encoding oversized covers.
pub const DEFAULT_JPEG_QUALITY: u8 = 50;

/// DPI written into re-encoded covers.
pub const DEFAULT_ARTWORK_DPI: u16 = 72;

/// Settings for embedded cover normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtworkSettings {
    /// Maximum cover width in pixels.
    #[serde(default = "default_max_artwork_size")]
    pub max_width: u32,
    /// Maximum cover height in pixels.
    #[serde(default = "default_max_artwork_size")]
    pub max_height: u32,
    /// JPEG quality (1-100) for re-encoded covers.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// DPI metadata for re-encoded covers.
    #[serde(default = "default_artwork_dpi")]
    pub dpi: u16,
}

const fn default_max_artwork_size() -> u32 {
    DEFAULT_MAX_ARTWORK_SIZE
}

const fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

const fn default_artwork_dpi() -> u16 {
    DEFAULT_ARTWORK_DPI
}

impl Default for ArtworkSettings {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_ARTWORK_SIZE,
            max_height: DEFAULT_MAX_ARTWORK_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            dpi: DEFAULT_ARTWORK_DPI,
        }
    }
}

/// Tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JamConfig {
    /// Jam root used when `--jam-root` is not given.
    #[serde(default)]
    pub jam_root: Option<PathBuf>,
    /// File name suffixes treated as audio (matched case-insensitively).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Default for `migrate --hash`.
    #[serde(default)]
    pub use_hash: bool,
    /// Default for `migrate --create-dir`.
    #[serde(default)]
    pub create_dir: bool,
    /// Directory for JSON log files. No file logging when unset.
    #[serde(default)]
    pub log_directory: Option<PathBuf>,
    /// Cover normalization settings.
    #[serde(default)]
    pub artwork: ArtworkSettings,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

impl Default for JamConfig {
    fn default() -> Self {
        Self {
            jam_root: None,
            extensions: default_extensions(),
            use_hash: false,
            create_dir: false,
            log_directory: None,
            artwork: ArtworkSettings::default(),
        }
    }
}

impl JamConfig {
    /// Load the configuration from the default location, or defaults if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();
        if !config_path.exists() {
            debug!(
                "Config file {} not found, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load the configuration from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not valid JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::FileSystem(FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to read config file: {e}"),
            })
        })?;

        let mut config: Self = serde_json::from_str(&content)?;
        config.normalize_extensions();

        info!("Loaded config from {}", path.display());
        debug!("Audio extensions: {:?}", config.extensions);
        Ok(config)
    }

    /// Get the path to the default config file.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        config_file_path()
    }

    /// Extensions are compared as lower-case suffixes with a leading dot.
    fn normalize_extensions(&mut self) {
        let normalized: Vec<String> = self
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .map(|e| format!(".{e}"))
            .collect();
        self.extensions = if normalized.is_empty() {
            default_extensions()
        } else {
            normalized
        };
    }
}

fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jamlist")
        .join("config.json")
}

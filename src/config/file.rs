//! TOML configuration file loading
//!
//! Supports `~/.config/linguovoice/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Gemini API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Gemini endpoint and model selection
    #[serde(default)]
    pub gemini: GeminiFileConfig,

    /// Session defaults (languages, voice)
    #[serde(default)]
    pub defaults: DefaultsFileConfig,
}

/// Gemini endpoint and models
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeminiFileConfig {
    /// API base URL (e.g. "https://generativelanguage.googleapis.com")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Text model used for translation (e.g. "gemini-3-flash-preview")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_model: Option<String>,

    /// Speech model (e.g. "gemini-2.5-flash-preview-tts")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_model: Option<String>,
}

/// Initial session state
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DefaultsFileConfig {
    /// Source language code (e.g. "en")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_lang: Option<String>,

    /// Target language code (e.g. "es")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lang: Option<String>,

    /// Voice name (e.g. "Kore")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    config_file_path().map_or_else(ConfigFile::default, |path| load_config_file_from(&path))
}

/// Load a TOML config file from `path`
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file_from(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    match read_config_file(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            ConfigFile::default()
        }
    }
}

/// Read and parse a TOML config file
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read or `Error::Toml` if it is
/// not valid
pub fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Return the config file path: `~/.config/linguovoice/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("linguovoice").join("config.toml"))
}

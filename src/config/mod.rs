//! Configuration management for LinguoVoice
//!
//! Values are layered env > TOML file > default.

pub mod file;

use secrecy::SecretString;

use crate::catalog::{self, VoiceName};
use crate::gemini::{DEFAULT_BASE_URL, GeminiClient};
use crate::translation::{DEFAULT_TRANSLATION_MODEL, TranslationClient};
use crate::voice::SpeechClient;
use crate::voice::tts::DEFAULT_TTS_MODEL;
use crate::{Error, Result};

use self::file::ConfigFile;

/// Environment variables consulted for the API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// LinguoVoice configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key
    pub api_key: SecretString,

    /// Gemini endpoint and models
    pub gemini: GeminiSettings,

    /// Initial session state
    pub defaults: SessionDefaults,
}

/// Gemini endpoint and models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    /// API base URL
    pub base_url: String,

    /// Text model for translation
    pub translation_model: String,

    /// Speech synthesis model
    pub tts_model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            translation_model: DEFAULT_TRANSLATION_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
        }
    }
}

/// Languages and voice a new session starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    /// Source language code
    pub source_lang: String,

    /// Target language code
    pub target_lang: String,

    /// Voice used for speech
    pub voice: VoiceName,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "es".to_string(),
            voice: VoiceName::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment and config file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no API key is configured or a setting is invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an env lookup
    ///
    /// Empty env values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no API key is configured or a setting is invalid
    pub fn resolve<F>(fc: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        // API key (env > toml)
        let api_key = API_KEY_ENV_VARS
            .iter()
            .find_map(|&key| env(key))
            .or(fc.api_key.filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                Error::Config(
                    "Gemini API key not set; export GEMINI_API_KEY or run `linguovoice setup`"
                        .to_string(),
                )
            })?;

        // Gemini endpoint and models (env > toml > default)
        let default_gemini = GeminiSettings::default();
        let base_url = env("LINGUOVOICE_API_BASE_URL")
            .or(fc.gemini.base_url)
            .unwrap_or(default_gemini.base_url);
        validate_base_url(&base_url)?;

        let gemini = GeminiSettings {
            base_url,
            translation_model: env("LINGUOVOICE_TRANSLATION_MODEL")
                .or(fc.gemini.translation_model)
                .unwrap_or(default_gemini.translation_model),
            tts_model: env("LINGUOVOICE_TTS_MODEL")
                .or(fc.gemini.tts_model)
                .unwrap_or(default_gemini.tts_model),
        };

        // Session defaults (env > toml > default)
        let default_session = SessionDefaults::default();
        let source_lang = env("LINGUOVOICE_SOURCE_LANG")
            .or(fc.defaults.source_lang)
            .unwrap_or(default_session.source_lang);
        let target_lang = env("LINGUOVOICE_TARGET_LANG")
            .or(fc.defaults.target_lang)
            .unwrap_or(default_session.target_lang);
        let voice = env("LINGUOVOICE_VOICE")
            .or(fc.defaults.voice)
            .map(|v| v.parse::<VoiceName>())
            .transpose()?
            .unwrap_or(default_session.voice);

        let defaults = SessionDefaults {
            source_lang: catalog::require_language(&source_lang)?.code.to_string(),
            target_lang: catalog::require_language(&target_lang)?.code.to_string(),
            voice,
        };

        tracing::debug!(
            base_url = %gemini.base_url,
            translation_model = %gemini.translation_model,
            tts_model = %gemini.tts_model,
            source = %defaults.source_lang,
            target = %defaults.target_lang,
            voice = %defaults.voice,
            "resolved configuration"
        );

        Ok(Self {
            api_key: SecretString::from(api_key),
            gemini,
            defaults,
        })
    }

    /// Configuration with default endpoint, models, and session settings
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            gemini: GeminiSettings::default(),
            defaults: SessionDefaults::default(),
        }
    }

    /// Gemini transport for this configuration
    #[must_use]
    pub fn gemini_client(&self) -> GeminiClient {
        GeminiClient::new(self.gemini.base_url.clone(), self.api_key.clone())
    }

    /// Translation client for this configuration
    #[must_use]
    pub fn translation_client(&self) -> TranslationClient {
        TranslationClient::with_model(self.gemini_client(), self.gemini.translation_model.clone())
    }

    /// Speech client for this configuration
    #[must_use]
    pub fn speech_client(&self) -> SpeechClient {
        SpeechClient::with_model(self.gemini_client(), self.gemini.tts_model.clone())
    }
}

/// Reject base URLs that are not absolute http(s) URLs
fn validate_base_url(base_url: &str) -> Result<()> {
    let url = url::Url::parse(base_url)
        .map_err(|e| Error::Config(format!("invalid API base URL '{base_url}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::Config(format!(
            "API base URL must be http or https, got '{scheme}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;
    use crate::config::file::{DefaultsFileConfig, GeminiFileConfig};

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let err = Config::resolve(ConfigFile::default(), env_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("GEMINI_API_KEY")));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let fc = ConfigFile {
            api_key: Some("  ".to_string()),
            ..ConfigFile::default()
        };
        let result = Config::resolve(fc, env_from(&[("GEMINI_API_KEY", "")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn defaults_apply_when_only_key_set() {
        let config = Config::resolve(ConfigFile::default(), env_from(&[("API_KEY", "k")])).unwrap();

        assert_eq!(config.api_key.expose_secret(), "k");
        assert_eq!(config.gemini, GeminiSettings::default());
        assert_eq!(config.defaults, SessionDefaults::default());
    }

    #[test]
    fn env_overrides_file() {
        let fc = ConfigFile {
            api_key: Some("from-file".to_string()),
            gemini: GeminiFileConfig {
                base_url: Some("http://file.example".to_string()),
                translation_model: Some("file-model".to_string()),
                tts_model: None,
            },
            defaults: DefaultsFileConfig {
                source_lang: Some("de".to_string()),
                target_lang: Some("fr".to_string()),
                voice: Some("puck".to_string()),
            },
        };

        let config = Config::resolve(
            fc,
            env_from(&[
                ("GEMINI_API_KEY", "from-env"),
                ("LINGUOVOICE_TRANSLATION_MODEL", "env-model"),
                ("LINGUOVOICE_TARGET_LANG", "JA"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key.expose_secret(), "from-env");
        assert_eq!(config.gemini.base_url, "http://file.example");
        assert_eq!(config.gemini.translation_model, "env-model");
        assert_eq!(config.gemini.tts_model, DEFAULT_TTS_MODEL);
        assert_eq!(config.defaults.source_lang, "de");
        assert_eq!(config.defaults.target_lang, "ja");
        assert_eq!(config.defaults.voice, VoiceName::Puck);
    }

    #[test]
    fn gemini_key_takes_precedence_over_generic_key() {
        let config = Config::resolve(
            ConfigFile::default(),
            env_from(&[("GEMINI_API_KEY", "specific"), ("API_KEY", "generic")]),
        )
        .unwrap();
        assert_eq!(config.api_key.expose_secret(), "specific");
    }

    #[test]
    fn rejects_invalid_settings() {
        let env = [("GEMINI_API_KEY", "k"), ("LINGUOVOICE_VOICE", "alloy")];
        assert!(matches!(
            Config::resolve(ConfigFile::default(), env_from(&env)),
            Err(Error::Config(_))
        ));

        let env = [("GEMINI_API_KEY", "k"), ("LINGUOVOICE_SOURCE_LANG", "xx")];
        assert!(matches!(
            Config::resolve(ConfigFile::default(), env_from(&env)),
            Err(Error::Config(_))
        ));

        let env = [("GEMINI_API_KEY", "k"), ("LINGUOVOICE_API_BASE_URL", "ftp://nope")];
        assert!(matches!(
            Config::resolve(ConfigFile::default(), env_from(&env)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn debug_output_hides_key() {
        let config = Config::with_api_key("super-secret-value");
        assert!(!format!("{config:?}").contains("super-secret-value"));
    }
}

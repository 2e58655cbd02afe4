//! Interactive first-run setup wizard (`linguovoice setup`)

use std::path::{Path, PathBuf};

use dialoguer::{Input, Select};

use crate::catalog::{LANGUAGES, VOICES, VoiceName};
use crate::config::file::{ConfigFile, DefaultsFileConfig, GeminiFileConfig};

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("LinguoVoice Setup\n");

    // Load existing config if present
    let existing = crate::config::file::load_config_file();
    let config_path = crate::config::file::config_file_path()
        .unwrap_or_else(|| PathBuf::from("~/.config/linguovoice/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. API key
    let existing_key = existing.api_key.as_deref();
    let prompt = existing_key.map_or_else(
        || "Gemini API key (GEMINI_API_KEY)".to_string(),
        |k| format!("Gemini API key (current: {}, leave blank to keep)", mask_key(k)),
    );

    let api_key_input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    let api_key = if api_key_input.trim().is_empty() {
        existing_key.map(str::to_string)
    } else {
        Some(api_key_input.trim().to_string())
    };

    if api_key.is_none() {
        println!("No key stored; set GEMINI_API_KEY before translating.");
    }

    // 2. Default languages
    let language_labels: Vec<String> = LANGUAGES
        .iter()
        .map(|l| format!("{} {} ({})", l.flag, l.name, l.code))
        .collect();

    let source_idx = Select::new()
        .with_prompt("Default source language")
        .items(&language_labels)
        .default(language_index(existing.defaults.source_lang.as_deref(), "en"))
        .interact()?;

    let target_idx = Select::new()
        .with_prompt("Default target language")
        .items(&language_labels)
        .default(language_index(existing.defaults.target_lang.as_deref(), "es"))
        .interact()?;

    // 3. Voice
    let voice_labels: Vec<String> = VOICES
        .iter()
        .map(|v| format!("{:<8}{}", v.label, v.description))
        .collect();

    let default_voice = existing
        .defaults
        .voice
        .as_deref()
        .and_then(|v| v.parse::<VoiceName>().ok())
        .unwrap_or_default();

    let voice_idx = Select::new()
        .with_prompt("Voice")
        .items(&voice_labels)
        .default(VOICES.iter().position(|v| v.id == default_voice).unwrap_or(0))
        .interact()?;

    // 4. Build and write config
    let config_file = ConfigFile {
        api_key,
        gemini: GeminiFileConfig {
            base_url: existing.gemini.base_url,
            translation_model: existing.gemini.translation_model,
            tts_model: existing.gemini.tts_model,
        },
        defaults: DefaultsFileConfig {
            source_lang: Some(LANGUAGES[source_idx].code.to_string()),
            target_lang: Some(LANGUAGES[target_idx].code.to_string()),
            voice: Some(VOICES[voice_idx].id.to_string()),
        },
    };

    write_config(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());
    println!("\nSetup complete! Run `linguovoice` to start translating.");

    Ok(())
}

/// Show only the ends of a key
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

/// Index of `code` (or `fallback`) in the language catalog
fn language_index(code: Option<&str>, fallback: &str) -> usize {
    let code = code.unwrap_or(fallback);
    LANGUAGES
        .iter()
        .position(|l| l.code.eq_ignore_ascii_case(code))
        .unwrap_or(0)
}

/// Serialize and write the config file
fn write_config(path: &Path, config: &ConfigFile) -> anyhow::Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, toml::to_string_pretty(config)?)?;

    Ok(())
}

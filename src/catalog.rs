//! Static language and voice catalogs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Source language name used when a code is not in the catalog
pub const FALLBACK_SOURCE_NAME: &str = "English";

/// Target language name used when a code is not in the catalog
pub const FALLBACK_TARGET_NAME: &str = "Spanish";

/// A selectable language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Short identifier (e.g. "en")
    pub code: &'static str,
    /// Display name, also embedded in the translation prompt
    pub name: &'static str,
    /// Display glyph
    pub flag: &'static str,
}

/// All supported languages, in display order
pub const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English", flag: "🇺🇸" },
    Language { code: "es", name: "Spanish", flag: "🇪🇸" },
    Language { code: "fr", name: "French", flag: "🇫🇷" },
    Language { code: "de", name: "German", flag: "🇩🇪" },
    Language { code: "it", name: "Italian", flag: "🇮🇹" },
    Language { code: "pt", name: "Portuguese", flag: "🇵🇹" },
    Language { code: "ja", name: "Japanese", flag: "🇯🇵" },
    Language { code: "ko", name: "Korean", flag: "🇰🇷" },
    Language { code: "zh", name: "Chinese", flag: "🇨🇳" },
    Language { code: "ru", name: "Russian", flag: "🇷🇺" },
    Language { code: "ar", name: "Arabic", flag: "🇸🇦" },
    Language { code: "hi", name: "Hindi", flag: "🇮🇳" },
    Language { code: "tr", name: "Turkish", flag: "🇹🇷" },
    Language { code: "nl", name: "Dutch", flag: "🇳🇱" },
    Language { code: "vi", name: "Vietnamese", flag: "🇻🇳" },
    Language { code: "th", name: "Thai", flag: "🇹🇭" },
];

/// Find a language by code (case-insensitive)
#[must_use]
pub fn find_language(code: &str) -> Option<&'static Language> {
    let code = code.trim();
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Resolve a language code to its display name, or `fallback` if unknown
#[must_use]
pub fn language_name_or(code: &str, fallback: &'static str) -> &'static str {
    find_language(code).map_or(fallback, |l| l.name)
}

/// Validate a language code and return its canonical catalog entry
///
/// # Errors
///
/// Returns `Error::Config` if the code is not in the catalog
pub fn require_language(code: &str) -> Result<&'static Language> {
    find_language(code).ok_or_else(|| Error::Config(format!("unknown language code: {code}")))
}

/// Prebuilt voice persona offered by the speech service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceName {
    #[default]
    Kore,
    Puck,
    Charon,
    Fenrir,
    Zephyr,
}

impl VoiceName {
    /// All voices, in display order
    pub const ALL: [Self; 5] = [Self::Kore, Self::Puck, Self::Charon, Self::Fenrir, Self::Zephyr];

    /// Name sent to the speech service
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kore => "Kore",
            Self::Puck => "Puck",
            Self::Charon => "Charon",
            Self::Fenrir => "Fenrir",
            Self::Zephyr => "Zephyr",
        }
    }

    /// Catalog entry for this voice
    #[must_use]
    pub fn option(self) -> &'static VoiceOption {
        VOICES
            .iter()
            .find(|v| v.id == self)
            .unwrap_or(&VOICES[0])
    }
}

impl fmt::Display for VoiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown voice '{s}' (expected one of: Kore, Puck, Charon, Fenrir, Zephyr)"
                ))
            })
    }
}

/// A selectable voice with display metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceOption {
    pub id: VoiceName,
    pub label: &'static str,
    pub description: &'static str,
}

/// All voices with display metadata
pub const VOICES: &[VoiceOption] = &[
    VoiceOption { id: VoiceName::Kore, label: "Kore", description: "Bright and energetic" },
    VoiceOption { id: VoiceName::Puck, label: "Puck", description: "Warm and friendly" },
    VoiceOption { id: VoiceName::Charon, label: "Charon", description: "Deep and professional" },
    VoiceOption { id: VoiceName::Fenrir, label: "Fenrir", description: "Authoritative and calm" },
    VoiceOption { id: VoiceName::Zephyr, label: "Zephyr", description: "Gentle and soft" },
];

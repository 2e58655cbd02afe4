//! Error types for LinguoVoice

use thiserror::Error;

/// Result type alias for LinguoVoice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while translating or speaking
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing API key, invalid setting)
    #[error("configuration error: {0}")]
    Config(String),

    /// Translation request failed or returned unusable data
    #[error("translation error: {0}")]
    Translation(String),

    /// Speech synthesis request failed
    #[error("speech generation error: {0}")]
    SpeechGeneration(String),

    /// Speech synthesis succeeded but produced no audio payload
    #[error("audio generation error: {0}")]
    AudioGeneration(String),

    /// Audio payload could not be interpreted as PCM
    #[error("audio decode error: {0}")]
    AudioDecode(String),

    /// Audio output device error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Short message suitable for showing to a user
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration problem. Check your settings.",
            Self::Translation(_) => "Translation failed. Please try again.",
            Self::SpeechGeneration(_)
            | Self::AudioGeneration(_)
            | Self::AudioDecode(_)
            | Self::Audio(_) => "Speech generation failed.",
            Self::Io(_) | Self::Toml(_) => "Something went wrong. Please try again.",
        }
    }
}

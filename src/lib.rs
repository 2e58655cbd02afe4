//! LinguoVoice - terminal translator with spoken output
//!
//! This library provides the building blocks behind the `linguovoice` binary:
//! - Text translation through a Gemini text model
//! - Speech synthesis through a Gemini TTS model
//! - PCM decoding and single-slot audio playback
//! - A session model and interactive shell tying them together
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Shell / CLI                          │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               TranslatorSession                      │
//! │   Translator  │  SpeechController                    │
//! └───────┬───────────────┬─────────────────────────────┘
//!         │               │ SpeechClient → PCM → AudioContext
//! ┌───────▼───────────────▼─────────────────────────────┐
//! │            Gemini generateContent                    │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod gemini;
pub mod session;
pub mod setup;
pub mod shell;
pub mod translation;
pub mod voice;

pub use catalog::{LANGUAGES, Language, VOICES, VoiceName, VoiceOption};
pub use config::Config;
pub use error::{Error, Result};
pub use session::TranslatorSession;
pub use translation::{TranslationClient, TranslationRequest, TranslationResult, Translator};
pub use voice::{
    AudioBackend, AudioBuffer, CpalBackend, PlaybackState, SpeechClient, SpeechController,
    SpeechSynthesizer,
};

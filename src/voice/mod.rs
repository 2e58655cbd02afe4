//! Voice processing module
//!
//! Handles speech synthesis, PCM decoding, and playback.

mod controller;
pub mod pcm;
mod playback;
pub mod tts;

pub use controller::{PlaybackSlot, PlaybackState, SpeechController};
pub use pcm::{AudioBuffer, SPEECH_SAMPLE_RATE, samples_to_wav};
pub use playback::{
    AudioBackend, AudioContext, ContextState, CpalBackend, CpalContext, OnEnded, PlaybackHandle,
};
pub use tts::{SpeechAudio, SpeechClient, SpeechSynthesizer};

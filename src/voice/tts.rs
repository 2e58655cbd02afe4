//! Text-to-speech (TTS) via Gemini

use async_trait::async_trait;

use crate::catalog::VoiceName;
use crate::gemini::{GeminiClient, GenerateContentRequest, GenerationConfig, Modality, SpeechConfig};
use crate::{Error, Result};

/// Default model for speech synthesis
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Base64 audio payload returned by the speech service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    /// Base64-encoded raw PCM
    pub data: String,
    /// MIME type as reported by the service (e.g. `audio/L16;codec=pcm;rate=24000`)
    pub mime_type: Option<String>,
}

impl SpeechAudio {
    /// Payload without MIME metadata
    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: None,
        }
    }

    /// True when the payload carries no audio data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.trim().is_empty()
    }

    /// Sample rate announced by the `rate=` MIME parameter, if any
    #[must_use]
    pub fn sample_rate(&self) -> Option<u32> {
        self.mime_type
            .as_deref()?
            .split(';')
            .filter_map(|param| param.trim().split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("rate"))
            .and_then(|(_, value)| value.trim().parse().ok())
    }
}

/// Something that can render text as spoken audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice`
    ///
    /// Returns `Ok(None)` when the text is blank or the service produced no
    /// audio.
    ///
    /// # Errors
    ///
    /// Returns `Error::SpeechGeneration` if the service call fails
    async fn synthesize(&self, text: &str, voice: VoiceName) -> Result<Option<SpeechAudio>>;
}

/// Build the instruction prompt sent to the speech model
#[must_use]
pub fn speech_prompt(text: &str) -> String {
    format!("Say clearly in the appropriate language: {text}")
}

/// Synthesizes speech from text using a Gemini TTS model
#[derive(Debug, Clone)]
pub struct SpeechClient {
    gemini: GeminiClient,
    model: String,
}

impl SpeechClient {
    /// Create a TTS client using the default model
    #[must_use]
    pub fn new(gemini: GeminiClient) -> Self {
        Self::with_model(gemini, DEFAULT_TTS_MODEL.to_string())
    }

    /// Create a TTS client with a custom model
    #[must_use]
    pub const fn with_model(gemini: GeminiClient, model: String) -> Self {
        Self { gemini, model }
    }

    /// Model identifier in use
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the `generateContent` request for `text` and `voice`
    #[must_use]
    pub fn build_request(text: &str, voice: VoiceName) -> GenerateContentRequest {
        GenerateContentRequest::from_text(speech_prompt(text)).with_config(GenerationConfig {
            response_modalities: vec![Modality::Audio],
            speech_config: Some(SpeechConfig::prebuilt(voice.as_str())),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechClient {
    async fn synthesize(&self, text: &str, voice: VoiceName) -> Result<Option<SpeechAudio>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let request = Self::build_request(text, voice);

        let response = self
            .gemini
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| Error::SpeechGeneration(e.to_string()))?;

        // An empty payload means no audio was produced
        let audio = response
            .first_inline_data()
            .filter(|inline| !inline.data.trim().is_empty())
            .map(|inline| SpeechAudio {
                data: inline.data.clone(),
                mime_type: inline.mime_type.clone(),
            });

        match &audio {
            Some(a) => tracing::debug!(
                %voice,
                payload_len = a.data.len(),
                mime_type = a.mime_type.as_deref().unwrap_or_default(),
                "speech synthesized"
            ),
            None => tracing::warn!(%voice, "speech response carried no audio payload"),
        }

        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn parses_rate_from_mime_type() {
        let audio = SpeechAudio {
            data: String::new(),
            mime_type: Some("audio/L16;codec=pcm;rate=24000".to_string()),
        };
        assert_eq!(audio.sample_rate(), Some(24000));

        let audio = SpeechAudio {
            data: String::new(),
            mime_type: Some("audio/L16; RATE = 16000".to_string()),
        };
        assert_eq!(audio.sample_rate(), Some(16000));

        assert_eq!(SpeechAudio::new("").sample_rate(), None);
    }

    #[test]
    fn blank_payload_is_empty() {
        assert!(SpeechAudio::new("").is_empty());
        assert!(SpeechAudio::new(" \n").is_empty());
        assert!(!SpeechAudio::new("AEA=").is_empty());
    }

    #[test]
    fn request_asks_for_audio_with_voice() {
        let request = SpeechClient::build_request("Hola", VoiceName::Fenrir);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            "Say clearly in the appropriate language: Hola"
        );
        assert_eq!(json["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            json["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Fenrir"
        );
    }

    #[tokio::test]
    async fn blank_text_returns_none_without_network() {
        let gemini = GeminiClient::new("http://127.0.0.1:9", SecretString::from("test".to_string()));
        let client = SpeechClient::new(gemini);

        assert!(client.synthesize("   ", VoiceName::Kore).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transport_failure_is_speech_generation_error() {
        let gemini = GeminiClient::new("http://127.0.0.1:9", SecretString::from("test".to_string()));
        let client = SpeechClient::new(gemini);

        let err = client.synthesize("Hola", VoiceName::Kore).await.unwrap_err();
        assert!(matches!(err, Error::SpeechGeneration(_)));
    }
}

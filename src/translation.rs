//! Text translation via Gemini

use async_trait::async_trait;

use crate::gemini::{GeminiClient, GenerateContentRequest};
use crate::{Error, Result};

/// Default model for text translation
pub const DEFAULT_TRANSLATION_MODEL: &str = "gemini-3-flash-preview";

/// A single translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Display name of the source language (e.g. "English")
    pub source_language: String,
    /// Display name of the target language (e.g. "Spanish")
    pub target_language: String,
    pub text: String,
}

/// Outcome of a translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Something that can translate text between two named languages
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` (language display names)
    ///
    /// Blank input yields an empty string without contacting the service.
    /// The model's reply is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns `Error::Translation` if the service call fails or returns no text
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Translate a [`TranslationRequest`]
    ///
    /// # Errors
    ///
    /// Same as [`Translator::translate`]
    async fn translate_request(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let translated_text = self
            .translate(&request.text, &request.source_language, &request.target_language)
            .await?;

        Ok(TranslationResult {
            translated_text,
            source_language: request.source_language.clone(),
            target_language: request.target_language.clone(),
        })
    }
}

/// Build the instruction prompt sent to the text model
#[must_use]
pub fn translation_prompt(text: &str, source: &str, target: &str) -> String {
    format!(
        "Translate the following text from {source} to {target}. \
         Only provide the translated text, nothing else:\n\n{text}"
    )
}

/// Translation client backed by a Gemini text model
#[derive(Debug, Clone)]
pub struct TranslationClient {
    gemini: GeminiClient,
    model: String,
}

impl TranslationClient {
    /// Create a translation client using the default model
    #[must_use]
    pub fn new(gemini: GeminiClient) -> Self {
        Self::with_model(gemini, DEFAULT_TRANSLATION_MODEL.to_string())
    }

    /// Create a translation client with a custom model
    #[must_use]
    pub const fn with_model(gemini: GeminiClient, model: String) -> Self {
        Self { gemini, model }
    }

    /// Model identifier in use
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let request = GenerateContentRequest::from_text(translation_prompt(text, source, target));

        let response = self
            .gemini
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| Error::Translation(e.to_string()))?;

        let translated = response
            .text()
            .ok_or_else(|| Error::Translation("response contained no text".to_string()))?;

        tracing::debug!(
            source,
            target,
            input_chars = text.chars().count(),
            output_chars = translated.chars().count(),
            "translation complete"
        );

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn unreachable_client() -> TranslationClient {
        // Port 9 (discard) on localhost: any request would fail loudly
        let gemini = GeminiClient::new("http://127.0.0.1:9", SecretString::from("test".to_string()));
        TranslationClient::new(gemini)
    }

    #[test]
    fn prompt_names_languages_and_text() {
        let prompt = translation_prompt("Hello", "English", "Spanish");
        assert!(prompt.starts_with("Translate the following text from English to Spanish"));
        assert!(prompt.contains("Only provide the translated text"));
        assert!(prompt.ends_with("\n\nHello"));
    }

    #[tokio::test]
    async fn blank_input_skips_network() {
        let client = unreachable_client();
        assert_eq!(client.translate("", "English", "Spanish").await.unwrap(), "");
        assert_eq!(client.translate("  \n\t", "English", "Spanish").await.unwrap(), "");
    }

    #[tokio::test]
    async fn transport_failure_is_translation_error() {
        let client = unreachable_client();
        let err = client.translate("Hello", "English", "Spanish").await.unwrap_err();
        assert!(matches!(err, Error::Translation(_)));
    }

    #[test]
    fn uses_default_model() {
        assert_eq!(unreachable_client().model(), DEFAULT_TRANSLATION_MODEL);
    }
}

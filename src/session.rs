//! Interactive translation session state
//!
//! Holds what the user sees: selected languages, input and output text,
//! voice, and the last error message. Errors from the clients are caught
//! here, logged, and turned into a short message; the session is always
//! left ready for the next action.

use std::sync::Arc;

use crate::catalog::{self, FALLBACK_SOURCE_NAME, FALLBACK_TARGET_NAME, VoiceName};
use crate::config::SessionDefaults;
use crate::translation::Translator;
use crate::voice::SpeechController;
use crate::Result;

/// State of one translator session
pub struct TranslatorSession {
    translator: Arc<dyn Translator>,
    source_lang: String,
    target_lang: String,
    input_text: String,
    translated_text: String,
    voice: VoiceName,
    is_translating: bool,
    error: Option<String>,
}

impl TranslatorSession {
    /// Start a session with the given defaults
    #[must_use]
    pub fn new(translator: Arc<dyn Translator>, defaults: &SessionDefaults) -> Self {
        Self {
            translator,
            source_lang: defaults.source_lang.clone(),
            target_lang: defaults.target_lang.clone(),
            input_text: String::new(),
            translated_text: String::new(),
            voice: defaults.voice,
            is_translating: false,
            error: None,
        }
    }

    #[must_use]
    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    #[must_use]
    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    #[must_use]
    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    #[must_use]
    pub fn translated_text(&self) -> &str {
        &self.translated_text
    }

    #[must_use]
    pub const fn voice(&self) -> VoiceName {
        self.voice
    }

    /// True while a translation request is in flight
    #[must_use]
    pub const fn is_translating(&self) -> bool {
        self.is_translating
    }

    /// Message describing the last failed action, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the input text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    /// Select the source language by code
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the code is not in the catalog
    pub fn set_source_language(&mut self, code: &str) -> Result<()> {
        self.source_lang = catalog::require_language(code)?.code.to_string();
        Ok(())
    }

    /// Select the target language by code
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the code is not in the catalog
    pub fn set_target_language(&mut self, code: &str) -> Result<()> {
        self.target_lang = catalog::require_language(code)?.code.to_string();
        Ok(())
    }

    /// Select the voice used for speech
    pub const fn select_voice(&mut self, voice: VoiceName) {
        self.voice = voice;
    }

    /// Swap languages and move the translation into the input
    ///
    /// `(source, target, input, output)` becomes `(target, source, output, input)`.
    pub fn swap_languages(&mut self) {
        std::mem::swap(&mut self.source_lang, &mut self.target_lang);
        std::mem::swap(&mut self.input_text, &mut self.translated_text);
    }

    /// Translate the current input into the target language
    ///
    /// Blank input does nothing. On failure the previous translation is kept
    /// and [`error`](Self::error) holds a user-facing message.
    pub async fn translate(&mut self) {
        if self.input_text.trim().is_empty() {
            return;
        }

        let source = catalog::language_name_or(&self.source_lang, FALLBACK_SOURCE_NAME);
        let target = catalog::language_name_or(&self.target_lang, FALLBACK_TARGET_NAME);

        self.is_translating = true;
        self.error = None;

        match self.translator.translate(&self.input_text, source, target).await {
            Ok(text) => {
                tracing::info!(source, target, "translated");
                self.translated_text = text;
            }
            Err(e) => {
                tracing::error!(error = %e, source, target, "translation failed");
                self.error = Some(e.user_message().to_string());
            }
        }

        self.is_translating = false;
    }

    /// Speak the current translation with the selected voice
    ///
    /// On failure [`error`](Self::error) holds a user-facing message and the
    /// controller is back to idle.
    pub async fn speak_translation(&mut self, controller: &mut SpeechController) {
        if self.translated_text.trim().is_empty() {
            return;
        }

        self.error = None;

        if let Err(e) = controller.speak(&self.translated_text, self.voice).await {
            tracing::error!(error = %e, voice = %self.voice, "speech failed");
            self.error = Some(e.user_message().to_string());
        }
    }

    /// Forget the last error message
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::Error;

    #[derive(Default)]
    struct ScriptedTranslator {
        calls: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Translator for ScriptedTranslator {
        async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), source.to_string(), target.to_string()));
            if self.fail {
                Err(Error::Translation("boom".to_string()))
            } else {
                Ok(format!("[{target}] {text}"))
            }
        }
    }

    fn session_with(translator: Arc<ScriptedTranslator>) -> TranslatorSession {
        TranslatorSession::new(translator, &SessionDefaults::default())
    }

    #[test]
    fn swap_exchanges_languages_and_texts() {
        let mut session = session_with(Arc::new(ScriptedTranslator::default()));
        session.set_source_language("fr").unwrap();
        session.set_target_language("de").unwrap();
        session.set_input("Bonjour");
        session.translated_text = "Hallo".to_string();

        session.swap_languages();

        assert_eq!(session.source_lang(), "de");
        assert_eq!(session.target_lang(), "fr");
        assert_eq!(session.input_text(), "Hallo");
        assert_eq!(session.translated_text(), "Bonjour");
    }

    #[tokio::test]
    async fn translate_uses_display_names() {
        let translator = Arc::new(ScriptedTranslator::default());
        let mut session = session_with(Arc::clone(&translator));
        session.set_target_language("ja").unwrap();
        session.set_input("Good morning");

        session.translate().await;

        assert_eq!(session.translated_text(), "[Japanese] Good morning");
        assert!(session.error().is_none());
        assert!(!session.is_translating());

        let calls = translator.calls.lock().unwrap();
        assert_eq!(calls[0].1, "English");
        assert_eq!(calls[0].2, "Japanese");
    }

    #[tokio::test]
    async fn blank_input_makes_no_call() {
        let translator = Arc::new(ScriptedTranslator::default());
        let mut session = session_with(Arc::clone(&translator));
        session.set_input("   ");

        session.translate().await;

        assert!(translator.calls.lock().unwrap().is_empty());
        assert_eq!(session.translated_text(), "");
    }

    #[tokio::test]
    async fn failure_sets_message_and_keeps_previous_output() {
        let translator = Arc::new(ScriptedTranslator {
            fail: true,
            ..ScriptedTranslator::default()
        });
        let mut session = session_with(translator);
        session.translated_text = "earlier".to_string();
        session.set_input("Hello");

        session.translate().await;

        assert_eq!(session.error(), Some("Translation failed. Please try again."));
        assert_eq!(session.translated_text(), "earlier");
        assert!(!session.is_translating());

        session.clear_error();
        assert!(session.error().is_none());
    }

    #[test]
    fn rejects_unknown_language_codes() {
        let mut session = session_with(Arc::new(ScriptedTranslator::default()));
        assert!(session.set_source_language("zz").is_err());
        assert_eq!(session.source_lang(), "en");

        session.set_target_language("TH").unwrap();
        assert_eq!(session.target_lang(), "th");
    }
}

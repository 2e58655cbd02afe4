//! Speech playback controller
//!
//! Owns the lazily-opened audio context and the single current playback.
//! Starting new speech always stops the previous playback first, so at most
//! one playback is active at any time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::pcm::{self, AudioBuffer, SPEECH_SAMPLE_RATE};
use super::playback::{AudioBackend, AudioContext, ContextState, PlaybackHandle};
use super::tts::SpeechSynthesizer;
use crate::catalog::VoiceName;
use crate::{Error, Result};

/// Externally observable playback indicator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Speaking,
}

/// Holds at most one playback handle
#[derive(Default)]
pub struct PlaybackSlot {
    current: Option<Box<dyn PlaybackHandle>>,
}

impl PlaybackSlot {
    /// Stop and release the current handle; returns whether one was held
    pub fn stop(&mut self) -> bool {
        self.current.take().is_some_and(|mut handle| {
            handle.stop();
            true
        })
    }

    /// Install `handle`, stopping whatever was playing before
    pub fn replace(&mut self, handle: Box<dyn PlaybackHandle>) {
        self.stop();
        self.current = Some(handle);
    }

    /// True if the held handle is still playing
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|h| h.is_active())
    }

    /// True if a handle is held, finished or not
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.current.is_some()
    }
}

/// Turns text into audible speech
pub struct SpeechController {
    backend: Box<dyn AudioBackend>,
    context: Option<Box<dyn AudioContext>>,
    slot: PlaybackSlot,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    state: Arc<watch::Sender<PlaybackState>>,
    // Bumped on every start/stop; completion callbacks of older playbacks are ignored
    generation: Arc<AtomicU64>,
    sample_rate: u32,
}

impl SpeechController {
    /// Create a controller; no audio output is opened until first use
    #[must_use]
    pub fn new(backend: Box<dyn AudioBackend>, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        let (state, _) = watch::channel(PlaybackState::Idle);
        Self {
            backend,
            context: None,
            slot: PlaybackSlot::default(),
            synthesizer,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            sample_rate: SPEECH_SAMPLE_RATE,
        }
    }

    /// Current playback indicator
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// Watch playback indicator changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    /// True once the audio context has been opened
    #[must_use]
    pub const fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// True while a playback is running
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.slot.is_active()
    }

    /// Synthesize `text` with `voice` and play it
    ///
    /// Blank text is a no-op. Any previous playback is stopped first.
    ///
    /// # Errors
    ///
    /// - `Error::SpeechGeneration` if the speech service call fails
    /// - `Error::AudioGeneration` if the service returned no audio
    /// - `Error::AudioDecode` if the payload is not valid PCM16LE
    /// - `Error::Audio` if the output device cannot be opened or resumed
    pub async fn speak(&mut self, text: &str, voice: VoiceName) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        self.stop();

        let result = self.synthesize_and_start(text, voice).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, %voice, "speech playback aborted");
            self.set_state(PlaybackState::Idle);
        }
        result
    }

    /// Play an already-decoded buffer, replacing any current playback
    ///
    /// # Errors
    ///
    /// Returns `Error::Audio` if the output cannot be opened or started
    pub fn play_buffer(&mut self, buffer: AudioBuffer) -> Result<()> {
        self.stop();

        let result = self.ensure_context().and_then(|()| self.start(buffer));
        if result.is_err() {
            self.set_state(PlaybackState::Idle);
        }
        result
    }

    /// Stop the current playback, if any
    pub fn stop(&mut self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if self.slot.stop() {
            tracing::debug!("stopped previous playback");
        }
        self.set_state(PlaybackState::Idle);
    }

    /// Wait until the indicator returns to `Idle`
    pub async fn wait_until_idle(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting
        let _ = rx.wait_for(|s| *s == PlaybackState::Idle).await;
    }

    async fn synthesize_and_start(&mut self, text: &str, voice: VoiceName) -> Result<()> {
        self.ensure_context()?;

        let audio = self
            .synthesizer
            .synthesize(text, voice)
            .await?
            .filter(|audio| !audio.is_empty())
            .ok_or_else(|| Error::AudioGeneration("speech service returned no audio".to_string()))?;

        if let Some(rate) = audio.sample_rate().filter(|r| *r != self.sample_rate) {
            tracing::warn!(
                payload_rate = rate,
                output_rate = self.sample_rate,
                "speech payload sample rate differs from output; playback will be distorted"
            );
        }

        let buffer = pcm::decode_speech_payload(&audio.data, self.sample_rate)?;

        tracing::debug!(
            %voice,
            samples = buffer.samples.len(),
            duration_ms = buffer.duration().as_millis(),
            "decoded speech"
        );

        self.start(buffer)
    }

    /// Open the context on first use, or resume it if suspended
    fn ensure_context(&mut self) -> Result<()> {
        if let Some(ctx) = self.context.as_mut() {
            if ctx.state() == ContextState::Suspended {
                tracing::debug!("audio context suspended, resuming");
                ctx.resume()?;
            }
            return Ok(());
        }

        let ctx = self.backend.create_context(self.sample_rate)?;
        tracing::info!(sample_rate = ctx.sample_rate(), "audio context created");
        self.context = Some(ctx);
        Ok(())
    }

    fn start(&mut self, buffer: AudioBuffer) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let current = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);

        let on_ended = Box::new(move || {
            if end_playback(&state, &current, generation) {
                tracing::debug!("playback finished");
            }
        });

        let ctx = self
            .context
            .as_mut()
            .ok_or_else(|| Error::Audio("audio context not initialized".to_string()))?;

        // Set before starting so a very short buffer cannot finish first
        self.state.send_replace(PlaybackState::Speaking);
        let handle = ctx.start(buffer, on_ended)?;
        self.slot.replace(handle);

        Ok(())
    }

    fn set_state(&self, state: PlaybackState) {
        self.state.send_replace(state);
    }
}

/// Return to `Idle` if `generation` is still the current playback
///
/// The check runs under the channel lock. `start` bumps the generation before
/// it publishes `Speaking`, so a stale completion can never overwrite it.
fn end_playback(state: &watch::Sender<PlaybackState>, current: &AtomicU64, generation: u64) -> bool {
    state.send_if_modified(|s| {
        if current.load(Ordering::Acquire) != generation || *s == PlaybackState::Idle {
            return false;
        }
        *s = PlaybackState::Idle;
        true
    })
}

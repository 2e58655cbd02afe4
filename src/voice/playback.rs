//! Audio playback to speakers
//!
//! Playback goes through three small traits so the controller can be driven
//! without audio hardware:
//!
//! - [`AudioBackend`] opens an [`AudioContext`] at a fixed sample rate
//! - [`AudioContext`] starts buffers and can be suspended/resumed
//! - [`PlaybackHandle`] is a live, stoppable playback
//!
//! [`CpalBackend`] is the real implementation on the default output device.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, Stream, StreamConfig, SupportedStreamConfigRange};

use super::pcm::AudioBuffer;
use crate::{Error, Result};

/// Callback fired once when a playback reaches the end of its buffer
pub type OnEnded = Box<dyn FnOnce() + Send + 'static>;

/// Lifecycle state of an audio context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Running,
    /// Output is unavailable until [`AudioContext::resume`] succeeds
    Suspended,
}

/// A live playback instance
pub trait PlaybackHandle {
    /// Stop immediately; the `on_ended` callback will not fire afterwards
    fn stop(&mut self);

    /// True until the buffer has finished or the handle was stopped
    fn is_active(&self) -> bool;
}

/// An opened audio output at a fixed sample rate
pub trait AudioContext {
    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Current lifecycle state
    fn state(&self) -> ContextState;

    /// Bring a suspended context back to `Running`
    ///
    /// # Errors
    ///
    /// Returns error if the output cannot be reopened
    fn resume(&mut self) -> Result<()>;

    /// Start playing `buffer` immediately
    ///
    /// # Errors
    ///
    /// Returns error if an output stream cannot be created
    fn start(&mut self, buffer: AudioBuffer, on_ended: OnEnded) -> Result<Box<dyn PlaybackHandle>>;
}

/// Factory for audio contexts
pub trait AudioBackend {
    /// Open a context at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns error if no suitable output is available
    fn create_context(&self, sample_rate: u32) -> Result<Box<dyn AudioContext>>;
}

/// Default output device via cpal
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalBackend;

impl AudioBackend for CpalBackend {
    fn create_context(&self, sample_rate: u32) -> Result<Box<dyn AudioContext>> {
        Ok(Box::new(CpalContext::open(sample_rate)?))
    }
}

/// Plays audio to the default output device
pub struct CpalContext {
    device: Device,
    config: StreamConfig,
    sample_rate: u32,
    suspended: Arc<AtomicBool>,
}

impl CpalContext {
    /// Open the default output device at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns error if audio device cannot be opened
    pub fn open(sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let supported_config = find_output_config(&device, 1, sample_rate)
            .or_else(|| {
                // Fallback: try stereo
                find_output_config(&device, 2, sample_rate)
            })
            .ok_or_else(|| {
                Error::Audio(format!("no output config supports {sample_rate} Hz"))
            })?;

        let config = supported_config
            .with_sample_rate(SampleRate(sample_rate))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate,
            channels = config.channels,
            "audio playback initialized"
        );

        Ok(Self {
            device,
            config,
            sample_rate,
            suspended: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Find an f32 output config with `channels` that covers `sample_rate`
fn find_output_config(
    device: &Device,
    channels: u16,
    sample_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    device.supported_output_configs().ok()?.find(|c| {
        c.channels() == channels
            && c.sample_format() == SampleFormat::F32
            && c.min_sample_rate() <= SampleRate(sample_rate)
            && c.max_sample_rate() >= SampleRate(sample_rate)
    })
}

impl AudioContext for CpalContext {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> ContextState {
        if self.suspended.load(Ordering::Acquire) {
            ContextState::Suspended
        } else {
            ContextState::Running
        }
    }

    fn resume(&mut self) -> Result<()> {
        if self.state() == ContextState::Running {
            return Ok(());
        }

        tracing::info!(sample_rate = self.sample_rate, "resuming audio output");
        *self = Self::open(self.sample_rate)?;
        Ok(())
    }

    fn start(&mut self, buffer: AudioBuffer, on_ended: OnEnded) -> Result<Box<dyn PlaybackHandle>> {
        let out_channels = usize::from(self.config.channels);
        let src_channels = usize::from(buffer.channels.max(1));
        let frames = buffer.frames();

        let shared = Arc::new(SharedPlayback {
            position: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            on_ended: Mutex::new(Some(on_ended)),
        });

        let shared_cb = Arc::clone(&shared);
        let samples = buffer.samples;

        let suspended = Arc::clone(&self.suspended);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut pos = shared_cb.position.load(Ordering::Relaxed);

                    for frame in data.chunks_mut(out_channels) {
                        for (ch, out) in frame.iter_mut().enumerate() {
                            *out = if pos < frames {
                                samples[pos * src_channels + ch.min(src_channels - 1)]
                            } else {
                                0.0
                            };
                        }

                        if pos < frames {
                            pos += 1;
                        }
                    }

                    shared_cb.position.store(pos, Ordering::Relaxed);

                    if pos >= frames {
                        shared_cb.finish();
                    }
                },
                move |err| {
                    tracing::error!(error = %err, "audio playback error");
                    suspended.store(true, Ordering::Release);
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        tracing::debug!(frames, sample_rate = self.sample_rate, "playback started");

        Ok(Box::new(CpalPlayback {
            stream: Some(stream),
            shared,
        }))
    }
}

/// State shared between a playback handle and its stream callback
struct SharedPlayback {
    position: AtomicUsize,
    finished: AtomicBool,
    stopped: AtomicBool,
    on_ended: Mutex<Option<OnEnded>>,
}

impl SharedPlayback {
    /// Mark the buffer as fully played and fire `on_ended` once
    fn finish(&self) {
        if self.finished.swap(true, Ordering::AcqRel) || self.stopped.load(Ordering::Acquire) {
            return;
        }

        let callback = self.on_ended.lock().ok().and_then(|mut slot| slot.take());
        if let Some(callback) = callback {
            callback();
        }
    }
}

/// Handle to a cpal output stream playing one buffer
struct CpalPlayback {
    stream: Option<Stream>,
    shared: Arc<SharedPlayback>,
}

impl PlaybackHandle for CpalPlayback {
    fn stop(&mut self) {
        self.shared.stopped.store(true, Ordering::Release);

        if let Ok(mut slot) = self.shared.on_ended.lock() {
            slot.take();
        }

        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::debug!(error = %e, "failed to pause stream before drop");
            }
            drop(stream);
            tracing::debug!("playback stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.stream.is_some() && !self.shared.finished.load(Ordering::Acquire)
    }
}

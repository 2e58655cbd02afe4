//! PCM payload decoding
//!
//! The speech service returns raw signed 16-bit little-endian PCM wrapped in
//! base64. There is no container header, so sample rate and channel count
//! come from the caller.

use std::time::Duration;

use base64::Engine;

use crate::{Error, Result};

/// Sample rate of synthesized speech and of the playback context
pub const SPEECH_SAMPLE_RATE: u32 = 24000;

/// Decoded, normalized audio ready for playback
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Mono buffer at `sample_rate`
    #[must_use]
    pub const fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Number of frames (samples per channel)
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Playback duration
    #[must_use]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = u64::try_from(self.frames()).unwrap_or(u64::MAX);
        Duration::from_micros(frames.saturating_mul(1_000_000) / u64::from(self.sample_rate))
    }

    /// True when there is nothing to play
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Decode standard base64 text into raw bytes
///
/// # Errors
///
/// Returns `Error::AudioDecode` if the text is not valid base64
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::AudioDecode(format!("invalid base64 payload: {e}")))
}

/// Decode raw PCM16LE bytes into a normalized buffer
///
/// Each little-endian `i16` is divided by 32768, so the result lies in
/// [-1.0, 1.0).
///
/// # Errors
///
/// Returns `Error::AudioDecode` if the payload is empty, the byte length is
/// odd, or it does not hold a whole number of frames for `channels`
pub fn decode_pcm16le(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
    if channels == 0 {
        return Err(Error::AudioDecode("channel count must be at least 1".to_string()));
    }

    if bytes.is_empty() {
        return Err(Error::AudioDecode("empty audio payload".to_string()));
    }

    if bytes.len() % 2 != 0 {
        return Err(Error::AudioDecode(format!(
            "PCM16 payload has odd length ({} bytes)",
            bytes.len()
        )));
    }

    let frame_bytes = 2 * usize::from(channels);
    if bytes.len() % frame_bytes != 0 {
        return Err(Error::AudioDecode(format!(
            "{} bytes is not a whole number of {channels}-channel frames",
            bytes.len()
        )));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect();

    Ok(AudioBuffer {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode a base64 speech payload into a mono buffer at `sample_rate`
///
/// # Errors
///
/// Returns `Error::AudioDecode` if either decoding stage fails
pub fn decode_speech_payload(payload: &str, sample_rate: u32) -> Result<AudioBuffer> {
    let bytes = decode_base64(payload)?;
    decode_pcm16le(&bytes, sample_rate, 1)
}

/// Convert a normalized sample to `i16`
///
/// Inverse of the decode scaling: clamped to [-1.0, 1.0], scaled by 32768,
/// rounded, and saturated to the `i16` range.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn sample_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32768.0)
        .round()
        .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

/// Encode normalized samples as PCM16LE bytes
#[must_use]
pub fn encode_pcm16le(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| sample_to_i16(s).to_le_bytes())
        .collect()
}

/// Encode a buffer as a 16-bit PCM WAV file
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in &buffer.samples {
            writer
                .write_sample(sample_to_i16(sample))
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

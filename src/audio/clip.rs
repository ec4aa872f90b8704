//! Decoded clip audio ready for windowed playout.
//!
//! [`ClipSource`] is the seekable audio source behind the range player: the
//! uploaded WAV decoded to mono `f32` at the output device rate, so a
//! second-domain range maps to frame indices with one multiplication.
//! [`decode_wav_mono`] is the shared WAV-to-PCM step, also used for
//! synthesized speech replies.

use std::io::Cursor;
use std::sync::Arc;

use super::output::AudioError;
use super::resample::{resample_linear, stereo_to_mono};

// ---------------------------------------------------------------------------
// decode_wav_mono
// ---------------------------------------------------------------------------

/// Decode a WAV byte buffer to mono `f32` samples at the file's native rate.
///
/// Handles both integer (8/16/24/32-bit) and `f32` sample formats; integer
/// samples are normalized to `[-1.0, 1.0]`.  Multi-channel files are
/// downmixed by averaging.
///
/// # Errors
///
/// Returns [`AudioError::Decode`] when the bytes are not a readable WAV
/// stream.
pub fn decode_wav_mono(bytes: &[u8]) -> Result<(Vec<f32>, u32), AudioError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::Decode(e.to_string()))?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Decode(e.to_string()))?
        }
    };

    Ok((stereo_to_mono(&samples, spec.channels), spec.sample_rate))
}

// ---------------------------------------------------------------------------
// ClipSource
// ---------------------------------------------------------------------------

/// One clip's audio, decoded and normalized for the output device.
///
/// Cheap to clone: the frame buffer is shared behind an `Arc`, which is also
/// what lets the playout window borrow it without copying.
#[derive(Clone)]
pub struct ClipSource {
    /// Mono frames at [`sample_rate`](Self::sample_rate).
    pub frames: Arc<Vec<f32>>,
    /// Rate the frames were resampled to (the output device rate).
    pub sample_rate: u32,
}

impl ClipSource {
    /// Decode a WAV clip and normalize it to mono `f32` at `target_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Decode`] for anything `hound` cannot read.
    /// Non-WAV uploads are still fine for transcription; only local playback
    /// needs this to succeed.
    pub fn decode_wav(bytes: &[u8], target_rate: u32) -> Result<Self, AudioError> {
        let (mono, native_rate) = decode_wav_mono(bytes)?;
        let frames = resample_linear(&mono, native_rate, target_rate);

        log::debug!(
            "clip: decoded {} frames @ {native_rate} Hz → {} frames @ {target_rate} Hz",
            mono.len(),
            frames.len()
        );

        Ok(Self {
            frames: Arc::new(frames),
            sample_rate: target_rate,
        })
    }

    /// Total clip length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

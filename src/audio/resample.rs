//! Channel mixing and sample-rate conversion.
//!
//! Decoded clips and synthesized speech rarely arrive at the output device's
//! native rate, so everything is normalized to **mono `f32` at the sink
//! rate** before playout:
//!
//! 1. [`stereo_to_mono`] — downmix any number of interleaved channels.
//! 2. [`resample_linear`] — convert between arbitrary sample rates.
//!
//! The resampler uses linear interpolation: fast, dependency-free, and more
//! than adequate for speech playback.

// ---------------------------------------------------------------------------
// stereo_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// The output length is `samples.len() / channels`.
///
/// * If `channels == 1` the input slice is returned as an owned `Vec` with no
///   averaging (fast path — avoids extra work when already mono).
/// * If `channels == 0` an empty vector is returned.
///
/// # Example
///
/// ```rust
/// use listen_lesson::audio::stereo_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, -0.2]; // L R L R
/// let mono = stereo_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.0).abs() < 1e-6);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample_linear
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` to `target_rate` Hz using
/// linear interpolation.
///
/// * If the rates match the input is cloned and returned unchanged (no-op
///   fast path, no interpolation performed).
/// * If `samples` is empty an empty vector is returned.
///
/// The output length is approximately
/// `samples.len() * target_rate / source_rate`.
///
/// # Example
///
/// ```rust
/// use listen_lesson::audio::resample_linear;
///
/// // Same rate — no-op
/// let speech = vec![0.1_f32; 240];
/// let out = resample_linear(&speech, 24_000, 24_000);
/// assert_eq!(out.len(), speech.len());
///
/// // 24 kHz synthesized speech up to a 48 kHz output device (ratio = 2)
/// let lo = vec![0.5_f32; 240];
/// let hi = resample_linear(&lo, 24_000, 48_000);
/// assert_eq!(hi.len(), 480);
/// ```
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }

    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            // Linear interpolation between adjacent samples
            samples[idx] * (1.0 - frac as f32) + samples[idx + 1] * frac as f32
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- stereo_to_mono ----------------------------------------------------

    #[test]
    fn stereo_to_mono_already_mono() {
        let input = vec![0.1_f32, 0.2, 0.3];
        let out = stereo_to_mono(&input, 1);
        assert_eq!(out, input);
    }

    #[test]
    fn stereo_to_mono_two_channel() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = stereo_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6); // (1.0 + -1.0) / 2
        assert!((out[1] - 0.5).abs() < 1e-6); // (0.5 + 0.5) / 2
    }

    #[test]
    fn stereo_to_mono_four_channel() {
        let input = vec![0.4_f32; 4];
        let out = stereo_to_mono(&input, 4);
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn stereo_to_mono_zero_channels() {
        let out = stereo_to_mono(&[1.0_f32, 2.0], 0);
        assert!(out.is_empty());
    }

    // ---- resample_linear ----------------------------------------------------

    #[test]
    fn resample_same_rate_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        let out = resample_linear(&input, 48_000, 48_000);
        assert_eq!(out.len(), input.len());
        for (a, b) in input.iter().zip(out.iter()) {
            assert!((a - b).abs() < 1e-6, "sample mismatch: {a} vs {b}");
        }
    }

    #[test]
    fn resample_empty_input() {
        let out = resample_linear(&[], 24_000, 48_000);
        assert!(out.is_empty());
    }

    #[test]
    fn resample_halves_length_when_downsampling_2x() {
        // 480 samples @ 48 kHz = 10 ms → 240 samples @ 24 kHz
        let input = vec![0.5_f32; 480];
        let out = resample_linear(&input, 48_000, 24_000);
        assert_eq!(out.len(), 240);
    }

    #[test]
    fn resample_doubles_length_when_upsampling_2x() {
        // Typical path: 24 kHz synthesized speech → 48 kHz output device
        let input = vec![0.0_f32; 240];
        let out = resample_linear(&input, 24_000, 48_000);
        assert_eq!(out.len(), 480);
    }

    #[test]
    fn resample_44100_to_48000_output_length() {
        // 1 second at 44.1 kHz → ~48000 output samples
        let input = vec![0.0_f32; 44_100];
        let out = resample_linear(&input, 44_100, 48_000);
        let expected = 48_000usize;
        assert!(
            out.len().abs_diff(expected) <= 1,
            "expected ~{expected}, got {}",
            out.len()
        );
    }

    #[test]
    fn resample_constant_signal_preserves_amplitude() {
        // A DC signal (all 0.5) should remain 0.5 after resampling
        let input = vec![0.5_f32; 480];
        let out = resample_linear(&input, 44_100, 48_000);
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }
}

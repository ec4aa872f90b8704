//! Audio playout — cpal output streams, decoded clips, and rate conversion.
//!
//! # Pipeline
//!
//! ```text
//! WAV bytes → decode_wav_mono → stereo_to_mono → resample_linear
//!           → ClipSource / utterance frames
//!           → AudioSink::begin(frames, start, end)
//!           → cpal callback (PlayoutWindow) → speakers
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use listen_lesson::audio::{AudioOutput, AudioSink};
//!
//! let output = AudioOutput::new(None).unwrap();
//! let _handle = output.start().unwrap(); // drop handle → stream stops
//!
//! let sink = output.controller();
//! let frames = Arc::new(vec![0.0_f32; output.sample_rate() as usize]); // 1 s of silence
//! let end = frames.len();
//! sink.begin(frames, 0, end);
//! while sink.is_playing() {
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! ```

pub mod clip;
pub mod output;
pub mod resample;

pub use clip::{decode_wav_mono, ClipSource};
pub use output::{AudioError, AudioOutput, AudioSink, OutputController, StreamHandle};
pub use resample::{resample_linear, stereo_to_mono};

// test-only re-export so device tests can use the deterministic sink without
// reaching into `audio::output`.
#[cfg(test)]
pub use output::TestSink;

//! Text-to-speech subsystem.
//!
//! Two layers:
//!
//! * [`SpeechSynthesizer`] / [`ApiSynthesizer`] — turn text into PCM via an
//!   OpenAI-compatible `/audio/speech` endpoint.
//! * [`SpeakerOutput`] — the playback-facing device: synthesizes, resamples
//!   and plays one utterance at a time on an audio sink.
//!
//! The session only ever sees [`SpeakerOutput`] through the
//! [`SpeechOutput`](crate::playback::SpeechOutput) trait.

pub mod output;
pub mod synth;

pub use output::SpeakerOutput;
pub use synth::{ApiSynthesizer, SpeechError, SpeechSynthesizer, SpokenAudio};

#[cfg(test)]
pub use synth::MockSynthesizer;

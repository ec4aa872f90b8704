//! Listen Lesson — sequential playback for language-learning clips.
//!
//! Load an audio clip, transcribe it into timed segments, then listen: each
//! segment's slice of the original audio is played and its translation is
//! spoken aloud, strictly alternating, until the lesson ends or the user
//! stops it.
//!
//! # Subsystems
//!
//! | Module | Role |
//! |--------|------|
//! | [`audio`] | cpal output streams, WAV decoding, resampling |
//! | [`lesson`] | segment records and the store for the active clip |
//! | [`transcribe`] | upload a clip, get timed segments back |
//! | [`speech`] | synthesize translations and voice them |
//! | [`playback`] | the session — sequencing, preemption, playback state |
//! | [`app`] | application layer gluing the above together |
//! | [`config`] | `settings.toml` loading and defaults |

pub mod app;
pub mod audio;
pub mod config;
pub mod lesson;
pub mod playback;
pub mod speech;
pub mod transcribe;

//! Sequential playback — the alternating range/translation orchestrator.
//!
//! # Architecture
//!
//! ```text
//! PlaybackSession (handle) ──commands──▶ SessionRunner (one task)
//!        ▲                                   │
//!        └────────── watch<PlaybackState> ◀──┤
//!                                            ├─▶ RangePlayer  (ClipRangePlayer → AudioSink)
//!                                            └─▶ SpeechOutput (SpeakerOutput  → AudioSink)
//! ```
//!
//! The devices are trait objects so the session can be tested without
//! touching real audio hardware; the production implementations live in
//! [`player`] and [`crate::speech`].

pub mod device;
pub mod player;
pub mod session;
pub mod state;

pub use device::{PlayOutcome, PlaybackError, RangePlayer, SpeechOutput};
pub use player::ClipRangePlayer;
pub use session::{PlaybackSession, SessionCommand, SessionRunner};
pub use state::PlaybackState;

// test-only re-exports so other modules' tests can drive a session against
// scripted devices.
#[cfg(test)]
pub use device::{new_call_log, CallLog, DeviceCall, MockBehavior, MockRangePlayer, MockSpeechOutput};

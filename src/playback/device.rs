//! Device traits the session orchestrates: a seekable range player and a
//! speech output.
//!
//! # Overview
//!
//! [`RangePlayer`] and [`SpeechOutput`] are the two asynchronous, time-based
//! devices under the session's control.  Both are object-safe and
//! `Send + Sync` so they can be held behind `Arc<dyn …>` and shared with the
//! sequencing task.
//!
//! Device calls resolve with a [`PlayOutcome`] rather than failing when they
//! are cut short: [`abort`](RangePlayer::abort) ends the in-flight call as
//! [`PlayOutcome::Aborted`], which the session treats as a normal signal,
//! not an error.  Only two real failures exist at this seam, both raised
//! before any audio starts: [`PlaybackError::OutOfRange`] and
//! [`PlaybackError::SourceUnavailable`].  Speech has no failure mode at all;
//! a broken synthesis must not stall the lesson, so implementations absorb
//! their errors and resolve `Completed`.
//!
//! Production implementations: [`ClipRangePlayer`](crate::playback::ClipRangePlayer)
//! and [`SpeakerOutput`](crate::speech::SpeakerOutput).

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// PlayOutcome
// ---------------------------------------------------------------------------

/// How an in-flight device operation resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The range or utterance ran to its natural end.
    Completed,
    /// The operation was cut short by `abort` or superseded by a newer call.
    Aborted,
}

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Failures the session reports to its caller.
///
/// Everything else that can go wrong mid-run (device aborted, source lost,
/// synthesis failed) resolves the run back to idle without surfacing here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// The requested segment index does not exist.
    #[error("segment index {index} is out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },

    /// Playback was requested with no audio clip loaded.
    #[error("no audio clip is loaded")]
    SourceUnavailable,
}

// ---------------------------------------------------------------------------
// RangePlayer trait
// ---------------------------------------------------------------------------

/// Plays bounded time ranges of one continuous audio source.
///
/// # Contract
///
/// - Only one `play_range` is in flight at a time; a newer call supersedes
///   the previous one (which resolves `Aborted`).  The session never relies
///   on this, it always aborts explicitly before starting a new range.
/// - `abort` resolves the in-flight call as `Aborted` and silences the
///   device before returning.
/// - `play_range` fails with [`PlaybackError::SourceUnavailable`] when no
///   source is loaded.
#[async_trait]
pub trait RangePlayer: Send + Sync {
    /// Play `[start, end)` seconds of the loaded source; resolves when the
    /// range has been heard in full or the call was aborted.
    async fn play_range(&self, start: f64, end: f64) -> Result<PlayOutcome, PlaybackError>;

    /// Cut short the in-flight range, if any.  Synchronous: the device is
    /// silent when this returns.
    fn abort(&self);

    /// `true` when an audio source is loaded and playable.
    fn has_source(&self) -> bool;
}

// Compile-time assertion: Box<dyn RangePlayer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn RangePlayer>) {}
};

// ---------------------------------------------------------------------------
// SpeechOutput trait
// ---------------------------------------------------------------------------

/// Speaks one utterance at a time.
///
/// # Contract
///
/// - Each `speak` fully supersedes any queued or in-progress utterance;
///   there is no queueing.
/// - Synthesis or playback errors are absorbed by the implementation (a bad
///   utterance resolves `Completed` so the sequence keeps moving).
/// - `abort` stops speech immediately and resolves the in-flight call as
///   `Aborted`.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text` in `locale`; resolves when the utterance ends, was
    /// skipped, or was aborted.
    async fn speak(&self, text: &str, locale: &str) -> PlayOutcome;

    /// Cut short the in-flight utterance, if any.
    fn abort(&self);
}

// Compile-time assertion: Box<dyn SpeechOutput> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechOutput>) {}
};

// ---------------------------------------------------------------------------
// Mock devices  (test-only)
// ---------------------------------------------------------------------------

/// One entry in the shared device call log.
///
/// Both mocks append to a single [`CallLog`], so tests assert the exact
/// interleaving of range and speech activity across a whole run.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    PlayRange { start: f64, end: f64 },
    Speak { text: String, locale: String },
    AbortRange,
    AbortSpeech,
}

#[cfg(test)]
pub type CallLog = std::sync::Arc<std::sync::Mutex<Vec<DeviceCall>>>;

/// Fresh empty call log for a pair of mock devices.
#[cfg(test)]
pub fn new_call_log() -> CallLog {
    std::sync::Arc::new(std::sync::Mutex::new(Vec::new()))
}

/// How a mock device call resolves.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Resolve `Completed` immediately.
    Complete,
    /// Suspend until `abort` is called, then resolve `Aborted`.
    HoldUntilAbort,
}

/// Test double for [`RangePlayer`] that records calls to a shared log.
#[cfg(test)]
pub struct MockRangePlayer {
    log: CallLog,
    behavior: MockBehavior,
    has_source: bool,
    aborted: tokio::sync::Notify,
}

#[cfg(test)]
impl MockRangePlayer {
    /// A player with a loaded source and the given behaviour.
    pub fn new(log: CallLog, behavior: MockBehavior) -> Self {
        Self {
            log,
            behavior,
            has_source: true,
            aborted: tokio::sync::Notify::new(),
        }
    }

    /// A player with no loaded source: `play_range` fails, `has_source` is
    /// `false`.
    pub fn without_source(log: CallLog) -> Self {
        Self {
            log,
            behavior: MockBehavior::Complete,
            has_source: false,
            aborted: tokio::sync::Notify::new(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl RangePlayer for MockRangePlayer {
    async fn play_range(&self, start: f64, end: f64) -> Result<PlayOutcome, PlaybackError> {
        if !self.has_source {
            return Err(PlaybackError::SourceUnavailable);
        }
        self.log
            .lock()
            .unwrap()
            .push(DeviceCall::PlayRange { start, end });
        match self.behavior {
            MockBehavior::Complete => Ok(PlayOutcome::Completed),
            MockBehavior::HoldUntilAbort => {
                self.aborted.notified().await;
                Ok(PlayOutcome::Aborted)
            }
        }
    }

    fn abort(&self) {
        self.log.lock().unwrap().push(DeviceCall::AbortRange);
        self.aborted.notify_waiters();
    }

    fn has_source(&self) -> bool {
        self.has_source
    }
}

/// Test double for [`SpeechOutput`] that records calls to a shared log.
#[cfg(test)]
pub struct MockSpeechOutput {
    log: CallLog,
    behavior: MockBehavior,
    aborted: tokio::sync::Notify,
}

#[cfg(test)]
impl MockSpeechOutput {
    pub fn new(log: CallLog, behavior: MockBehavior) -> Self {
        Self {
            log,
            behavior,
            aborted: tokio::sync::Notify::new(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechOutput for MockSpeechOutput {
    async fn speak(&self, text: &str, locale: &str) -> PlayOutcome {
        self.log.lock().unwrap().push(DeviceCall::Speak {
            text: text.to_string(),
            locale: locale.to_string(),
        });
        match self.behavior {
            MockBehavior::Complete => PlayOutcome::Completed,
            MockBehavior::HoldUntilAbort => {
                self.aborted.notified().await;
                PlayOutcome::Aborted
            }
        }
    }

    fn abort(&self) {
        self.log.lock().unwrap().push(DeviceCall::AbortSpeech);
        self.aborted.notify_waiters();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

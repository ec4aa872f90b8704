//! Playback state machine.
//!
//! [`PlaybackState`] is owned exclusively by the
//! [`PlaybackSession`](crate::playback::PlaybackSession); no other component
//! mutates it.  The presentation layer observes it through the session's
//! `watch` channel to render progress.
//!
//! State transitions:
//!
//! ```text
//! Idle ──play_all──────▶ PlayingAll(0)
//!      ──play_one(i)───▶ PlayingOne(i)
//!
//! PlayingAll(i) ──segment done──▶ PlayingAll(i+1)
//!               ──list exhausted▶ Idle
//! PlayingOne(i) ──segment done──▶ Idle
//!
//! any playing state ──stop──────▶ Idle            (after teardown)
//!                   ──play_all──▶ PlayingAll(0)   (after teardown)
//!                   ──play_one──▶ PlayingOne(j)   (after teardown)
//! ```
//!
//! `Idle` is both the initial and the only terminal state.  Every failure
//! path (aborted device call, source lost mid-run, list replaced under the
//! session) resolves back to `Idle`; the session never parks in a stuck
//! playing state.

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// Current activity of the playback session.
///
/// The `usize` payload of the playing variants is the index of the segment
/// being worked on right now (audio range or spoken translation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing is playing.
    Idle,

    /// Sequencing through the whole segment list; currently at this index.
    PlayingAll(usize),

    /// Playing a single segment on demand; returns to `Idle` afterwards.
    PlayingOne(usize),
}

impl PlaybackState {
    /// Returns `true` while either device may be producing output.
    ///
    /// ```
    /// use listen_lesson::playback::PlaybackState;
    ///
    /// assert!(!PlaybackState::Idle.is_active());
    /// assert!(PlaybackState::PlayingAll(0).is_active());
    /// assert!(PlaybackState::PlayingOne(3).is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        !matches!(self, PlaybackState::Idle)
    }

    /// Index of the segment currently being played, if any.
    ///
    /// ```
    /// use listen_lesson::playback::PlaybackState;
    ///
    /// assert_eq!(PlaybackState::Idle.current_index(), None);
    /// assert_eq!(PlaybackState::PlayingAll(2).current_index(), Some(2));
    /// assert_eq!(PlaybackState::PlayingOne(0).current_index(), Some(0));
    /// ```
    pub fn current_index(&self) -> Option<usize> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::PlayingAll(i) | PlaybackState::PlayingOne(i) => Some(*i),
        }
    }

    /// A short human-readable label suitable for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::PlayingAll(_) => "Playing all",
            PlaybackState::PlayingOne(_) => "Playing one",
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Idle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

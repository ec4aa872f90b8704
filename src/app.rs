//! Application layer — ties clip loading, transcription and playback together.
//!
//! # Architecture
//!
//! [`LessonApp`] owns the mutable application state (the loaded clip) and
//! coordinates the three subsystems around it:
//!
//! ```text
//! load <path> ──► read bytes ──► ClipSource::decode_wav ──► ClipRangePlayer
//!                     │               (playable clips)
//!                     ▼
//! transcribe ──► Transcriber ──► SegmentStore.replace
//!                                      │
//! all / one <n> / stop ──────────► PlaybackSession
//! ```
//!
//! Ordering rule: anything that invalidates the current lesson (new clip,
//! re-transcription, clear) first stops the playback session, so the
//! sequencer never touches a clip or segment list that is being swapped out.
//!
//! A clip that `hound` cannot decode is kept for transcription anyway — the
//! service accepts more formats than the local player does.  Such a lesson
//! can be transcribed and listed but not played.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::audio::ClipSource;
use crate::lesson::{Segment, SegmentStore};
use crate::playback::{ClipRangePlayer, PlaybackSession};
use crate::transcribe::Transcriber;

// ---------------------------------------------------------------------------
// LessonApp
// ---------------------------------------------------------------------------

/// The clip currently held by the application.
struct LoadedClip {
    /// File name forwarded to the transcription service.
    file_name: String,
    /// Raw bytes exactly as read from disk.
    bytes: Vec<u8>,
    /// Whether the clip decoded and is installed in the range player.
    playable: bool,
}

/// Top-level application state and operations.
///
/// One instance per process, owned by the command loop.  All methods take
/// `&mut self` — the command loop is the single writer; concurrent playback
/// runs in the session runner and is only ever *stopped* from here.
pub struct LessonApp {
    store: Arc<SegmentStore>,
    session: PlaybackSession,
    player: Arc<ClipRangePlayer>,
    transcriber: Arc<dyn Transcriber>,
    clip: Option<LoadedClip>,
}

impl LessonApp {
    /// Assemble the application over pre-built subsystems.
    pub fn new(
        store: Arc<SegmentStore>,
        session: PlaybackSession,
        player: Arc<ClipRangePlayer>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            store,
            session,
            player,
            transcriber,
            clip: None,
        }
    }

    /// Load a clip from disk, replacing the current one.
    ///
    /// Stops playback and drops the previous lesson first — segment timings
    /// are meaningless against a different clip.  If the file is not WAV the
    /// clip is still kept for transcription; only local playback is
    /// unavailable (see [`clip_is_playable`](Self::clip_is_playable)).
    ///
    /// On a read error the previous clip and lesson stay untouched.
    pub async fn load_clip(&mut self, path: &Path) -> anyhow::Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".to_string());

        // The new clip invalidates everything derived from the old one.
        self.session.stop().await;
        self.store.clear();
        self.player.clear_source();

        let playable = match ClipSource::decode_wav(&bytes, self.player.sample_rate()) {
            Ok(source) => {
                log::info!(
                    "app: loaded {file_name} ({:.1}s, {} bytes)",
                    source.duration_secs(),
                    bytes.len()
                );
                self.player.install_source(source);
                true
            }
            Err(e) => {
                log::warn!(
                    "app: {file_name} is not playable locally ({e}); \
                     it can still be transcribed"
                );
                false
            }
        };

        self.clip = Some(LoadedClip {
            file_name,
            bytes,
            playable,
        });
        Ok(())
    }

    /// Send the loaded clip to the transcription service and swap the result
    /// into the segment store.  Returns the number of segments.
    ///
    /// On any failure — no clip, service error, malformed timings — the
    /// store keeps whatever lesson it had before the call.
    pub async fn transcribe(&mut self) -> anyhow::Result<usize> {
        let clip = self.clip.as_ref().context("no clip loaded")?;

        // Hold playback while the lesson is rebuilt.
        self.session.stop().await;

        let segments = self
            .transcriber
            .transcribe(&clip.bytes, &clip.file_name)
            .await
            .context("transcription failed")?;

        let count = segments.len();
        self.store
            .replace(segments)
            .context("transcription service returned malformed segments")?;
        log::info!("app: lesson ready with {count} segments");
        Ok(count)
    }

    /// Drop the clip and its lesson, returning to the empty state.
    pub async fn clear_clip(&mut self) {
        self.session.stop().await;
        self.player.clear_source();
        self.store.clear();
        self.clip = None;
        log::info!("app: clip and lesson cleared");
    }

    /// Handle to the playback session, for play / stop commands.
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Coherent snapshot of the current lesson.
    pub fn segments(&self) -> Arc<Vec<Segment>> {
        self.store.snapshot()
    }

    pub fn has_clip(&self) -> bool {
        self.clip.is_some()
    }

    /// File name of the loaded clip, if any.
    pub fn clip_name(&self) -> Option<&str> {
        self.clip.as_ref().map(|c| c.file_name.as_str())
    }

    /// `false` when no clip is loaded or it could not be decoded for local
    /// playback.
    pub fn clip_is_playable(&self) -> bool {
        self.clip.as_ref().is_some_and(|c| c.playable)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

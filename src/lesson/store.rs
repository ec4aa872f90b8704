//! Segment store — the ordered transcription result for the active clip.
//!
//! [`SegmentStore`] holds an immutable snapshot behind a short-lived mutex.
//! `replace` swaps the whole list atomically (new transcription result or
//! clear); `get` hands out cheap clones of individual records.  Readers that
//! want to walk the list take a [`snapshot`](SegmentStore::snapshot), an
//! `Arc` clone that stays coherent even if the list is replaced underneath.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::segment::Segment;

// ---------------------------------------------------------------------------
// LessonError
// ---------------------------------------------------------------------------

/// Errors raised by the segment store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LessonError {
    /// The requested index does not exist in the current list.
    #[error("segment index {index} is out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },

    /// A record in a `replace` call had a non-positive range or a negative
    /// start.  The whole call is refused and the store is left unchanged, so
    /// segment indices always correspond 1:1 to what the transcription
    /// service returned.
    #[error("segment {index} has invalid timing ({start}..{end})")]
    InvalidTiming { index: usize, start: f64, end: f64 },
}

// ---------------------------------------------------------------------------
// SegmentStore
// ---------------------------------------------------------------------------

/// Thread-safe holder of the ordered segment list for the active clip.
///
/// Shared as `Arc<SegmentStore>` between the playback session (reader) and
/// the application layer (writer).  The lock is only held for a pointer swap
/// or a clone; it is never held across `.await` points.
///
/// # Example
///
/// ```
/// use listen_lesson::lesson::{Segment, SegmentStore};
///
/// let store = SegmentStore::new();
/// store
///     .replace(vec![Segment {
///         index: 0,
///         start: 0.0,
///         end: 2.0,
///         original: "hola".into(),
///         translation: "hello".into(),
///     }])
///     .unwrap();
///
/// assert_eq!(store.len(), 1);
/// assert_eq!(store.get(0).unwrap().translation, "hello");
/// assert!(store.get(1).is_err());
/// ```
pub struct SegmentStore {
    segments: Mutex<Arc<Vec<Segment>>>,
}

impl SegmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            segments: Mutex::new(Arc::new(Vec::new())),
        }
    }

    /// Atomically swap in a new segment list.
    ///
    /// Every record is validated first: `start` must be non-negative and
    /// `end` strictly greater than `start`.  On the first violation the call
    /// returns [`LessonError::InvalidTiming`] and the store keeps its
    /// previous contents.  An empty list is valid and simply leaves nothing
    /// to play.
    pub fn replace(&self, segments: Vec<Segment>) -> Result<(), LessonError> {
        for seg in &segments {
            if seg.start < 0.0 || seg.end <= seg.start {
                return Err(LessonError::InvalidTiming {
                    index: seg.index,
                    start: seg.start,
                    end: seg.end,
                });
            }
        }

        log::debug!("store: replaced with {} segments", segments.len());
        *self.segments.lock().unwrap() = Arc::new(segments);
        Ok(())
    }

    /// Drop all segments (clip cleared or new upload pending).
    pub fn clear(&self) {
        *self.segments.lock().unwrap() = Arc::new(Vec::new());
    }

    /// Fetch a clone of the segment at `index`.
    pub fn get(&self, index: usize) -> Result<Segment, LessonError> {
        let snapshot = self.snapshot();
        snapshot
            .get(index)
            .cloned()
            .ok_or(LessonError::OutOfRange {
                index,
                len: snapshot.len(),
            })
    }

    /// Number of segments in the current list.
    pub fn len(&self) -> usize {
        self.segments.lock().unwrap().len()
    }

    /// `true` when no transcription result is loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cheap coherent snapshot of the whole list (`Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Segment>> {
        Arc::clone(&self.segments.lock().unwrap())
    }
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

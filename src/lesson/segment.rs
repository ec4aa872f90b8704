//! The segment record produced by transcription.

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// One time-aligned piece of the lesson clip.
///
/// Segments are immutable once produced by the transcription service; the
/// whole list is replaced wholesale when a new clip is transcribed or the
/// clip is cleared.  They are played strictly in list order — the session
/// never reorders or skips based on timing, so overlapping or non-contiguous
/// ranges are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Ordinal position in the lesson; mirrors the list index for display.
    pub index: usize,
    /// Start of the range in the source clip, in seconds (>= 0).
    pub start: f64,
    /// End of the range in seconds.  Must be strictly greater than `start`;
    /// [`SegmentStore::replace`](crate::lesson::SegmentStore::replace)
    /// rejects records that violate this.
    pub end: f64,
    /// Text in the clip's original language.
    pub original: String,
    /// Translation spoken after the original audio.
    pub translation: String,
}

impl Segment {
    /// Length of the segment's audio range in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.end - self.start
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

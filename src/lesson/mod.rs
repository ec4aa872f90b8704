//! Lesson data — segment records and the store that holds them.
//!
//! A lesson is the transcription result for one uploaded clip: an ordered
//! list of [`Segment`]s, each pairing a time range in the source audio with
//! its original text and translation.  [`SegmentStore`] owns the list for
//! the active clip and is replaced wholesale on re-transcription or clear.

pub mod segment;
pub mod store;

pub use segment::Segment;
pub use store::{LessonError, SegmentStore};

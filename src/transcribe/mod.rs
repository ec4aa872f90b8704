//! Transcription subsystem.
//!
//! One seam: [`Transcriber`], implemented by [`ApiTranscriber`], which
//! uploads the raw clip to an external service and returns the ordered,
//! time-aligned [`Segment`](crate::lesson::Segment) list — original text and
//! translation included.  The application layer swaps the result into the
//! [`SegmentStore`](crate::lesson::SegmentStore) wholesale.

pub mod client;

pub use client::{ApiTranscriber, TranscribeError, Transcriber};

#[cfg(test)]
pub use client::MockTranscriber;

//! Core `Transcriber` trait and `ApiTranscriber` implementation.
//!
//! `ApiTranscriber` uploads the raw clip bytes to a transcription service's
//! `/transcribe` endpoint and maps the JSON reply into [`Segment`] records.
//! All connection details come from [`TranscriberConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::TranscriberConfig;
use crate::lesson::Segment;

// ---------------------------------------------------------------------------
// TranscribeError
// ---------------------------------------------------------------------------

/// Errors that can occur while transcribing a clip.
#[derive(Debug, Clone, Error)]
pub enum TranscribeError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("transcription request timed out")]
    Timeout,

    /// The service answered with a non-success status code.
    #[error("transcription service returned HTTP {status}")]
    Api { status: u16 },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse transcription response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TranscribeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranscribeError::Timeout
        } else {
            TranscribeError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Async trait for transcription backends.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn Transcriber>`).
///
/// # Arguments
/// * `audio`     – Raw clip bytes, exactly as read from disk.
/// * `file_name` – Original file name; forwarded so the service can pick a
///                 decoder from the extension.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
    ) -> Result<Vec<Segment>, TranscribeError>;
}

// Compile-time assertion: Box<dyn Transcriber> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Transcriber>) {}
};

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Reply shape of the `/transcribe` endpoint.
///
/// Ordinal indices are assigned here, in arrival order — the service's own
/// ordering is the lesson's playback order.
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    segments: Vec<SegmentRecord>,
}

#[derive(Debug, Deserialize)]
struct SegmentRecord {
    start: f64,
    end: f64,
    original: String,
    translation: String,
}

fn into_segments(records: Vec<SegmentRecord>) -> Vec<Segment> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, rec)| Segment {
            index,
            start: rec.start,
            end: rec.end,
            original: rec.original,
            translation: rec.translation,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ApiTranscriber
// ---------------------------------------------------------------------------

/// Uploads clips to a `/transcribe` endpoint as `multipart/form-data`.
///
/// The clip goes up verbatim in a `file` part; the reply is expected to be
/// JSON with a `segments` array of `{start, end, original, translation}`
/// records, in playback order.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`) come exclusively from the
/// [`TranscriberConfig`] passed to [`ApiTranscriber::from_config`].
pub struct ApiTranscriber {
    client: reqwest::Client,
    config: TranscriberConfig,
}

impl ApiTranscriber {
    /// Build an `ApiTranscriber` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs` — transcription of a long clip can take a
    /// while, so this is the largest timeout in the application.  A default
    /// (no-timeout) client is used as a last-resort fallback if the builder
    /// fails (should never happen in practice).
    pub fn from_config(config: &TranscriberConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Transcriber for ApiTranscriber {
    /// Upload `audio` to the configured endpoint and map the reply.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// local services that require no authentication.
    async fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
    ) -> Result<Vec<Segment>, TranscribeError> {
        let url = format!("{}/transcribe", self.config.base_url.trim_end_matches('/'));

        log::debug!(
            "transcribe: uploading {file_name} ({} bytes) to {url}",
            audio.len()
        );

        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut req = self.client.post(&url).multipart(form);

        // Attach Authorization header only when api_key is a non-empty string.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscribeError::Api {
                status: status.as_u16(),
            });
        }

        let reply: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::Parse(e.to_string()))?;

        let segments = into_segments(reply.segments);
        log::info!("transcribe: received {} segments", segments.len());
        Ok(segments)
    }
}

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured result without any I/O.
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<Vec<Segment>, TranscribeError>,
}

#[cfg(test)]
impl MockTranscriber {
    /// Always resolves `Ok` with (a clone of) the given segments.
    pub fn ok(segments: Vec<Segment>) -> Self {
        Self {
            response: Ok(segments),
        }
    }

    /// Always resolves `Err` with (a clone of) the given error.
    pub fn err(error: TranscribeError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _file_name: &str,
    ) -> Result<Vec<Segment>, TranscribeError> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

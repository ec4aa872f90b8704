//! Core `SpeechSynthesizer` trait and `ApiSynthesizer` implementation.
//!
//! `ApiSynthesizer` calls any OpenAI-compatible `/audio/speech` endpoint —
//! OpenAI itself, LocalAI, Kokoro-FastAPI, any provider that accepts the
//! same request shape and answers with a WAV body.  All connection details
//! come from [`SpeechConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::decode_wav_mono;
use crate::config::SpeechConfig;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors that can occur while synthesizing an utterance.
///
/// None of these reach the playback session — [`SpeakerOutput`] absorbs them
/// and resolves the utterance as finished, matching how a human listener
/// experiences a skipped translation.
///
/// [`SpeakerOutput`]: crate::speech::SpeakerOutput
#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    /// HTTP transport failure or a non-success response from the API.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// The request did not complete within the configured timeout.
    #[error("speech synthesis timed out")]
    Timeout,

    /// The API reply was not decodable WAV audio.
    #[error("failed to decode synthesized audio: {0}")]
    Decode(String),

    /// Nothing to say — empty input text or an empty audio reply.
    #[error("utterance is empty")]
    EmptyUtterance,
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Synthesis(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpokenAudio
// ---------------------------------------------------------------------------

/// One synthesized utterance as mono PCM.
#[derive(Debug, Clone)]
pub struct SpokenAudio {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate the engine produced (not necessarily the sink's).
    pub sample_rate: u32,
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for text-to-speech backends.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn SpeechSynthesizer>`).
///
/// # Arguments
/// * `text`   – The utterance to synthesize, already non-empty.
/// * `locale` – BCP 47 tag of the translation language (e.g. `en-US`).
///              Backends that pick the voice from configuration may only
///              log it.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, locale: &str) -> Result<SpokenAudio, SpeechError>;
}

// Compile-time assertion: Box<dyn SpeechSynthesizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechSynthesizer>) {}
};

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/audio/speech` endpoint.
///
/// The request asks for `response_format: "wav"` so the reply can be decoded
/// locally without an audio codec stack.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, `model`, `voice`) come
/// exclusively from the [`SpeechConfig`] passed to
/// [`ApiSynthesizer::from_config`].
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl ApiSynthesizer {
    /// Build an `ApiSynthesizer` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &SpeechConfig) -> Self {
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
impl SpeechSynthesizer for ApiSynthesizer {
    /// Synthesize `text` through the configured endpoint and decode the WAV
    /// reply to mono PCM.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// local providers that require no authentication.
    async fn synthesize(&self, text: &str, locale: &str) -> Result<SpokenAudio, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyUtterance);
        }

        let url = format!(
            "{}/audio/speech",
            self.config.base_url.trim_end_matches('/')
        );

        // The voice comes from configuration; the locale is informational
        // for this backend.
        log::debug!(
            "synth: {} chars, locale {locale}, voice {}",
            text.chars().count(),
            self.config.voice
        );

        let body = serde_json::json!({
            "model":           self.config.model,
            "input":           text,
            "voice":           self.config.voice,
            "response_format": "wav"
        });

        let mut req = self.client.post(&url).json(&body);

        // Attach Authorization header only when api_key is a non-empty string.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Synthesis(format!(
                "speech API returned {status}"
            )));
        }

        let bytes = response.bytes().await?;
        let (samples, sample_rate) =
            decode_wav_mono(&bytes).map_err(|e| SpeechError::Decode(e.to_string()))?;

        if samples.is_empty() {
            return Err(SpeechError::EmptyUtterance);
        }

        Ok(SpokenAudio {
            samples,
            sample_rate,
        })
    }
}

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that resolves with pre-configured audio, a pre-configured
/// error, or never — and records every `(text, locale)` it was asked for.
#[cfg(test)]
pub struct MockSynthesizer {
    response: MockResponse,
    calls: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
enum MockResponse {
    Audio(SpokenAudio),
    Error(SpeechError),
    Pending,
}

#[cfg(test)]
impl MockSynthesizer {
    /// Always resolves `Ok` with the given mono samples.
    pub fn ok(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            response: MockResponse::Audio(SpokenAudio {
                samples,
                sample_rate,
            }),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Always resolves `Err` with (a clone of) the given error.
    pub fn err(error: SpeechError) -> Self {
        Self {
            response: MockResponse::Error(error),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Never resolves — for abort-during-synthesis tests.
    pub fn pending() -> Self {
        Self {
            response: MockResponse::Pending,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every `(text, locale)` pair synthesized so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, locale: &str) -> Result<SpokenAudio, SpeechError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), locale.to_string()));
        match &self.response {
            MockResponse::Audio(audio) => Ok(audio.clone()),
            MockResponse::Error(error) => Err(error.clone()),
            MockResponse::Pending => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

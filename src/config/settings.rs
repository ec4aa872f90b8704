//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// TranscriberConfig
// ---------------------------------------------------------------------------

/// Settings for the transcription/translation service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Base URL of the transcription service.  The clip is uploaded to
    /// `{base_url}/transcribe` as `multipart/form-data`.
    pub base_url: String,
    /// API key — `None` for services that require no authentication.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for a transcription response.  Whole-clip
    /// transcription is slow, so this is generous by default.
    pub timeout_secs: u64,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-synthesis backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Base URL of an OpenAI-compatible API; utterances are posted to
    /// `{base_url}/audio/speech`.
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// TTS model identifier (e.g. `"tts-1"`).
    pub model: String,
    /// Voice name sent to the API (e.g. `"alloy"`, `"nova"`).
    pub voice: String,
    /// Maximum seconds to wait for one synthesized utterance.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            model: "tts-1".into(),
            voice: "alloy".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Timing constants for the playback session and its devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Seconds to seek *before* a segment's start so its onset is not
    /// clipped.
    pub lead_in_secs: f64,
    /// Seconds shaved off a segment's end; the range resolves once playback
    /// reaches `end - trail_out_secs`.
    pub trail_out_secs: f64,
    /// How often the devices poll their sink position, in milliseconds.
    pub poll_interval_ms: u64,
    /// Language tag handed to the speech output for translations
    /// (e.g. `"en-US"`).
    pub locale: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            lead_in_secs: 0.05,
            trail_out_secs: 0.02,
            poll_interval_ms: 10,
            locale: "en-US".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for audio output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Output device name — `None` means the system default.  A name that
    /// matches nothing falls back to the default device with a warning.
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_device: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use listen_lesson::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Transcription service settings.
    pub transcriber: TranscriberConfig,
    /// Speech-synthesis backend settings.
    pub speech: SpeechConfig,
    /// Playback timing constants.
    pub playback: PlaybackConfig,
    /// Audio output settings.
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

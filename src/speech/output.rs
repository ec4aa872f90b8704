//! `SpeakerOutput` — speaks translations through an [`AudioSink`].
//!
//! The production [`SpeechOutput`]: one utterance at a time, synthesized by
//! a [`SpeechSynthesizer`], resampled to the sink's device rate and played
//! to the end of the buffer.
//!
//! ```text
//! speak(text, locale)
//!      │
//!      ▼
//! SpeechSynthesizer ──► resample_linear ──► AudioSink ──► poll until drained
//!   (abortable)                               (abortable)
//! ```
//!
//! An abort can land in either phase: during synthesis it resolves the call
//! before any audio starts; during playback it silences the sink.  Synthesis
//! *failures* are a different matter — a lesson must not stall because one
//! translation could not be voiced, so errors are logged and the call
//! resolves [`PlayOutcome::Completed`] as if the utterance had been spoken.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::audio::{resample_linear, AudioSink};
use crate::config::PlaybackConfig;
use crate::playback::{PlayOutcome, SpeechOutput};

use super::synth::{SpeechError, SpeechSynthesizer};

// ---------------------------------------------------------------------------
// SpeakerOutput
// ---------------------------------------------------------------------------

/// Speaks utterances on an [`AudioSink`], one at a time.
///
/// A newer `speak` supersedes the in-flight one, which resolves
/// [`PlayOutcome::Aborted`].  Synthesized audio is resampled from the
/// engine's rate to the sink's rate before playout.
pub struct SpeakerOutput {
    synth: Arc<dyn SpeechSynthesizer>,
    sink: Arc<dyn AudioSink>,
    poll_interval: Duration,
    /// Token of the in-flight call.  Whoever cancels it also deals with the
    /// sink, so the playout monitor never touches the sink on the aborted
    /// path.
    call_token: Mutex<CancellationToken>,
}

impl SpeakerOutput {
    /// Create a speaker over `sink`, voicing text through `synth`.
    pub fn new(
        synth: Arc<dyn SpeechSynthesizer>,
        sink: Arc<dyn AudioSink>,
        config: &PlaybackConfig,
    ) -> Self {
        Self {
            synth,
            sink,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            call_token: Mutex::new(CancellationToken::new()),
        }
    }
}

#[async_trait]
impl SpeechOutput for SpeakerOutput {
    async fn speak(&self, text: &str, locale: &str) -> PlayOutcome {
        let token = {
            let mut call_token = self.call_token.lock().unwrap();
            call_token.cancel();
            *call_token = CancellationToken::new();
            // A superseded utterance has no replacement window until the new
            // synthesis finishes, so silence it here rather than at `begin`.
            if self.sink.is_playing() {
                self.sink.stop();
            }
            call_token.clone()
        };

        let audio = tokio::select! {
            biased;
            _ = token.cancelled() => return PlayOutcome::Aborted,
            result = self.synth.synthesize(text, locale) => match result {
                Ok(audio) => audio,
                Err(SpeechError::EmptyUtterance) => {
                    log::debug!("speaker: nothing to say, skipping");
                    return PlayOutcome::Completed;
                }
                Err(e) => {
                    log::warn!("speaker: synthesis failed, skipping utterance: {e}");
                    return PlayOutcome::Completed;
                }
            },
        };

        let frames = Arc::new(resample_linear(
            &audio.samples,
            audio.sample_rate,
            self.sink.sample_rate(),
        ));
        log::debug!(
            "speaker: {} frames at {} Hz ready for playout",
            frames.len(),
            self.sink.sample_rate()
        );

        {
            // Start playout while holding the lock so an `abort` is either
            // fully before (we never begin) or fully after (it silences us).
            let _guard = self.call_token.lock().unwrap();
            if token.is_cancelled() {
                return PlayOutcome::Aborted;
            }
            self.sink.begin(Arc::clone(&frames), 0, frames.len());
        }

        let mut ticks = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return PlayOutcome::Aborted,
                _ = ticks.tick() => {
                    if !self.sink.is_playing() {
                        return PlayOutcome::Completed;
                    }
                }
            }
        }
    }

    fn abort(&self) {
        let call_token = self.call_token.lock().unwrap();
        call_token.cancel();
        self.sink.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::TestSink;
    use crate::speech::synth::MockSynthesizer;

    fn test_config() -> PlaybackConfig {
        PlaybackConfig {
            poll_interval_ms: 1,
            ..PlaybackConfig::default()
        }
    }

    fn make_speaker(synth: Arc<MockSynthesizer>, sink: Arc<TestSink>) -> Arc<SpeakerOutput> {
        Arc::new(SpeakerOutput::new(synth, sink, &test_config()))
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        for _ in 0..500 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn utterance_completes_when_the_window_drains() {
        let sink = TestSink::completing(48_000);
        let synth = Arc::new(MockSynthesizer::ok(vec![0.1; 240], 24_000));
        let speaker = make_speaker(synth, Arc::clone(&sink));

        let outcome = speaker.speak("Hello", "en-US").await;

        assert_eq!(outcome, PlayOutcome::Completed);
        // 240 frames at 24 kHz upsample to 480 at the 48 kHz device rate.
        assert_eq!(sink.begins(), vec![(480, 0, 480)]);
        assert_eq!(sink.stops(), 0);
    }

    #[tokio::test]
    async fn locale_reaches_the_synthesizer() {
        let sink = TestSink::completing(48_000);
        let synth = Arc::new(MockSynthesizer::ok(vec![0.1; 48], 48_000));
        let speaker = make_speaker(Arc::clone(&synth), sink);

        speaker.speak("Bonjour", "fr-FR").await;

        assert_eq!(
            synth.calls(),
            vec![("Bonjour".to_string(), "fr-FR".to_string())]
        );
    }

    #[tokio::test]
    async fn synthesis_failure_resolves_completed_without_playing() {
        let sink = TestSink::completing(48_000);
        let synth = Arc::new(MockSynthesizer::err(SpeechError::Synthesis(
            "api offline".into(),
        )));
        let speaker = make_speaker(synth, Arc::clone(&sink));

        let outcome = speaker.speak("Hello", "en-US").await;

        assert_eq!(outcome, PlayOutcome::Completed);
        assert!(sink.begins().is_empty());
        assert_eq!(sink.stops(), 0);
    }

    #[tokio::test]
    async fn empty_utterance_is_skipped() {
        let sink = TestSink::completing(48_000);
        let synth = Arc::new(MockSynthesizer::err(SpeechError::EmptyUtterance));
        let speaker = make_speaker(synth, Arc::clone(&sink));

        let outcome = speaker.speak("", "en-US").await;

        assert_eq!(outcome, PlayOutcome::Completed);
        assert!(sink.begins().is_empty());
    }

    #[tokio::test]
    async fn abort_during_synthesis_resolves_aborted_before_any_audio() {
        let sink = TestSink::completing(48_000);
        let synth = Arc::new(MockSynthesizer::pending());
        let speaker = make_speaker(Arc::clone(&synth), Arc::clone(&sink));

        let in_flight = tokio::spawn({
            let speaker = Arc::clone(&speaker);
            async move { speaker.speak("Hello", "en-US").await }
        });
        wait_until(|| !synth.calls().is_empty()).await;

        speaker.abort();

        assert_eq!(in_flight.await.unwrap(), PlayOutcome::Aborted);
        assert!(sink.begins().is_empty());
    }

    #[tokio::test]
    async fn abort_during_playback_stops_the_sink() {
        let sink = TestSink::holding(48_000);
        let synth = Arc::new(MockSynthesizer::ok(vec![0.1; 240], 24_000));
        let speaker = make_speaker(synth, Arc::clone(&sink));

        let in_flight = tokio::spawn({
            let speaker = Arc::clone(&speaker);
            async move { speaker.speak("Hello", "en-US").await }
        });
        wait_until(|| sink.begins().len() == 1).await;

        speaker.abort();

        assert_eq!(in_flight.await.unwrap(), PlayOutcome::Aborted);
        assert_eq!(sink.stops(), 1);
    }

    #[tokio::test]
    async fn newer_speak_supersedes_and_silences_the_previous_one() {
        let sink = TestSink::holding(48_000);
        let synth = Arc::new(MockSynthesizer::ok(vec![0.1; 240], 24_000));
        let speaker = make_speaker(synth, Arc::clone(&sink));

        let first = tokio::spawn({
            let speaker = Arc::clone(&speaker);
            async move { speaker.speak("Hello", "en-US").await }
        });
        wait_until(|| sink.begins().len() == 1).await;

        let second = tokio::spawn({
            let speaker = Arc::clone(&speaker);
            async move { speaker.speak("World", "en-US").await }
        });

        // The first call is cut short and its audio silenced.
        assert_eq!(first.await.unwrap(), PlayOutcome::Aborted);
        wait_until(|| sink.begins().len() == 2).await;
        assert_eq!(sink.stops(), 1);

        // The second call owns the sink and runs to its natural end.
        sink.finish();
        assert_eq!(second.await.unwrap(), PlayOutcome::Completed);
    }

    #[tokio::test]
    async fn abort_with_nothing_in_flight_is_harmless() {
        let sink = TestSink::completing(48_000);
        let synth = Arc::new(MockSynthesizer::ok(vec![0.1; 48], 48_000));
        let speaker = make_speaker(synth, Arc::clone(&sink));

        speaker.abort();

        let outcome = speaker.speak("Hello", "en-US").await;
        assert_eq!(outcome, PlayOutcome::Completed);
    }
}

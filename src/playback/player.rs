//! `ClipRangePlayer` — plays bounded time ranges of the loaded clip.
//!
//! The production [`RangePlayer`]: it owns the decoded [`ClipSource`] and an
//! [`AudioSink`], converts segment boundaries (seconds) into frame windows
//! and monitors the sink until the window drains or the call is aborted.
//!
//! # Timing
//!
//! A segment `[start, end)` is widened at the front and narrowed at the back
//! before it reaches the sink:
//!
//! ```text
//! seek  = max(0, start − lead_in)     — don't clip the first phoneme
//! stop  = end − trail_out             — release just before the boundary so
//!                                       the next segment never bleeds in
//! ```
//!
//! Both margins come from [`PlaybackConfig`].  The sink pauses itself when
//! the window is exhausted; the monitor here only polls `is_playing` to turn
//! that into a resolved [`PlayOutcome`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::audio::{AudioSink, ClipSource};
use crate::config::PlaybackConfig;

use super::device::{PlayOutcome, PlaybackError, RangePlayer};

// ---------------------------------------------------------------------------
// ClipRangePlayer
// ---------------------------------------------------------------------------

/// Plays time ranges of the currently installed clip on an [`AudioSink`].
///
/// The clip is installed with [`install_source`](Self::install_source) after
/// decoding and cleared when the clip context is dropped.  At most one range
/// is in flight; a newer `play_range` supersedes the previous one, which
/// resolves [`PlayOutcome::Aborted`].
pub struct ClipRangePlayer {
    sink: Arc<dyn AudioSink>,
    lead_in_secs: f64,
    trail_out_secs: f64,
    poll_interval: Duration,
    inner: Mutex<PlayerInner>,
}

struct PlayerInner {
    /// Decoded clip at the sink's sample rate, `None` until a clip loads.
    source: Option<ClipSource>,
    /// Token of the in-flight call.  Whoever cancels it also deals with the
    /// sink (abort stops it, a superseding call replaces the window), so the
    /// monitor never touches the sink on the aborted path.
    call_token: CancellationToken,
}

impl ClipRangePlayer {
    /// Create a player over `sink` with the timing margins from `config`.
    pub fn new(sink: Arc<dyn AudioSink>, config: &PlaybackConfig) -> Self {
        Self {
            sink,
            lead_in_secs: config.lead_in_secs,
            trail_out_secs: config.trail_out_secs,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            inner: Mutex::new(PlayerInner {
                source: None,
                call_token: CancellationToken::new(),
            }),
        }
    }

    /// Sample rate the installed source must be decoded at.
    pub fn sample_rate(&self) -> u32 {
        self.sink.sample_rate()
    }

    /// Install a decoded clip, replacing any previous one.
    ///
    /// An in-flight range over the old clip is aborted and the sink is
    /// silenced before the swap.
    pub fn install_source(&self, source: ClipSource) {
        let mut inner = self.inner.lock().unwrap();
        if inner.source.is_some() {
            inner.call_token.cancel();
            self.sink.stop();
        }
        log::debug!(
            "player: installed clip source ({:.2}s at {} Hz)",
            source.duration_secs(),
            source.sample_rate
        );
        inner.source = Some(source);
    }

    /// Remove the installed clip.  Aborts any in-flight range.
    pub fn clear_source(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.source.take().is_some() {
            inner.call_token.cancel();
            self.sink.stop();
            log::debug!("player: clip source cleared");
        }
    }
}

#[async_trait]
impl RangePlayer for ClipRangePlayer {
    async fn play_range(&self, start: f64, end: f64) -> Result<PlayOutcome, PlaybackError> {
        let token = {
            let mut inner = self.inner.lock().unwrap();
            let source = inner
                .source
                .as_ref()
                .ok_or(PlaybackError::SourceUnavailable)?;

            let rate = source.sample_rate as f64;
            let seek_secs = (start - self.lead_in_secs).max(0.0);
            let stop_secs = (end - self.trail_out_secs).max(seek_secs);
            let start_frame = (seek_secs * rate) as usize;
            let end_frame = ((stop_secs * rate).ceil() as usize).min(source.frames.len());
            let frames = Arc::clone(&source.frames);

            log::debug!(
                "player: range {start:.2}s–{end:.2}s → frames {start_frame}..{end_frame}"
            );

            // Supersede whatever is in flight, then start the new window
            // while still holding the lock so an `abort` is either fully
            // before (we replace its silence) or fully after (it kills us).
            inner.call_token.cancel();
            inner.call_token = CancellationToken::new();
            self.sink.begin(frames, start_frame, end_frame);
            inner.call_token.clone()
        };

        let mut ticks = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return Ok(PlayOutcome::Aborted);
                }
                _ = ticks.tick() => {
                    if !self.sink.is_playing() {
                        return Ok(PlayOutcome::Completed);
                    }
                }
            }
        }
    }

    fn abort(&self) {
        let inner = self.inner.lock().unwrap();
        inner.call_token.cancel();
        self.sink.stop();
    }

    fn has_source(&self) -> bool {
        self.inner.lock().unwrap().source.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::TestSink;

    /// 1 kHz source rate keeps the seconds→frames math readable.
    const RATE: u32 = 1_000;

    fn test_config() -> PlaybackConfig {
        PlaybackConfig {
            poll_interval_ms: 1,
            ..PlaybackConfig::default()
        }
    }

    fn clip(duration_secs: f64) -> ClipSource {
        ClipSource {
            frames: Arc::new(vec![0.1_f32; (duration_secs * RATE as f64) as usize]),
            sample_rate: RATE,
        }
    }

    fn player_with_clip(sink: Arc<TestSink>, duration_secs: f64) -> Arc<ClipRangePlayer> {
        let player = Arc::new(ClipRangePlayer::new(sink, &test_config()));
        player.install_source(clip(duration_secs));
        player
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..500 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("condition not met within 1s");
    }

    // ---- source lifecycle ---

    #[tokio::test]
    async fn play_range_without_source_fails() {
        let sink = TestSink::completing(RATE);
        let player = ClipRangePlayer::new(sink.clone(), &test_config());

        assert!(!player.has_source());
        let result = player.play_range(0.0, 1.0).await;
        assert_eq!(result, Err(PlaybackError::SourceUnavailable));
        assert!(sink.begins().is_empty());
    }

    #[tokio::test]
    async fn install_and_clear_source_flip_has_source() {
        let sink = TestSink::completing(RATE);
        let player = ClipRangePlayer::new(sink, &test_config());

        player.install_source(clip(1.0));
        assert!(player.has_source());

        player.clear_source();
        assert!(!player.has_source());
    }

    #[tokio::test]
    async fn clear_source_silences_an_active_window() {
        let sink = TestSink::holding(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        let p = Arc::clone(&player);
        let call = tokio::spawn(async move { p.play_range(1.0, 3.0).await });
        wait_until(|| sink.begins().len() == 1).await;

        player.clear_source();
        assert_eq!(call.await.unwrap(), Ok(PlayOutcome::Aborted));
        assert!(sink.stops() >= 1);
    }

    // ---- seconds → frames ---

    #[tokio::test]
    async fn range_maps_seconds_to_frames_with_lead_and_trail() {
        let sink = TestSink::completing(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        let outcome = player.play_range(1.0, 2.0).await.unwrap();
        assert_eq!(outcome, PlayOutcome::Completed);

        // lead-in 0.05s widens the front, trail-out 0.02s narrows the back.
        assert_eq!(sink.begins(), vec![(5_000, 950, 1_980)]);
    }

    #[tokio::test]
    async fn lead_in_clamps_at_clip_start() {
        let sink = TestSink::completing(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        player.play_range(0.0, 1.0).await.unwrap();
        assert_eq!(sink.begins(), vec![(5_000, 0, 980)]);
    }

    #[tokio::test]
    async fn end_clamps_at_clip_length() {
        let sink = TestSink::completing(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        player.play_range(4.5, 9.0).await.unwrap();
        assert_eq!(sink.begins(), vec![(5_000, 4_450, 5_000)]);
    }

    #[tokio::test]
    async fn range_beyond_clip_completes_immediately() {
        // A holding sink would park forever if the window were non-empty;
        // a degenerate window must resolve without playing anything.
        let sink = TestSink::holding(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        let outcome = player.play_range(6.0, 7.0).await.unwrap();
        assert_eq!(outcome, PlayOutcome::Completed);
    }

    // ---- completion and abort ---

    #[tokio::test]
    async fn window_drain_resolves_completed() {
        let sink = TestSink::holding(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        let p = Arc::clone(&player);
        let call = tokio::spawn(async move { p.play_range(1.0, 3.0).await });
        wait_until(|| sink.begins().len() == 1).await;

        sink.finish();
        assert_eq!(call.await.unwrap(), Ok(PlayOutcome::Completed));
    }

    #[tokio::test]
    async fn abort_resolves_aborted_and_stops_sink() {
        let sink = TestSink::holding(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        let p = Arc::clone(&player);
        let call = tokio::spawn(async move { p.play_range(1.0, 3.0).await });
        wait_until(|| sink.begins().len() == 1).await;

        player.abort();
        assert_eq!(call.await.unwrap(), Ok(PlayOutcome::Aborted));
        assert!(sink.stops() >= 1);
    }

    #[tokio::test]
    async fn abort_with_nothing_in_flight_is_harmless() {
        let sink = TestSink::completing(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        player.abort();
        // A later range still plays normally.
        let outcome = player.play_range(1.0, 2.0).await.unwrap();
        assert_eq!(outcome, PlayOutcome::Completed);
    }

    #[tokio::test]
    async fn newer_call_supersedes_previous_without_stopping_its_window() {
        let sink = TestSink::holding(RATE);
        let player = player_with_clip(sink.clone(), 5.0);

        let p1 = Arc::clone(&player);
        let first = tokio::spawn(async move { p1.play_range(0.0, 1.0).await });
        wait_until(|| sink.begins().len() == 1).await;

        let p2 = Arc::clone(&player);
        let second = tokio::spawn(async move { p2.play_range(2.0, 3.0).await });
        wait_until(|| sink.begins().len() == 2).await;

        // The first call resolves Aborted; its monitor must not have stopped
        // the sink, because the second window replaced it directly.
        assert_eq!(first.await.unwrap(), Ok(PlayOutcome::Aborted));
        assert_eq!(sink.stops(), 0);

        sink.finish();
        assert_eq!(second.await.unwrap(), Ok(PlayOutcome::Completed));
    }
}

//! Playback session — sequences clip audio and spoken translations.
//!
//! [`PlaybackSession`] is the cloneable handle the app talks to;
//! [`SessionRunner`] is the single task that actually drives the devices.
//! Commands flow one way over a `tokio::sync::mpsc` channel, state flows
//! back over a `tokio::sync::watch` channel.
//!
//! # Sequencing flow
//!
//! ```text
//! SessionCommand::PlayAll
//!   └─▶ for each segment i in 0..len          [PlayingAll(i)]
//!         ├─ player.play_range(start, end)     (clip audio)
//!         └─ speech.speak(translation, locale) (spoken translation)
//!   └─▶ Idle
//!
//! SessionCommand::PlayOne(i)
//!   └─▶ the same two steps for segment i only  [PlayingOne(i)]
//!   └─▶ Idle
//!
//! SessionCommand::Stop
//!   └─▶ Idle
//! ```
//!
//! The two steps strictly alternate: the translation is never spoken while
//! the range is still sounding, and the next range never starts while the
//! translation is still being spoken.
//!
//! # Preemption
//!
//! A command arriving while a sequence is running wins the `biased` select
//! around the current device operation: the runner aborts both devices,
//! drops the in-flight call and handles the new command immediately.  The
//! runner is the only component that ever starts a device operation, so
//! "abort the old call before issuing a new one" holds by construction —
//! there is no window in which two ranges or two utterances overlap.
//!
//! An aborted or failed device call (clip cleared mid-run, for instance)
//! ends the sequence and settles the state machine back to `Idle`; nothing
//! mid-run surfaces as an error to the caller.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::config::PlaybackConfig;
use crate::lesson::SegmentStore;

use super::device::{PlayOutcome, PlaybackError, RangePlayer, SpeechOutput};
use super::state::PlaybackState;

/// Command backlog before senders start waiting.
const COMMAND_CHANNEL_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// SessionCommand
// ---------------------------------------------------------------------------

/// What the handle asks the runner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Sequence every segment from the top of the list.
    PlayAll,
    /// Play a single, already validated segment index.
    PlayOne(usize),
    /// Settle back to idle.
    Stop,
}

// ---------------------------------------------------------------------------
// PlaybackSession
// ---------------------------------------------------------------------------

/// Handle to the playback session.
///
/// Cheap to clone; all clones feed the same [`SessionRunner`], so there is
/// exactly one active playback at any time regardless of how many handles
/// exist.  Requests are validated here, before anything is torn down: a
/// failed call leaves whatever was playing untouched.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use listen_lesson::config::PlaybackConfig;
/// use listen_lesson::lesson::SegmentStore;
/// use listen_lesson::playback::{PlaybackSession, RangePlayer, SpeechOutput};
///
/// # async fn example() {
/// # fn make_player() -> Arc<dyn RangePlayer> { unimplemented!() }
/// # fn make_speech() -> Arc<dyn SpeechOutput> { unimplemented!() }
/// let store = Arc::new(SegmentStore::new());
/// let (session, runner) = PlaybackSession::new(
///     store,
///     make_player(),
///     make_speech(),
///     &PlaybackConfig::default(),
/// );
/// tokio::spawn(runner.run());
///
/// session.play_all().await.unwrap();
/// session.stop().await;
/// # }
/// ```
#[derive(Clone)]
pub struct PlaybackSession {
    tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<PlaybackState>,
    store: Arc<SegmentStore>,
    player: Arc<dyn RangePlayer>,
    speech: Arc<dyn SpeechOutput>,
}

impl PlaybackSession {
    /// Create a connected handle/runner pair.
    ///
    /// Spawn [`SessionRunner::run`] as a tokio task; it serves commands until
    /// every handle clone has been dropped.
    pub fn new(
        store: Arc<SegmentStore>,
        player: Arc<dyn RangePlayer>,
        speech: Arc<dyn SpeechOutput>,
        config: &PlaybackConfig,
    ) -> (PlaybackSession, SessionRunner) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(PlaybackState::Idle);

        let session = PlaybackSession {
            tx,
            state_rx,
            store: Arc::clone(&store),
            player: Arc::clone(&player),
            speech: Arc::clone(&speech),
        };
        let runner = SessionRunner {
            rx,
            state_tx,
            store,
            player,
            speech,
            locale: config.locale.clone(),
        };
        (session, runner)
    }

    /// Play every segment in order, beginning at segment 0.
    ///
    /// Tears down whatever is currently playing first.  With no clip loaded
    /// this fails with [`PlaybackError::SourceUnavailable`]; with an empty
    /// segment list it is a silent no-op.
    pub async fn play_all(&self) -> Result<(), PlaybackError> {
        if !self.player.has_source() {
            return Err(PlaybackError::SourceUnavailable);
        }
        if self.store.is_empty() {
            log::debug!("session: play_all with no segments is a no-op");
            return Ok(());
        }
        self.send(SessionCommand::PlayAll).await;
        Ok(())
    }

    /// Play exactly one segment, then return to idle.
    ///
    /// The index is validated against the store before anything is torn
    /// down, so an out-of-range request leaves a running sequence playing.
    pub async fn play_one(&self, index: usize) -> Result<(), PlaybackError> {
        if !self.player.has_source() {
            return Err(PlaybackError::SourceUnavailable);
        }
        let len = self.store.len();
        self.store
            .get(index)
            .map_err(|_| PlaybackError::OutOfRange { index, len })?;
        self.send(SessionCommand::PlayOne(index)).await;
        Ok(())
    }

    /// Abort whatever is playing and settle to [`PlaybackState::Idle`].
    ///
    /// Both devices are silenced here, synchronously, before the command is
    /// even delivered; the runner then finishes the state transition.  A
    /// no-op when nothing is playing.
    pub async fn stop(&self) {
        self.player.abort();
        self.speech.abort();
        self.send(SessionCommand::Stop).await;
    }

    /// Current state of the session.
    pub fn state(&self) -> PlaybackState {
        *self.state_rx.borrow()
    }

    /// Index of the segment being played right now, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.state().current_index()
    }

    /// A watch receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_rx.clone()
    }

    async fn send(&self, cmd: SessionCommand) {
        if self.tx.send(cmd).await.is_err() {
            log::error!("session: runner has shut down, {cmd:?} dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// SessionRunner
// ---------------------------------------------------------------------------

/// The single sequencing task behind a [`PlaybackSession`].
pub struct SessionRunner {
    rx: mpsc::Receiver<SessionCommand>,
    state_tx: watch::Sender<PlaybackState>,
    store: Arc<SegmentStore>,
    player: Arc<dyn RangePlayer>,
    speech: Arc<dyn SpeechOutput>,
    locale: String,
}

/// Which kind of sequence is running.
enum RunMode {
    All,
    One(usize),
}

impl RunMode {
    fn state_at(&self, index: usize) -> PlaybackState {
        match self {
            RunMode::All => PlaybackState::PlayingAll(index),
            RunMode::One(_) => PlaybackState::PlayingOne(index),
        }
    }
}

impl SessionRunner {
    /// Serve commands until every [`PlaybackSession`] clone is dropped.
    ///
    /// Spawn this as a tokio task from `main()`.
    pub async fn run(mut self) {
        while let Some(cmd) = self.rx.recv().await {
            let mut pending = Some(cmd);
            while let Some(cmd) = pending.take() {
                pending = self.handle(cmd).await;
            }
        }
        log::info!("session: command channel closed, runner shutting down");
    }

    /// Handle one command; returns the command that preempted it, if any.
    async fn handle(&mut self, cmd: SessionCommand) -> Option<SessionCommand> {
        match cmd {
            SessionCommand::PlayAll => {
                log::debug!("session: play all");
                self.run_sequence(RunMode::All).await
            }
            SessionCommand::PlayOne(index) => {
                log::debug!("session: play segment {index}");
                self.run_sequence(RunMode::One(index)).await
            }
            SessionCommand::Stop => {
                log::debug!("session: stop → Idle");
                self.publish(PlaybackState::Idle);
                None
            }
        }
    }

    /// Run one sequence to its natural end, an abort, or preemption by the
    /// next command (which is returned for immediate handling).
    async fn run_sequence(&mut self, mode: RunMode) -> Option<SessionCommand> {
        let segments = self.store.snapshot();
        let mut index = match mode {
            RunMode::All => 0,
            RunMode::One(i) => i,
        };
        // Once the channel closes no command can ever arrive again, so the
        // sequence just finishes; `open` keeps us from re-polling it.
        let mut open = true;

        // An index beyond the snapshot (list replaced since validation)
        // falls straight through to Idle.
        while let Some(seg) = segments.get(index) {
            self.publish(mode.state_at(index));
            log::debug!(
                "session: segment {index} ({:.2}s–{:.2}s)",
                seg.start,
                seg.end
            );

            // Clip audio for the segment's time range.
            let outcome = tokio::select! {
                biased;
                cmd = next_command(&mut self.rx, &mut open) => {
                    self.teardown();
                    return Some(cmd);
                }
                res = self.player.play_range(seg.start, seg.end) => match res {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        log::warn!("session: range playback failed mid-run: {e}");
                        PlayOutcome::Aborted
                    }
                },
            };
            if outcome == PlayOutcome::Aborted {
                break;
            }

            // Spoken translation, strictly after the range has resolved.
            let outcome = tokio::select! {
                biased;
                cmd = next_command(&mut self.rx, &mut open) => {
                    self.teardown();
                    return Some(cmd);
                }
                outcome = self.speech.speak(&seg.translation, &self.locale) => outcome,
            };
            if outcome == PlayOutcome::Aborted {
                break;
            }

            match mode {
                RunMode::All => index += 1,
                RunMode::One(_) => break,
            }
        }

        self.publish(PlaybackState::Idle);
        None
    }

    /// Abort both devices before a preempting command takes over.
    fn teardown(&self) {
        self.player.abort();
        self.speech.abort();
    }

    fn publish(&self, state: PlaybackState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }
}

/// Wait for the next queued command.
///
/// Once the channel closes this pends forever instead of yielding `None` in
/// a loop, so a running sequence is driven to completion by the device
/// branches of the select.
async fn next_command(
    rx: &mut mpsc::Receiver<SessionCommand>,
    open: &mut bool,
) -> SessionCommand {
    if *open {
        match rx.recv().await {
            Some(cmd) => return cmd,
            None => *open = false,
        }
    }
    std::future::pending().await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::Segment;
    use crate::playback::device::{
        new_call_log, CallLog, DeviceCall, MockBehavior, MockRangePlayer, MockSpeechOutput,
    };
    use std::time::Duration;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn seg(index: usize, start: f64, end: f64, original: &str, translation: &str) -> Segment {
        Segment {
            index,
            start,
            end,
            original: original.to_string(),
            translation: translation.to_string(),
        }
    }

    /// The canonical two-segment lesson used throughout these tests.
    fn hello_world() -> Vec<Segment> {
        vec![
            seg(0, 0.0, 2.0, "Hola", "Hello"),
            seg(1, 2.0, 4.0, "Mundo", "World"),
        ]
    }

    fn make_session(
        segments: Vec<Segment>,
        player_behavior: MockBehavior,
        speech_behavior: MockBehavior,
    ) -> (PlaybackSession, SessionRunner, CallLog) {
        let log = new_call_log();
        let store = Arc::new(SegmentStore::new());
        if !segments.is_empty() {
            store.replace(segments).unwrap();
        }
        let player: Arc<dyn RangePlayer> =
            Arc::new(MockRangePlayer::new(Arc::clone(&log), player_behavior));
        let speech: Arc<dyn SpeechOutput> =
            Arc::new(MockSpeechOutput::new(Arc::clone(&log), speech_behavior));
        let (session, runner) =
            PlaybackSession::new(store, player, speech, &PlaybackConfig::default());
        (session, runner, log)
    }

    /// Only the calls that produce output — abort bookkeeping filtered out.
    fn ranges_and_speaks(log: &CallLog) -> Vec<DeviceCall> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, DeviceCall::PlayRange { .. } | DeviceCall::Speak { .. }))
            .cloned()
            .collect()
    }

    fn range(start: f64, end: f64) -> DeviceCall {
        DeviceCall::PlayRange { start, end }
    }

    fn speak(text: &str) -> DeviceCall {
        DeviceCall::Speak {
            text: text.to_string(),
            locale: "en-US".to_string(),
        }
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

    // -----------------------------------------------------------------------
    // Full runs (command sent, handle dropped, runner driven to completion)
    // -----------------------------------------------------------------------

    /// An uninterrupted play-all visits every segment in order, alternating
    /// range playback and spoken translation, and ends idle.
    #[tokio::test]
    async fn play_all_visits_every_segment_in_order() {
        let (session, runner, log) =
            make_session(hello_world(), MockBehavior::Complete, MockBehavior::Complete);
        let state_rx = session.subscribe();

        session.play_all().await.unwrap();
        drop(session);
        runner.run().await;

        assert_eq!(
            ranges_and_speaks(&log),
            vec![range(0.0, 2.0), speak("Hello"), range(2.0, 4.0), speak("World")]
        );
        assert_eq!(*state_rx.borrow(), PlaybackState::Idle);
    }

    /// An uninterrupted run never needs to abort anything.
    #[tokio::test]
    async fn uninterrupted_run_issues_no_aborts() {
        let (session, runner, log) =
            make_session(hello_world(), MockBehavior::Complete, MockBehavior::Complete);

        session.play_all().await.unwrap();
        drop(session);
        runner.run().await;

        assert!(!log
            .lock()
            .unwrap()
            .iter()
            .any(|c| matches!(c, DeviceCall::AbortRange | DeviceCall::AbortSpeech)));
    }

    #[tokio::test]
    async fn play_one_plays_exactly_one_segment_then_goes_idle() {
        let (session, runner, log) =
            make_session(hello_world(), MockBehavior::Complete, MockBehavior::Complete);
        let state_rx = session.subscribe();

        session.play_one(1).await.unwrap();
        drop(session);
        runner.run().await;

        assert_eq!(
            ranges_and_speaks(&log),
            vec![range(2.0, 4.0), speak("World")]
        );
        assert_eq!(*state_rx.borrow(), PlaybackState::Idle);
    }

    #[tokio::test]
    async fn translations_are_spoken_with_the_configured_locale() {
        let log = new_call_log();
        let store = Arc::new(SegmentStore::new());
        store.replace(hello_world()).unwrap();
        let player: Arc<dyn RangePlayer> =
            Arc::new(MockRangePlayer::new(Arc::clone(&log), MockBehavior::Complete));
        let speech: Arc<dyn SpeechOutput> =
            Arc::new(MockSpeechOutput::new(Arc::clone(&log), MockBehavior::Complete));
        let config = PlaybackConfig {
            locale: "th-TH".to_string(),
            ..PlaybackConfig::default()
        };
        let (session, runner) = PlaybackSession::new(store, player, speech, &config);

        session.play_one(0).await.unwrap();
        drop(session);
        runner.run().await;

        assert_eq!(
            ranges_and_speaks(&log),
            vec![
                range(0.0, 2.0),
                DeviceCall::Speak {
                    text: "Hello".to_string(),
                    locale: "th-TH".to_string(),
                }
            ]
        );
    }

    // -----------------------------------------------------------------------
    // Validation (nothing issued, nothing torn down)
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn play_all_on_empty_store_is_a_silent_noop() {
        let (session, runner, log) =
            make_session(Vec::new(), MockBehavior::Complete, MockBehavior::Complete);
        let state_rx = session.subscribe();

        assert_eq!(session.play_all().await, Ok(()));
        drop(session);
        runner.run().await;

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(*state_rx.borrow(), PlaybackState::Idle);
    }

    #[tokio::test]
    async fn play_without_a_clip_fails_with_source_unavailable() {
        let log = new_call_log();
        let store = Arc::new(SegmentStore::new());
        store.replace(hello_world()).unwrap();
        let player: Arc<dyn RangePlayer> =
            Arc::new(MockRangePlayer::without_source(Arc::clone(&log)));
        let speech: Arc<dyn SpeechOutput> =
            Arc::new(MockSpeechOutput::new(Arc::clone(&log), MockBehavior::Complete));
        let (session, _runner) =
            PlaybackSession::new(store, player, speech, &PlaybackConfig::default());

        assert_eq!(
            session.play_all().await,
            Err(PlaybackError::SourceUnavailable)
        );
        assert_eq!(
            session.play_one(0).await,
            Err(PlaybackError::SourceUnavailable)
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn play_one_out_of_range_fails_without_device_calls() {
        let (session, runner, log) =
            make_session(hello_world(), MockBehavior::Complete, MockBehavior::Complete);
        let state_rx = session.subscribe();

        assert_eq!(
            session.play_one(5).await,
            Err(PlaybackError::OutOfRange { index: 5, len: 2 })
        );
        drop(session);
        runner.run().await;

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(*state_rx.borrow(), PlaybackState::Idle);
    }

    /// A failed play_one must leave the sequence it would have replaced
    /// running exactly as before.
    #[tokio::test]
    async fn play_one_out_of_range_leaves_active_run_untouched() {
        let (session, runner, log) = make_session(
            hello_world(),
            MockBehavior::HoldUntilAbort,
            MockBehavior::Complete,
        );
        tokio::spawn(runner.run());

        session.play_all().await.unwrap();
        {
            let log = Arc::clone(&log);
            wait_until(move || log.lock().unwrap().len() == 1).await;
        }

        assert_eq!(
            session.play_one(99).await,
            Err(PlaybackError::OutOfRange { index: 99, len: 2 })
        );
        assert_eq!(session.state(), PlaybackState::PlayingAll(0));
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(log.lock().unwrap().as_slice(), &[range(0.0, 2.0)]);

        session.stop().await;
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Stopping while the translation is being spoken aborts it and issues
    /// nothing further — the second segment's range is never played.
    #[tokio::test]
    async fn stop_during_speech_aborts_and_issues_no_further_calls() {
        let (session, runner, log) = make_session(
            hello_world(),
            MockBehavior::Complete,
            MockBehavior::HoldUntilAbort,
        );
        tokio::spawn(runner.run());

        session.play_all().await.unwrap();
        {
            let log = Arc::clone(&log);
            wait_until(move || {
                log.lock()
                    .unwrap()
                    .iter()
                    .any(|c| matches!(c, DeviceCall::Speak { .. }))
            })
            .await;
        }

        session.stop().await;
        {
            let session = session.clone();
            wait_until(move || session.state() == PlaybackState::Idle).await;
        }

        assert_eq!(
            ranges_and_speaks(&log),
            vec![range(0.0, 2.0), speak("Hello")]
        );
        assert!(log
            .lock()
            .unwrap()
            .iter()
            .any(|c| matches!(c, DeviceCall::AbortSpeech)));
    }

    #[tokio::test]
    async fn stop_during_range_playback_goes_idle_without_speaking() {
        let (session, runner, log) = make_session(
            hello_world(),
            MockBehavior::HoldUntilAbort,
            MockBehavior::Complete,
        );
        tokio::spawn(runner.run());

        session.play_all().await.unwrap();
        {
            let log = Arc::clone(&log);
            wait_until(move || log.lock().unwrap().len() == 1).await;
        }

        session.stop().await;
        {
            let session = session.clone();
            wait_until(move || session.state() == PlaybackState::Idle).await;
        }

        assert_eq!(ranges_and_speaks(&log), vec![range(0.0, 2.0)]);
    }

    #[tokio::test]
    async fn stop_when_idle_is_a_noop() {
        let (session, runner, log) =
            make_session(hello_world(), MockBehavior::Complete, MockBehavior::Complete);
        let state_rx = session.subscribe();

        session.stop().await;
        drop(session);
        runner.run().await;

        assert!(ranges_and_speaks(&log).is_empty());
        assert_eq!(*state_rx.borrow(), PlaybackState::Idle);
    }

    // -----------------------------------------------------------------------
    // Preemption
    // -----------------------------------------------------------------------

    /// play_all during an active run aborts the in-flight range before the
    /// restarted sequence issues its first one.
    #[tokio::test]
    async fn play_all_while_playing_aborts_then_restarts_from_the_top() {
        let (session, runner, log) = make_session(
            hello_world(),
            MockBehavior::HoldUntilAbort,
            MockBehavior::Complete,
        );
        tokio::spawn(runner.run());

        session.play_all().await.unwrap();
        {
            let log = Arc::clone(&log);
            wait_until(move || log.lock().unwrap().len() == 1).await;
        }

        session.play_all().await.unwrap();
        {
            let log = Arc::clone(&log);
            wait_until(move || {
                log.lock()
                    .unwrap()
                    .iter()
                    .filter(|c| matches!(c, DeviceCall::PlayRange { .. }))
                    .count()
                    == 2
            })
            .await;
        }

        let entries = log.lock().unwrap().clone();
        let abort_pos = entries
            .iter()
            .position(|c| *c == DeviceCall::AbortRange)
            .expect("the first range must be aborted");
        let second_range_pos = entries
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, DeviceCall::PlayRange { .. }))
            .map(|(i, _)| i)
            .nth(1)
            .expect("the restarted sequence must issue a range");
        assert!(abort_pos < second_range_pos);
        assert_eq!(entries[second_range_pos], range(0.0, 2.0));
        assert_eq!(session.state(), PlaybackState::PlayingAll(0));

        session.stop().await;
    }

    #[tokio::test]
    async fn play_one_preempts_play_all() {
        let (session, runner, log) = make_session(
            hello_world(),
            MockBehavior::HoldUntilAbort,
            MockBehavior::Complete,
        );
        tokio::spawn(runner.run());

        session.play_all().await.unwrap();
        {
            let log = Arc::clone(&log);
            wait_until(move || log.lock().unwrap().len() == 1).await;
        }

        session.play_one(1).await.unwrap();
        {
            let session = session.clone();
            wait_until(move || session.state() == PlaybackState::PlayingOne(1)).await;
        }

        let ranges: Vec<DeviceCall> = log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, DeviceCall::PlayRange { .. }))
            .cloned()
            .collect();
        assert_eq!(ranges, vec![range(0.0, 2.0), range(2.0, 4.0)]);

        session.stop().await;
    }

    // -----------------------------------------------------------------------
    // State observation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn watch_subscribers_observe_playing_and_idle() {
        let (session, runner, _log) = make_session(
            hello_world(),
            MockBehavior::HoldUntilAbort,
            MockBehavior::Complete,
        );
        tokio::spawn(runner.run());
        let mut state_rx = session.subscribe();

        session.play_all().await.unwrap();
        let observed = *state_rx
            .wait_for(|s| *s == PlaybackState::PlayingAll(0))
            .await
            .unwrap();
        assert!(observed.is_active());

        session.stop().await;
        state_rx
            .wait_for(|s| *s == PlaybackState::Idle)
            .await
            .unwrap();
        assert_eq!(session.current_index(), None);
    }
}

//! Application entry point — Listen Lesson.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Open the two cpal output streams (clip + speech).  cpal streams are
//!    not `Send`, so they live on the main thread for the whole run.
//! 4. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 5. Build the subsystems (player, synthesizer, speaker, transcriber) and
//!    spawn the session runner onto the runtime.
//! 6. Spawn the stdin reader thread.
//! 7. Run the command loop under `rt.block_on` — blocks the main thread
//!    until `quit` or end of input.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use listen_lesson::{
    app::LessonApp,
    audio::{AudioOutput, AudioSink},
    config::AppConfig,
    lesson::SegmentStore,
    playback::{ClipRangePlayer, PlaybackError, PlaybackSession, RangePlayer, SpeechOutput},
    speech::{ApiSynthesizer, SpeakerOutput, SpeechSynthesizer},
    transcribe::{ApiTranscriber, Transcriber},
};

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Listen Lesson starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Audio output — one stream for clip ranges, one for speech, so an
    //    aborted clip window can never clatter into a starting utterance.
    let device = config.audio.output_device.as_deref();
    let clip_output = AudioOutput::new(device).context("failed to open clip output stream")?;
    let speech_output = AudioOutput::new(device).context("failed to open speech output stream")?;
    let _clip_stream = clip_output.start().context("failed to start clip output")?;
    let _speech_stream = speech_output
        .start()
        .context("failed to start speech output")?;
    log::info!("Audio output ready ({} Hz)", clip_output.sample_rate());

    // 4. Tokio runtime (2 worker threads — sequencing + HTTP each take one)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 5. Subsystems
    let store = Arc::new(SegmentStore::new());
    let player = Arc::new(ClipRangePlayer::new(
        Arc::new(clip_output.controller()),
        &config.playback,
    ));
    let synth: Arc<dyn SpeechSynthesizer> = Arc::new(ApiSynthesizer::from_config(&config.speech));
    let speaker: Arc<dyn SpeechOutput> = Arc::new(SpeakerOutput::new(
        synth,
        Arc::new(speech_output.controller()) as Arc<dyn AudioSink>,
        &config.playback,
    ));
    let transcriber: Arc<dyn Transcriber> =
        Arc::new(ApiTranscriber::from_config(&config.transcriber));

    let (session, runner) = PlaybackSession::new(
        Arc::clone(&store),
        Arc::clone(&player) as Arc<dyn RangePlayer>,
        speaker,
        &config.playback,
    );
    rt.spawn(runner.run());

    // Progress printer — announce each segment as the session reaches it.
    {
        let mut state_rx = session.subscribe();
        let store = Arc::clone(&store);
        rt.spawn(async move {
            while state_rx.changed().await.is_ok() {
                let state = *state_rx.borrow_and_update();
                if let Some(index) = state.current_index() {
                    println!("  ▶ segment {}/{}", index + 1, store.len());
                }
            }
        });
    }

    let mut app = LessonApp::new(store, session, player, transcriber);

    // 6. stdin reader thread — forwards lines into the async command loop.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(16);
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                match line {
                    // blocking_send is safe to call from non-async threads.
                    Ok(line) => {
                        if line_tx.blocking_send(line).is_err() {
                            break; // command loop is gone
                        }
                    }
                    Err(e) => {
                        log::error!("stdin-reader: {e}");
                        break;
                    }
                }
            }
        })
        .expect("failed to spawn stdin-reader thread");

    // 7. Command loop
    rt.block_on(async move {
        // An optional clip path on the command line is loaded up front.
        if let Some(path) = std::env::args().nth(1) {
            if let Err(e) = app.load_clip(Path::new(&path)).await {
                eprintln!("error: {e:#}");
            } else {
                announce_clip(&app);
            }
        }

        println!("listen-lesson — type `help` for commands");
        while let Some(line) = line_rx.recv().await {
            if !dispatch(&mut app, line.trim()).await {
                break;
            }
        }

        // stdin closed or `quit` — silence everything before the streams
        // drop with the process.
        app.session().stop().await;
    });

    log::info!("Listen Lesson shut down");
    Ok(())
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Handle one input line.  Returns `false` when the loop should exit.
async fn dispatch(app: &mut LessonApp, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return true; // blank line
    };
    let arg = parts.next();

    match cmd {
        "load" => match arg {
            Some(path) => match app.load_clip(Path::new(path)).await {
                Ok(()) => announce_clip(app),
                Err(e) => eprintln!("error: {e:#}"),
            },
            None => eprintln!("usage: load <path>"),
        },

        "transcribe" => match app.transcribe().await {
            Ok(count) => {
                let speech_secs: f64 = app.segments().iter().map(|s| s.duration_secs()).sum();
                println!("lesson ready: {count} segments, {speech_secs:.1}s of speech (try `list` or `all`)");
            }
            Err(e) => eprintln!("error: {e:#}"),
        },

        "list" => list_segments(app),

        "status" => {
            let state = app.session().state();
            match state.current_index() {
                Some(index) => println!(
                    "{} — segment {}/{}",
                    state.label(),
                    index + 1,
                    app.segments().len()
                ),
                None => println!("{}", state.label()),
            }
        }

        "all" => {
            if let Err(e) = app.session().play_all().await {
                report_playback_error(e);
            }
        }

        "one" => {
            // Displayed numbering is 1-based; the session speaks 0-based.
            let number = arg.and_then(|a| a.parse::<usize>().ok());
            match number.and_then(|n| n.checked_sub(1)) {
                Some(index) => {
                    if let Err(e) = app.session().play_one(index).await {
                        report_playback_error(e);
                    }
                }
                None => eprintln!("usage: one <segment number, starting at 1>"),
            }
        }

        "stop" => app.session().stop().await,

        "clear" => {
            app.clear_clip().await;
            println!("cleared");
        }

        "help" => print_help(),

        "quit" | "exit" => return false,

        other => eprintln!("unknown command `{other}` — type `help`"),
    }

    true
}

fn announce_clip(app: &LessonApp) {
    let name = app.clip_name().unwrap_or("clip");
    if app.clip_is_playable() {
        println!("loaded {name} — `transcribe` to build the lesson");
    } else {
        println!("loaded {name} — not playable locally (WAV only), but it can be transcribed");
    }
}

fn list_segments(app: &LessonApp) {
    let segments = app.segments();
    if segments.is_empty() {
        println!("no lesson yet — `load <path>` then `transcribe`");
        return;
    }
    for seg in segments.iter() {
        println!(
            "{:>3}. [{:>6.2}s – {:>6.2}s] {}",
            seg.index + 1,
            seg.start,
            seg.end,
            seg.original
        );
        println!("     {}", seg.translation);
    }
}

fn report_playback_error(e: PlaybackError) {
    match e {
        PlaybackError::OutOfRange { index, len } => {
            eprintln!("no segment {}; the lesson has {len} segments", index + 1)
        }
        PlaybackError::SourceUnavailable => {
            eprintln!("no playable clip loaded — `load` a WAV first")
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  load <path>   load an audio clip (WAV plays locally)");
    println!("  transcribe    send the clip to the transcription service");
    println!("  list          show the lesson's segments");
    println!("  all           play the whole lesson: each segment, then its translation");
    println!("  one <n>       play segment n only");
    println!("  status        show what is playing");
    println!("  stop          stop playback");
    println!("  clear         drop the clip and its lesson");
    println!("  quit          exit");
}

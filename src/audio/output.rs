//! Speaker playout via `cpal`.
//!
//! [`AudioOutput`] wraps the cpal host/device/stream lifecycle.  Call
//! [`AudioOutput::start`] to open the hardware stream; the returned
//! [`StreamHandle`] is a RAII guard — dropping it stops the stream.
//!
//! The stream callback pulls mono `f32` frames from a shared
//! [`PlayoutWindow`]: a bounded `[cursor, end)` view over an `Arc`'d frame
//! buffer.  When the cursor reaches the window end the callback pauses
//! itself (writes silence and clears the playing flag), so by the time a
//! monitor observes "not playing" the hardware is already silent.
//!
//! `cpal::Stream` is not `Send` on every platform, so the stream itself
//! stays on the thread that created it (normally `main`).  Everything that
//! needs to drive playout from async tasks goes through an
//! [`OutputController`], a cheap clonable handle implementing [`AudioSink`].

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Errors from the audio output subsystem: device setup, stream lifecycle,
/// and clip decoding.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported output sample format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// AudioSink trait
// ---------------------------------------------------------------------------

/// Non-blocking control surface over one playout path.
///
/// Implementations must be `Send + Sync` so they can be held behind an
/// `Arc<dyn AudioSink>` by the playback devices.  All methods return
/// immediately; completion is observed by polling [`is_playing`].
///
/// # Contract
///
/// - [`begin`] replaces whatever was playing with `frames[start..end)`
///   (mono `f32` at [`sample_rate`]).  A degenerate window
///   (`start >= end`) is an immediate no-op: the sink reports not playing.
/// - [`stop`] silences the sink; the next callback buffer is already quiet.
/// - [`is_playing`] flips to `false` on its own once the window is
///   exhausted.
///
/// [`begin`]: AudioSink::begin
/// [`stop`]: AudioSink::stop
/// [`is_playing`]: AudioSink::is_playing
/// [`sample_rate`]: AudioSink::sample_rate
pub trait AudioSink: Send + Sync {
    /// Native sample rate of the sink in Hz.
    fn sample_rate(&self) -> u32;

    /// Start emitting `frames[start..end)`, replacing any current window.
    fn begin(&self, frames: Arc<Vec<f32>>, start: usize, end: usize);

    /// Silence the sink immediately.
    fn stop(&self);

    /// `true` while window frames are still being emitted.
    fn is_playing(&self) -> bool;
}

// Compile-time assertion: Box<dyn AudioSink> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioSink>) {}
};

// ---------------------------------------------------------------------------
// PlayoutWindow
// ---------------------------------------------------------------------------

/// The shared playout state read by the cpal callback on every buffer.
#[derive(Default)]
struct PlayoutWindow {
    /// Mono frames at the device rate.  `Arc` so callers can swap windows
    /// without copying audio data.
    frames: Arc<Vec<f32>>,
    /// Next frame to emit.
    cursor: usize,
    /// One past the last frame to emit.
    end: usize,
    /// Cleared by the callback itself once `cursor` reaches `end`.
    playing: bool,
}

impl PlayoutWindow {
    /// Next sample for the callback, advancing the cursor.  Pauses the
    /// window in place when it is exhausted.
    fn next_sample(&mut self) -> f32 {
        if !self.playing {
            return 0.0;
        }
        if self.cursor >= self.end {
            self.playing = false;
            return 0.0;
        }
        let sample = self.frames[self.cursor];
        self.cursor += 1;
        if self.cursor >= self.end {
            self.playing = false;
        }
        sample
    }
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Dropping this value calls `cpal::Stream::drop` which stops the underlying
/// hardware stream.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// AudioOutput
// ---------------------------------------------------------------------------

/// Speaker output device wrapper built on top of `cpal`.
///
/// # Example
///
/// ```rust,no_run
/// use listen_lesson::audio::AudioOutput;
///
/// let output = AudioOutput::new(None).unwrap();
/// let _handle = output.start().unwrap();
/// let sink = output.controller();
/// // `_handle` keeps the stream alive; `sink` drives playout from anywhere.
/// ```
pub struct AudioOutput {
    device: cpal::Device,
    config: cpal::StreamConfig,
    /// Native sample rate reported by the device (Hz).
    sample_rate: u32,
    /// Number of interleaved channels the device expects.
    channels: u16,
    window: Arc<Mutex<PlayoutWindow>>,
}

impl AudioOutput {
    /// Create a new [`AudioOutput`] on the named device, or the system
    /// default when `device_name` is `None`.
    ///
    /// A configured name that matches nothing falls back to the default
    /// device with a warning, so a stale config entry never blocks startup.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::NoDevice`] when no output device is available,
    /// [`AudioError::DefaultConfig`] when the device cannot report a default
    /// stream configuration, or [`AudioError::UnsupportedFormat`] when the
    /// device does not take `f32` samples.
    pub fn new(device_name: Option<&str>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(name) => find_output_device(&host, name)?,
            None => host.default_output_device().ok_or(AudioError::NoDevice)?,
        };

        let supported = device.default_output_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
            window: Arc::new(Mutex::new(PlayoutWindow::default())),
        })
    }

    /// Open the hardware stream and begin pulling from the playout window.
    ///
    /// The cpal callback runs on a dedicated audio thread; each mono window
    /// frame is fanned out to every device channel.  When no window is
    /// active the callback writes silence.  Lock failures are answered with
    /// silence so the audio thread never panics.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::BuildStream`] or [`AudioError::PlayStream`] if
    /// the platform rejects the stream configuration.
    pub fn start(&self) -> Result<StreamHandle, AudioError> {
        let window = Arc::clone(&self.window);
        let channels = self.channels as usize;

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut win = match window.lock() {
                    Ok(win) => win,
                    Err(_) => {
                        data.fill(0.0);
                        return;
                    }
                };
                for frame in data.chunks_mut(channels) {
                    let sample = win.next_sample();
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                }
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None, // no timeout
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    /// A clonable [`AudioSink`] handle over this output's playout window.
    ///
    /// The controller is `Send + Sync` and safe to move into async tasks;
    /// the non-`Send` stream stays wherever [`start`](Self::start) was
    /// called.
    pub fn controller(&self) -> OutputController {
        OutputController {
            window: Arc::clone(&self.window),
            sample_rate: self.sample_rate,
        }
    }

    /// Native sample rate of the output stream in Hz.
    ///
    /// Clips and utterances must be resampled to this rate before `begin`;
    /// see [`crate::audio::resample_linear`].
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Resolve a named output device, falling back to the default.
fn find_output_device(host: &cpal::Host, name: &str) -> Result<cpal::Device, AudioError> {
    if let Ok(mut devices) = host.output_devices() {
        if let Some(device) = devices.find(|d| d.name().map(|n| n == name).unwrap_or(false)) {
            return Ok(device);
        }
    }
    log::warn!("audio: output device '{name}' not found, using default");
    host.default_output_device().ok_or(AudioError::NoDevice)
}

// ---------------------------------------------------------------------------
// OutputController
// ---------------------------------------------------------------------------

/// Cheap clonable handle that drives an [`AudioOutput`]'s playout window.
#[derive(Clone)]
pub struct OutputController {
    window: Arc<Mutex<PlayoutWindow>>,
    sample_rate: u32,
}

impl AudioSink for OutputController {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn begin(&self, frames: Arc<Vec<f32>>, start: usize, end: usize) {
        let end = end.min(frames.len());
        let start = start.min(end);

        let mut win = self.window.lock().unwrap();
        win.frames = frames;
        win.cursor = start;
        win.end = end;
        win.playing = start < end;
    }

    fn stop(&self) {
        self.window.lock().unwrap().playing = false;
    }

    fn is_playing(&self) -> bool {
        self.window.lock().unwrap().playing
    }
}

// ---------------------------------------------------------------------------
// TestSink  (test-only)
// ---------------------------------------------------------------------------

/// A deterministic [`AudioSink`] stand-in for device tests.
///
/// Two behaviours:
/// * [`TestSink::completing`] — every `begin` finishes instantly, so
///   monitors observe completion on their first poll.
/// * [`TestSink::holding`] — playback stays active until [`finish`] or
///   `stop` is called, for abort-path tests.
///
/// [`finish`]: TestSink::finish
#[cfg(test)]
pub struct TestSink {
    state: Mutex<TestSinkState>,
    hold: bool,
    rate: u32,
}

#[cfg(test)]
#[derive(Default)]
struct TestSinkState {
    /// `(frames.len(), start, end)` for every `begin` call, in order.
    begins: Vec<(usize, usize, usize)>,
    stops: usize,
    playing: bool,
}

#[cfg(test)]
impl TestSink {
    /// A sink whose windows complete instantly.
    pub fn completing(rate: u32) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TestSinkState::default()),
            hold: false,
            rate,
        })
    }

    /// A sink whose windows play until `finish()` or `stop()`.
    pub fn holding(rate: u32) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TestSinkState::default()),
            hold: true,
            rate,
        })
    }

    /// Simulate the window draining to its end.
    pub fn finish(&self) {
        let mut st = self.state.lock().unwrap();
        st.playing = false;
    }

    /// All `begin` calls so far as `(frames.len(), start, end)`.
    pub fn begins(&self) -> Vec<(usize, usize, usize)> {
        self.state.lock().unwrap().begins.clone()
    }

    /// Number of `stop` calls so far.
    pub fn stops(&self) -> usize {
        self.state.lock().unwrap().stops
    }
}

#[cfg(test)]
impl AudioSink for TestSink {
    fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn begin(&self, frames: Arc<Vec<f32>>, start: usize, end: usize) {
        let mut st = self.state.lock().unwrap();
        st.begins.push((frames.len(), start, end));
        st.playing = self.hold && start < end;
    }

    fn stop(&self) {
        let mut st = self.state.lock().unwrap();
        st.stops += 1;
        st.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Alarm player implementation using rodio.
//!
//! The rodio output stream is not `Send` on every platform, so it lives on a
//! dedicated audio thread. `RodioAlarmPlayer` is the handle to that thread:
//! it forwards start/stop/shutdown commands over a channel and can be shared
//! freely between tasks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use rodio::source::SineWave;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::{SoundSource, TONE_BEEP_MS, TONE_FREQUENCY_HZ, TONE_GAP_MS};

/// Tone volume relative to full scale.
const TONE_AMPLITUDE: f32 = 0.2;

/// Commands understood by the audio thread.
#[derive(Debug)]
enum AudioCommand {
    Start(SoundSource),
    Stop,
    Shutdown,
}

/// A looping alarm backed by rodio.
pub struct RodioAlarmPlayer {
    /// Command channel to the audio thread.
    commands: Sender<AudioCommand>,
    /// Set by the audio thread while a sink is playing.
    playing: Arc<AtomicBool>,
    /// Set once `release` has run.
    released: AtomicBool,
    /// What to play on `start`.
    source: SoundSource,
    /// Audio thread, joined on release.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RodioAlarmPlayer {
    /// Opens the default audio output and spawns the audio thread.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(source: SoundSource) -> Result<Self, SoundError> {
        let (commands, receiver) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let playing = Arc::new(AtomicBool::new(false));
        let thread_playing = Arc::clone(&playing);

        let worker = thread::Builder::new()
            .name("alarm-audio".to_string())
            .spawn(move || audio_thread(receiver, ready_tx, thread_playing))
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(SoundError::DeviceNotAvailable(
                    "audio thread exited during startup".to_string(),
                ));
            }
        }

        debug!("Audio output stream initialized");

        Ok(Self {
            commands,
            playing,
            released: AtomicBool::new(false),
            source,
            worker: Mutex::new(Some(worker)),
        })
    }

    fn send(&self, command: AudioCommand) -> Result<(), SoundError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(SoundError::Released);
        }
        self.commands.send(command).map_err(|_| SoundError::Released)
    }

    /// Starts the looping alarm. Restarts it if it is already playing.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::Released` once the player has been released.
    /// Decode and device errors are logged by the audio thread.
    pub fn start(&self) -> Result<(), SoundError> {
        self.send(AudioCommand::Start(self.source.clone()))
    }

    /// Stops the alarm if it is playing.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::Released` once the player has been released.
    pub fn stop(&self) -> Result<(), SoundError> {
        self.send(AudioCommand::Stop)
    }

    /// Stops playback, shuts the audio thread down and waits for it.
    ///
    /// Idempotent.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.commands.send(AudioCommand::Shutdown);
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                warn!("Audio thread panicked during shutdown");
            }
        }
        debug!("Alarm player released");
    }

    /// Returns true while the alarm is sounding.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        !self.released.load(Ordering::SeqCst) && self.playing.load(Ordering::SeqCst)
    }
}

impl Drop for RodioAlarmPlayer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for RodioAlarmPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioAlarmPlayer")
            .field("source", &self.source)
            .field("playing", &self.playing.load(Ordering::Relaxed))
            .field("released", &self.released.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Audio thread
// ============================================================================

fn audio_thread(
    commands: Receiver<AudioCommand>,
    ready: Sender<Result<(), SoundError>>,
    playing: Arc<AtomicBool>,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => {
            let _ = ready.send(Ok(()));
            pair
        }
        Err(e) => {
            let _ = ready.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };

    let mut sink: Option<Sink> = None;

    for command in commands.iter() {
        match command {
            AudioCommand::Start(source) => {
                if let Some(previous) = sink.take() {
                    previous.stop();
                }
                match open_sink(&handle, &source) {
                    Ok(new_sink) => {
                        debug!("Alarm playing: {}", source.name());
                        sink = Some(new_sink);
                        playing.store(true, Ordering::SeqCst);
                    }
                    Err(e) => {
                        warn!("Failed to play alarm '{}': {}", source.name(), e);
                        playing.store(false, Ordering::SeqCst);
                    }
                }
            }
            AudioCommand::Stop => {
                if let Some(current) = sink.take() {
                    current.stop();
                    debug!("Alarm stopped");
                }
                playing.store(false, Ordering::SeqCst);
            }
            AudioCommand::Shutdown => break,
        }
    }

    if let Some(current) = sink.take() {
        current.stop();
    }
    playing.store(false, Ordering::SeqCst);
    debug!("Audio thread finished");
}

/// Builds a sink playing `source` on a loop.
///
/// A file that cannot be opened or decoded falls back to the built-in tone.
fn open_sink(handle: &OutputStreamHandle, source: &SoundSource) -> Result<Sink, SoundError> {
    let sink = Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))?;

    match source {
        SoundSource::File { path } => match decode_file(path) {
            Ok(decoder) => sink.append(decoder.repeat_infinite()),
            Err(e) if e.should_fallback_to_tone() => {
                warn!("{}, falling back to built-in tone", e);
                sink.append(alarm_tone());
            }
            Err(e) => return Err(e),
        },
        SoundSource::Tone => sink.append(alarm_tone()),
    }

    Ok(sink)
}

fn decode_file(path: &Path) -> Result<Decoder<BufReader<File>>, SoundError> {
    let file = File::open(path)
        .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    Decoder::new(BufReader::new(file)).map_err(|e| SoundError::DecodeError(e.to_string()))
}

/// Endless beep pattern: a short gap, then a beep, repeated.
fn alarm_tone() -> impl Source<Item = f32> + Send + 'static {
    SineWave::new(TONE_FREQUENCY_HZ)
        .take_duration(Duration::from_millis(TONE_BEEP_MS))
        .amplify(TONE_AMPLITUDE)
        .delay(Duration::from_millis(TONE_GAP_MS))
        .repeat_infinite()
}

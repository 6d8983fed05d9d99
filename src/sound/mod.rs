//! Alarm playback for the focus timer.
//!
//! This module provides the completion alarm, including:
//!
//! - A looping alarm that plays until dismissed
//! - A built-in beep tone, or any audio file rodio can decode
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   start / stop / release   ┌──────────────────┐
//! │   TimerManager   │ ─────────────────────────▶ │   AlarmPlayer    │
//! └──────────────────┘                            └────────┬─────────┘
//!                                                          │ channel
//!                                                          ▼
//!                                                 ┌──────────────────┐
//!                                                 │   audio thread   │
//!                                                 │ (rodio stream)   │
//!                                                 └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use digital_assistant::sound::{RodioAlarmPlayer, SoundSource};
//!
//! let player = RodioAlarmPlayer::new(SoundSource::Tone).expect("audio init");
//! player.start().expect("alarm");
//! player.stop().expect("alarm");
//! player.release();
//! ```

mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

pub use error::SoundError;
pub use player::RodioAlarmPlayer;
pub use source::{SoundSource, TONE_BEEP_MS, TONE_FREQUENCY_HZ, TONE_GAP_MS};

use crate::types::TimerConfig;

/// Trait for the alarm raised when a countdown completes.
///
/// Implementations must be cheap to call from the tick task; long work
/// belongs on a separate thread.
pub trait AlarmPlayer: Send + Sync {
    /// Starts the alarm, looping until stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if playback cannot be started.
    fn start(&self) -> Result<(), SoundError>;

    /// Stops the alarm if it is sounding.
    ///
    /// # Errors
    ///
    /// Returns an error if the player can no longer be controlled.
    fn stop(&self) -> Result<(), SoundError>;

    /// Releases the underlying audio resource. Further calls fail.
    fn release(&self);

    /// Returns true while the alarm is sounding.
    fn is_playing(&self) -> bool;
}

impl AlarmPlayer for RodioAlarmPlayer {
    fn start(&self) -> Result<(), SoundError> {
        RodioAlarmPlayer::start(self)
    }

    fn stop(&self) -> Result<(), SoundError> {
        RodioAlarmPlayer::stop(self)
    }

    fn release(&self) {
        RodioAlarmPlayer::release(self)
    }

    fn is_playing(&self) -> bool {
        RodioAlarmPlayer::is_playing(self)
    }
}

/// Mock alarm player for testing.
#[derive(Debug, Default)]
pub struct MockAlarmPlayer {
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    playing: AtomicBool,
    released: AtomicBool,
    should_fail: AtomicBool,
}

impl MockAlarmPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn start_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl AlarmPlayer for MockAlarmPlayer {
    fn start(&self) -> Result<(), SoundError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(SoundError::Released);
        }
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), SoundError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(SoundError::Released);
        }
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.released.store(true, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Creates the alarm player described by `config`.
///
/// Returns `None` when sound is disabled or no audio device is available;
/// the timer then runs silently.
#[must_use]
pub fn try_create_player(config: &TimerConfig) -> Option<Arc<dyn AlarmPlayer>> {
    if !config.sound_enabled {
        debug!("Alarm sound disabled by configuration");
        return None;
    }

    let source = SoundSource::from_config(config.alarm_sound.as_deref());
    match RodioAlarmPlayer::new(source) {
        Ok(player) => Some(Arc::new(player)),
        Err(e) if e.is_device_error() => {
            warn!("No audio device, alarm will be silent: {}", e);
            None
        }
        Err(e) => {
            warn!("Failed to initialize alarm, it will be silent: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let player = MockAlarmPlayer::new();
        player.start().unwrap();
        assert!(player.is_playing());
        player.stop().unwrap();
        assert!(!player.is_playing());
        assert_eq!(player.start_count(), 1);
        assert_eq!(player.stop_count(), 1);
    }

    #[test]
    fn test_mock_failure() {
        let player = MockAlarmPlayer::new();
        player.set_should_fail(true);
        assert!(player.start().is_err());
        assert!(!player.is_playing());
        assert_eq!(player.start_count(), 1);
    }

    #[test]
    fn test_mock_release() {
        let player = MockAlarmPlayer::new();
        player.start().unwrap();
        player.release();
        assert!(player.is_released());
        assert!(!player.is_playing());
        assert!(matches!(player.start(), Err(SoundError::Released)));
    }

    #[test]
    fn test_try_create_player_disabled() {
        let config = TimerConfig::default().with_sound_enabled(false);
        assert!(try_create_player(&config).is_none());
    }

    #[test]
    fn test_try_create_player_no_panic() {
        // Some or None depending on the audio hardware.
        let player = try_create_player(&TimerConfig::default());
        if let Some(player) = player {
            player.release();
        }
    }
}

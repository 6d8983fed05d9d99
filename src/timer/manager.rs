//! Countdown timer manager.
//!
//! This module provides the countdown behind the focus screen:
//! - set / start / pause / reset / extend operations
//! - A periodic tick task driven by `tokio::time::interval`
//! - Observable state through a `watch` channel, events through `mpsc`
//! - The completion alarm

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::sound::AlarmPlayer;
use crate::types::{hms_to_seconds, TimerConfig, TimerPhase, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Events emitted by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A new duration was set
    DurationSet {
        /// New total duration
        total_seconds: u32,
    },
    /// Countdown started or resumed
    Started {
        /// Seconds left at start
        remaining_seconds: u32,
    },
    /// One tick elapsed
    Tick {
        /// Seconds left after the tick
        remaining_seconds: u32,
    },
    /// Countdown paused
    Paused {
        /// Seconds left at the moment of pause
        remaining_seconds: u32,
    },
    /// Extra time was added
    ExtraTimeAdded {
        /// Seconds added
        added_seconds: u32,
        /// Seconds left afterwards
        remaining_seconds: u32,
    },
    /// Countdown reached zero
    Completed,
    /// Timer was reset to idle
    Reset,
    /// Completion signal was cleared
    AlarmDismissed,
}

// ============================================================================
// Shared state
// ============================================================================

/// State shared between the manager and its tick task.
struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<TimerState>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    alarm: Option<Arc<dyn AlarmPlayer>>,
}

struct Inner {
    state: TimerState,
    /// Bumped on every cancellation; a tick task only acts while its
    /// generation is current.
    generation: u64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &TimerState) {
        self.state_tx.send_replace(state.clone());
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("Timer event dropped, no receiver");
        }
    }

    fn start_alarm(&self) {
        if let Some(alarm) = &self.alarm {
            if let Err(e) = alarm.start() {
                warn!("Failed to start alarm: {}", e);
            }
        }
    }

    fn stop_alarm(&self) {
        if let Some(alarm) = &self.alarm {
            if let Err(e) = alarm.stop() {
                warn!("Failed to stop alarm: {}", e);
            }
        }
    }
}

// ============================================================================
// TimerManager
// ============================================================================

/// Owns the countdown state and the task that ticks it.
///
/// Operations never fail: invalid requests are ignored and audio problems
/// are logged. Starting a countdown needs a Tokio runtime; outside one,
/// `start` logs a warning and does nothing.
///
/// Dropping the manager cancels the tick and releases the alarm.
pub struct TimerManager {
    shared: Arc<Shared>,
    config: TimerConfig,
    ticker: Option<JoinHandle<()>>,
}

impl TimerManager {
    /// Creates an idle manager.
    pub fn new(
        config: TimerConfig,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
        alarm: Option<Arc<dyn AlarmPlayer>>,
    ) -> Self {
        let state = TimerState::new();
        let (state_tx, _) = watch::channel(state.clone());
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state,
                    generation: 0,
                }),
                state_tx,
                event_tx,
                alarm,
            }),
            config,
            ticker: None,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> TimerState {
        self.shared.lock().state.clone()
    }

    /// Returns the current phase.
    pub fn phase(&self) -> TimerPhase {
        self.shared.lock().state.phase()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.shared.state_tx.subscribe()
    }

    /// Cancels any countdown and sets a new duration.
    pub fn set_time(&mut self, hours: u32, minutes: u32, seconds: u32) {
        let shared = Arc::clone(&self.shared);
        let mut inner = shared.lock();

        self.cancel(&mut inner);
        if inner.state.alarm_active {
            shared.stop_alarm();
        }

        let total = hms_to_seconds(hours, minutes, seconds);
        inner.state.set_total(total);
        debug!("Duration set to {}", inner.state.display_text);

        shared.emit(TimerEvent::DurationSet {
            total_seconds: total,
        });
        shared.publish(&inner.state);
    }

    /// Starts or resumes the countdown.
    ///
    /// Ignored when no duration is set or the countdown is already running.
    /// A completed countdown starts over from its full duration.
    pub fn start(&mut self) {
        let shared = Arc::clone(&self.shared);
        let mut inner = shared.lock();

        let phase = inner.state.phase();
        if !phase.can_start() {
            debug!("Ignoring start while {}", phase.as_str());
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("Cannot start countdown outside a Tokio runtime");
            return;
        };

        self.cancel(&mut inner);
        if inner.state.dismiss_alarm() {
            shared.stop_alarm();
            shared.emit(TimerEvent::AlarmDismissed);
        }
        if !inner.state.begin() {
            return;
        }

        let generation = inner.generation;
        self.ticker = Some(runtime.spawn(run_countdown(
            Arc::clone(&shared),
            generation,
            self.config.tick_interval(),
        )));

        info!("Countdown started at {}", inner.state.display_text);
        shared.emit(TimerEvent::Started {
            remaining_seconds: inner.state.remaining_seconds,
        });
        shared.publish(&inner.state);
    }

    /// Pauses the countdown, keeping the remaining time.
    pub fn pause(&mut self) {
        let shared = Arc::clone(&self.shared);
        let mut inner = shared.lock();

        self.cancel(&mut inner);
        if inner.state.halt() {
            debug!("Countdown paused at {}", inner.state.display_text);
            shared.emit(TimerEvent::Paused {
                remaining_seconds: inner.state.remaining_seconds,
            });
            shared.publish(&inner.state);
        }
    }

    /// Starts when stopped, pauses when running.
    pub fn toggle(&mut self) {
        if self.shared.lock().state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Cancels the countdown, silences the alarm and zeroes everything.
    pub fn reset_timer(&mut self) {
        let shared = Arc::clone(&self.shared);
        let mut inner = shared.lock();

        self.cancel(&mut inner);
        shared.stop_alarm();
        inner.state.reset();

        debug!("Timer reset");
        shared.emit(TimerEvent::Reset);
        shared.publish(&inner.state);
    }

    /// Adds `seconds` to the duration, keeping elapsed progress.
    ///
    /// Ignored while no duration is set. A running countdown keeps running
    /// with the corrected remaining time. A completed countdown becomes
    /// paused with the added time, and its alarm is dismissed.
    pub fn add_extra_time(&mut self, seconds: u32) {
        let shared = Arc::clone(&self.shared);
        let mut inner = shared.lock();

        if !inner.state.is_running {
            let was_alarmed = inner.state.alarm_active;
            if !inner.state.extend(seconds) {
                debug!("No duration set, ignoring extra time");
                return;
            }
            if was_alarmed && !inner.state.alarm_active {
                shared.stop_alarm();
                shared.emit(TimerEvent::AlarmDismissed);
            }
            self.after_extend(&shared, &inner.state, seconds);
            return;
        }

        // Restart the tick so the next decrement is a full period away.
        self.cancel(&mut inner);
        inner.state.extend(seconds);
        match Handle::try_current() {
            Ok(runtime) => {
                let generation = inner.generation;
                self.ticker = Some(runtime.spawn(run_countdown(
                    Arc::clone(&shared),
                    generation,
                    self.config.tick_interval(),
                )));
            }
            Err(_) => {
                warn!("Lost the Tokio runtime, countdown paused");
                inner.state.halt();
            }
        }
        self.after_extend(&shared, &inner.state, seconds);
    }

    /// Adds the configured extra time.
    pub fn add_configured_extra_time(&mut self) {
        self.add_extra_time(self.config.extra_time_seconds);
    }

    fn after_extend(&self, shared: &Shared, state: &TimerState, seconds: u32) {
        debug!("Added {}s, now {}", seconds, state.display_text);
        shared.emit(TimerEvent::ExtraTimeAdded {
            added_seconds: seconds,
            remaining_seconds: state.remaining_seconds,
        });
        shared.publish(state);
    }

    /// Clears the completion signal and stops the alarm.
    pub fn dismiss_alarm(&mut self) {
        let shared = Arc::clone(&self.shared);
        let mut inner = shared.lock();

        shared.stop_alarm();
        if inner.state.dismiss_alarm() {
            shared.emit(TimerEvent::AlarmDismissed);
            shared.publish(&inner.state);
        }
    }

    /// Tears the manager down: cancels the tick, dismisses the alarm and
    /// releases the audio resource.
    pub fn clear(&mut self) {
        let shared = Arc::clone(&self.shared);
        let mut inner = shared.lock();

        self.cancel(&mut inner);
        let was_running = inner.state.halt();
        let was_alarmed = inner.state.dismiss_alarm();
        if let Some(alarm) = &shared.alarm {
            alarm.release();
        }

        if was_running || was_alarmed {
            shared.publish(&inner.state);
        }
        debug!("Timer manager cleared");
    }

    /// Invalidates and aborts the current tick task, if any.
    fn cancel(&mut self, inner: &mut Inner) {
        inner.generation = inner.generation.wrapping_add(1);
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Tick loop for one countdown generation.
async fn run_countdown(shared: Arc<Shared>, generation: u64, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        ticker.tick().await;

        let mut inner = shared.lock();
        if inner.generation != generation {
            return;
        }

        let completed = inner.state.tick();
        shared.emit(TimerEvent::Tick {
            remaining_seconds: inner.state.remaining_seconds,
        });

        if completed {
            info!("Countdown completed");
            shared.emit(TimerEvent::Completed);
            shared.start_alarm();
            shared.publish(&inner.state);
            return;
        }

        shared.publish(&inner.state);
    }
}

// ============================================================================
// Tests
// ============================================================================

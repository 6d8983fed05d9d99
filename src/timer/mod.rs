//! Countdown timer for the focus screen.
//!
//! - `manager`: the countdown state owner, its tick task and its events

pub mod manager;

pub use manager::{TimerEvent, TimerManager};

//! # Tomatina Core Library
//!
//! Core engine for the Tomatina pomodoro timer: a wall-clock-anchored
//! countdown state machine and the periodic wake-up signal that drives
//! display refresh. UI layers (CLI today, anything else tomorrow) compose
//! the two; the components never call each other.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: countdown state machine over calendar-aware date
//!   arithmetic, with a one-shot deadline that forces the return to idle
//! - [`PeriodicSignal`]: demand-driven tick source abstracting the host's
//!   periodic-callback primitive, with power-aware pausing
//! - [`CalendarDuration`]: durations as calendar fields, applied by
//!   calendar addition so "25 minutes" stays 25 wall-clock minutes across
//!   DST transitions
//! - [`SettingsStore`]: TOML-backed user settings, the engine's injected
//!   duration source

pub mod calendar;
pub mod error;
pub mod signal;
pub mod storage;
pub mod timer;

pub use calendar::{CalendarDuration, TimeBreakdown};
pub use error::{ConfigError, CoreError, SignalError};
pub use signal::{Demand, PeriodicSignal, Subscription};
pub use storage::{Settings, SettingsStore};
pub use timer::{DurationSource, Phase, TimerEngine};

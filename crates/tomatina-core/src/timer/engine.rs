//! Pomodoro timer state machine.
//!
//! The engine is anchored to the wall clock: starting a countdown
//! calendar-adds the configured duration to "now" and stores only the end
//! instant, so every derived quantity (elapsed, remaining, completion
//! fraction) is recomputed from the current instant on each read. This keeps
//! the countdown correct across host suspension, background time, and DST
//! transitions at the cost of no cached totals.
//!
//! ## Phase transitions
//!
//! ```text
//! Idle -> Active -> Suspended -> Active -> ... -> Idle
//! ```
//!
//! All methods take `&mut self` and are meant to be called from one
//! UI-bound logical thread. The deadline callback fires off-thread but only
//! sets an atomic latch; the transition to idle is applied by the engine
//! itself at the next call on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use super::deadline::{DeadlineGuard, DeadlineScheduler, ThreadDeadlineScheduler};
use crate::calendar::{CalendarDuration, TimeBreakdown};

/// Read boundary for the configured pomodoro length.
///
/// Queried on every `start()` from idle, never cached, so a changed setting
/// takes effect for the next run. `None` means no duration is configured and
/// starting is a safe no-op.
pub trait DurationSource {
    /// Configured timer duration in whole minutes.
    fn timer_duration_min(&self) -> Option<i64>;
}

/// The discrete mode of the timer, exactly one active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// No timer running.
    Idle,
    /// Counting down toward `end_at`.
    Active {
        end_at: DateTime<Utc>,
        total: CalendarDuration,
    },
    /// Paused with the elapsed time banked at the pause instant.
    Suspended {
        elapsed: StdDuration,
        total: CalendarDuration,
    },
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Active { .. } => "active",
            Phase::Suspended { .. } => "suspended",
        }
    }
}

type WillChangeFn = Box<dyn FnMut(&Phase)>;

/// Wall-clock-anchored countdown state machine.
pub struct TimerEngine {
    phase: Phase,
    settings: Arc<dyn DurationSource>,
    scheduler: Box<dyn DeadlineScheduler>,
    /// Guard for the armed one-shot deadline; present only while Active.
    deadline: Option<Box<dyn DeadlineGuard>>,
    /// Set by the deadline callback, applied on the engine's own thread.
    deadline_fired: Arc<AtomicBool>,
    /// Host hook to wake the UI loop after the deadline fires off-thread.
    waker: Option<Arc<dyn Fn() + Send + Sync>>,
    /// Fires synchronously with the old phase before every mutation.
    will_change: Option<WillChangeFn>,
}

impl TimerEngine {
    pub fn new(settings: Arc<dyn DurationSource>, scheduler: Box<dyn DeadlineScheduler>) -> Self {
        Self {
            phase: Phase::Idle,
            settings,
            scheduler,
            deadline: None,
            deadline_fired: Arc::new(AtomicBool::new(false)),
            waker: None,
            will_change: None,
        }
    }

    /// Engine with the production thread-backed deadline scheduler.
    pub fn with_thread_deadlines(settings: Arc<dyn DurationSource>) -> Self {
        Self::new(settings, Box::new(ThreadDeadlineScheduler))
    }

    /// Register the synchronous pre-mutation observer.
    ///
    /// The callback receives the phase as it was *before* the change lands,
    /// so observers can snapshot old state. Replaces any prior observer.
    pub fn observe_will_change(&mut self, f: impl FnMut(&Phase) + 'static) {
        self.will_change = Some(Box::new(f));
    }

    /// Register a host hook invoked (possibly off-thread) when the deadline
    /// fires, typically to wake the UI loop so it re-reads the engine.
    pub fn set_waker(&mut self, f: impl Fn() + Send + Sync + 'static) {
        self.waker = Some(Arc::new(f));
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume the countdown.
    ///
    /// From idle the configured duration is read fresh; with nothing
    /// configured this is a no-op. From suspended, the banked elapsed time
    /// is carried over so the countdown picks up where it left off. From
    /// active this is idempotent.
    pub fn start(&mut self) {
        self.apply_deadline_latch();
        match self.phase {
            Phase::Active { .. } => {}
            Phase::Suspended { elapsed, total } => match resumed_end_at(total, elapsed) {
                Some(end_at) => self.transition(Phase::Active { end_at, total }),
                None => self.transition(Phase::Idle),
            },
            Phase::Idle => {
                let Some(minutes) = self.settings.timer_duration_min() else {
                    tracing::debug!("start ignored: no timer duration configured");
                    return;
                };
                let total = CalendarDuration::minutes(minutes);
                match total.checked_add_to(Utc::now()) {
                    Some(end_at) => self.transition(Phase::Active { end_at, total }),
                    None => {
                        tracing::warn!(minutes, "calendar add failed, staying idle");
                        self.transition(Phase::Idle);
                    }
                }
            }
        }
    }

    /// Bank the elapsed time and suspend the countdown. No-op unless active.
    pub fn pause(&mut self) {
        self.apply_deadline_latch();
        if let Phase::Active { end_at, total } = self.phase {
            match elapsed_in_active(end_at, total) {
                Some(span) => {
                    let elapsed = span.to_std().unwrap_or(StdDuration::ZERO);
                    self.transition(Phase::Suspended { elapsed, total });
                }
                None => {
                    tracing::warn!("start instant underivable, forcing idle");
                    self.transition(Phase::Idle);
                }
            }
        }
    }

    /// Unconditional transition to idle. Idempotent.
    pub fn stop(&mut self) {
        self.apply_deadline_latch();
        self.transition(Phase::Idle);
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current phase, after applying any pending deadline firing.
    pub fn phase(&mut self) -> Phase {
        self.apply_deadline_latch();
        self.phase
    }

    /// True iff the countdown is suspended.
    pub fn is_paused(&mut self) -> bool {
        matches!(self.phase(), Phase::Suspended { .. })
    }

    /// Instant the active countdown started, derived by walking the total
    /// duration backward from the end instant. `None` outside Active.
    pub fn start_instant(&mut self) -> Option<DateTime<Utc>> {
        match self.phase() {
            Phase::Active { end_at, total } => total.negated().checked_add_to(end_at),
            _ => None,
        }
    }

    /// Time spent counting down so far.
    ///
    /// Active: recomputed from the derived start instant. Suspended: the
    /// banked value, frozen until resumed. Idle: `None`.
    pub fn elapsed_time(&mut self) -> Option<Duration> {
        match self.phase() {
            Phase::Active { end_at, total } => elapsed_in_active(end_at, total),
            Phase::Suspended { elapsed, .. } => Duration::from_std(elapsed).ok(),
            Phase::Idle => None,
        }
    }

    /// Minute/second breakdown of the time left.
    ///
    /// While suspended this reports what the countdown would show if resumed
    /// right now; it is not frozen at the pause instant.
    pub fn time_remaining(&mut self) -> Option<TimeBreakdown> {
        let now = Utc::now();
        match self.phase() {
            Phase::Active { end_at, .. } => Some(TimeBreakdown::from_span(end_at - now)),
            Phase::Suspended { elapsed, total } => {
                let end = total
                    .checked_add_to(now)?
                    .checked_sub_signed(Duration::from_std(elapsed).ok()?)?;
                Some(TimeBreakdown::from_span(end - now))
            }
            Phase::Idle => None,
        }
    }

    /// Completion fraction, elapsed over the total duration as it measures
    /// from the current instant.
    ///
    /// The denominator is recomputed on every read so variable-length
    /// calendar units are always evaluated freshly. The value is not
    /// clamped: once the deadline passes and before the auto-stop lands it
    /// can exceed 1.0.
    pub fn percentage_complete(&mut self) -> Option<f64> {
        let total = match self.phase() {
            Phase::Active { total, .. } | Phase::Suspended { total, .. } => total,
            Phase::Idle => return None,
        };
        let elapsed = self.elapsed_time()?;
        let denominator = total.checked_span_from(Utc::now())?;
        Some(span_secs(elapsed) / span_secs(denominator))
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply a deadline firing that happened off-thread since the last call.
    fn apply_deadline_latch(&mut self) {
        if self.deadline_fired.swap(false, Ordering::SeqCst) {
            tracing::debug!("deadline passed, returning to idle");
            self.transition(Phase::Idle);
        }
    }

    /// The single mutation point: notifies the will-change observer with the
    /// old phase, cancels the previous deadline, arms a new one when
    /// entering Active, then commits the phase atomically from the
    /// caller's point of view.
    fn transition(&mut self, next: Phase) {
        tracing::debug!(from = self.phase.name(), to = next.name(), "phase transition");
        if let Some(observer) = self.will_change.as_mut() {
            observer(&self.phase);
        }
        if let Some(mut guard) = self.deadline.take() {
            guard.cancel();
        }
        self.deadline_fired.store(false, Ordering::SeqCst);
        if let Phase::Active { end_at, .. } = next {
            let fired = Arc::clone(&self.deadline_fired);
            let waker = self.waker.clone();
            self.deadline = Some(self.scheduler.arm(
                end_at,
                Box::new(move || {
                    fired.store(true, Ordering::SeqCst);
                    if let Some(wake) = waker {
                        wake();
                    }
                }),
            ));
        }
        self.phase = next;
    }

    #[cfg(test)]
    fn force_phase(&mut self, phase: Phase) {
        self.transition(phase);
    }
}

/// End instant for resuming: the total duration applied at "now", walked
/// back by the already-elapsed time.
fn resumed_end_at(total: CalendarDuration, elapsed: StdDuration) -> Option<DateTime<Utc>> {
    total
        .checked_add_to(Utc::now())?
        .checked_sub_signed(Duration::from_std(elapsed).ok()?)
}

fn elapsed_in_active(end_at: DateTime<Utc>, total: CalendarDuration) -> Option<Duration> {
    let start = total.negated().checked_add_to(end_at)?;
    Some(Utc::now() - start)
}

fn span_secs(span: Duration) -> f64 {
    match span.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => span.num_milliseconds() as f64 / 1e3,
    }
}

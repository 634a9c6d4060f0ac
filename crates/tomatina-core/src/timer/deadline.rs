//! One-shot deadline scheduling.
//!
//! The timer engine arms exactly one deadline while a countdown is active:
//! a callback that fires at the end instant and forces the phase back to
//! idle. The engine follows a cancel-then-replace discipline, so at most one
//! guard is live per engine at any time, and dropping a guard cancels it.

use std::sync::mpsc;
use std::thread;

use chrono::{DateTime, Utc};

/// Callback invoked at most once, when the deadline passes uncancelled.
pub type DeadlineFn = Box<dyn FnOnce() + Send>;

/// Capability to schedule a single wall-clock deadline.
///
/// Implementations may fire `on_fire` from any thread; callers are expected
/// to marshal back to their own logical thread before mutating state (the
/// engine does this with an atomic latch).
pub trait DeadlineScheduler {
    fn arm(&mut self, fire_at: DateTime<Utc>, on_fire: DeadlineFn) -> Box<dyn DeadlineGuard>;
}

/// Handle to an armed deadline. Cancelling (or dropping) suppresses the
/// callback if it has not fired yet; both are idempotent.
pub trait DeadlineGuard {
    fn cancel(&mut self);
}

/// Production scheduler: one short-lived thread per armed deadline.
///
/// The thread sleeps in a cancellable `recv_timeout` and re-checks the wall
/// clock after every wakeup, so a suspended host that resumes past the
/// deadline still fires promptly instead of sleeping out the full nominal
/// interval.
#[derive(Debug, Default)]
pub struct ThreadDeadlineScheduler;

struct ThreadGuard {
    // Dropping the sender disconnects the sleeper, which counts as cancel.
    cancel_tx: Option<mpsc::Sender<()>>,
}

impl DeadlineGuard for ThreadGuard {
    fn cancel(&mut self) {
        self.cancel_tx.take();
    }
}

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl DeadlineScheduler for ThreadDeadlineScheduler {
    fn arm(&mut self, fire_at: DateTime<Utc>, on_fire: DeadlineFn) -> Box<dyn DeadlineGuard> {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        let spawned = thread::Builder::new()
            .name("tomatina-deadline".into())
            .spawn(move || {
                loop {
                    let left = fire_at - Utc::now();
                    let Ok(wait) = left.to_std() else {
                        // Deadline already passed.
                        break;
                    };
                    match cancel_rx.recv_timeout(wait) {
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => return,
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                    }
                }
                on_fire();
            });

        if let Err(e) = spawned {
            tracing::error!("failed to spawn deadline thread: {e}");
        }

        Box::new(ThreadGuard {
            cancel_tx: Some(cancel_tx),
        })
    }
}

/// Test scheduler: records armed deadlines and fires them on demand.
pub struct ManualDeadlineScheduler {
    shared: ManualDeadlines,
}

/// Clonable view onto a [`ManualDeadlineScheduler`]'s armed deadlines.
#[derive(Clone)]
pub struct ManualDeadlines {
    inner: std::sync::Arc<std::sync::Mutex<Vec<ManualEntry>>>,
}

struct ManualEntry {
    fire_at: DateTime<Utc>,
    on_fire: Option<DeadlineFn>,
}

impl ManualDeadlineScheduler {
    pub fn new() -> Self {
        Self {
            shared: ManualDeadlines {
                inner: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
            },
        }
    }

    /// Handle for firing and inspecting deadlines after the scheduler has
    /// been boxed into an engine.
    pub fn deadlines(&self) -> ManualDeadlines {
        self.shared.clone()
    }
}

impl Default for ManualDeadlineScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualDeadlines {
    /// Number of armed, uncancelled deadlines.
    pub fn pending(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.on_fire.is_some())
            .count()
    }

    /// Fire instant of the most recently armed live deadline.
    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|e| e.on_fire.is_some())
            .map(|e| e.fire_at)
    }

    /// Fire every pending deadline, oldest first.
    pub fn fire_all(&self) {
        let callbacks: Vec<DeadlineFn> = {
            let mut entries = self.inner.lock().unwrap();
            entries.iter_mut().filter_map(|e| e.on_fire.take()).collect()
        };
        for cb in callbacks {
            cb();
        }
    }
}

struct ManualGuard {
    shared: ManualDeadlines,
    index: usize,
}

impl DeadlineGuard for ManualGuard {
    fn cancel(&mut self) {
        if let Some(entry) = self.shared.inner.lock().unwrap().get_mut(self.index) {
            entry.on_fire.take();
        }
    }
}

impl Drop for ManualGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl DeadlineScheduler for ManualDeadlineScheduler {
    fn arm(&mut self, fire_at: DateTime<Utc>, on_fire: DeadlineFn) -> Box<dyn DeadlineGuard> {
        let index = {
            let mut entries = self.shared.inner.lock().unwrap();
            entries.push(ManualEntry {
                fire_at,
                on_fire: Some(on_fire),
            });
            entries.len() - 1
        };
        Box::new(ManualGuard {
            shared: self.shared.clone(),
            index,
        })
    }
}

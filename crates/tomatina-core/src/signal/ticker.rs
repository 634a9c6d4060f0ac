//! Platform tick sources behind the [`TickSource`] capability.
//!
//! A tick source is the native periodic-callback primitive that drives a
//! subscription: a repeating-interval thread everywhere, or a tokio interval
//! task when the `tokio-ticker` feature is enabled and the host already runs
//! a runtime. Sources push into a single-slot channel owned by the
//! subscription; a firing that finds the slot occupied is dropped, never
//! queued, so there is no catch-up delivery.

use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::SignalError;

/// A periodic native primitive, exclusively owned by one subscription.
///
/// Pausing disables the primitive (the interval stops running, not just the
/// delivery); resuming re-enables it. The underlying resource is released
/// when the source is dropped.
pub trait TickSource {
    fn pause(&mut self);
    fn resume(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickerState {
    Running,
    Paused,
    Stopped,
}

struct TickerControl {
    state: Mutex<TickerState>,
    cond: Condvar,
}

/// Repeating-interval thread, the fallback primitive available on every
/// platform. While paused the thread parks on a condvar, the interval
/// equivalent of invalidating a timer.
pub struct ThreadTicker {
    control: Arc<TickerControl>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadTicker {
    pub fn spawn(period: Duration, ticks: SyncSender<()>) -> Result<Self, SignalError> {
        let control = Arc::new(TickerControl {
            state: Mutex::new(TickerState::Running),
            cond: Condvar::new(),
        });
        let thread_control = Arc::clone(&control);
        let thread = thread::Builder::new()
            .name("tomatina-ticker".into())
            .spawn(move || tick_loop(thread_control, period, ticks))
            .map_err(|e| SignalError::Acquire(e.to_string()))?;
        Ok(Self {
            control,
            thread: Some(thread),
        })
    }

    fn set_state(&self, next: TickerState) {
        let mut state = self.control.state.lock().unwrap();
        if *state != TickerState::Stopped {
            *state = next;
        }
        self.control.cond.notify_all();
    }
}

fn tick_loop(control: Arc<TickerControl>, period: Duration, ticks: SyncSender<()>) {
    let mut state = control.state.lock().unwrap();
    loop {
        match *state {
            TickerState::Stopped => return,
            TickerState::Paused => {
                state = control.cond.wait(state).unwrap();
            }
            TickerState::Running => {
                let (guard, timeout) = control.cond.wait_timeout(state, period).unwrap();
                state = guard;
                if timeout.timed_out() && *state == TickerState::Running {
                    match ticks.try_send(()) {
                        // Slot occupied: the consumer has not drained the
                        // previous tick yet, so this one is dropped.
                        Ok(()) | Err(TrySendError::Full(())) => {}
                        Err(TrySendError::Disconnected(())) => return,
                    }
                }
            }
        }
    }
}

impl TickSource for ThreadTicker {
    fn pause(&mut self) {
        self.set_state(TickerState::Paused);
    }

    fn resume(&mut self) {
        self.set_state(TickerState::Running);
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.set_state(TickerState::Stopped);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Tokio interval task for hosts that already run a runtime.
#[cfg(feature = "tokio-ticker")]
pub struct TokioTicker {
    state_tx: tokio::sync::watch::Sender<TickerState>,
    task: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "tokio-ticker")]
impl TokioTicker {
    pub fn spawn_on(
        runtime: &tokio::runtime::Handle,
        period: Duration,
        ticks: SyncSender<()>,
    ) -> Result<Self, SignalError> {
        let (state_tx, mut state_rx) = tokio::sync::watch::channel(TickerState::Running);
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                while *state_rx.borrow() != TickerState::Running {
                    if *state_rx.borrow() == TickerState::Stopped {
                        return;
                    }
                    if state_rx.changed().await.is_err() {
                        return;
                    }
                }
                tokio::select! {
                    _ = interval.tick() => {
                        if *state_rx.borrow() == TickerState::Running {
                            if let Err(TrySendError::Disconnected(())) = ticks.try_send(()) {
                                return;
                            }
                        }
                    }
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
        });
        Ok(Self { state_tx, task })
    }
}

#[cfg(feature = "tokio-ticker")]
impl TickSource for TokioTicker {
    fn pause(&mut self) {
        let _ = self.state_tx.send(TickerState::Paused);
    }

    fn resume(&mut self) {
        let _ = self.state_tx.send(TickerState::Running);
    }
}

#[cfg(feature = "tokio-ticker")]
impl Drop for TokioTicker {
    fn drop(&mut self) {
        let _ = self.state_tx.send(TickerState::Stopped);
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn ticker_fires_periodically() {
        let (tx, rx) = mpsc::sync_channel(1);
        let _ticker = ThreadTicker::spawn(Duration::from_millis(10), tx).unwrap();

        let mut received = 0;
        let stop_at = std::time::Instant::now() + Duration::from_millis(200);
        while std::time::Instant::now() < stop_at {
            if rx.recv_timeout(Duration::from_millis(50)).is_ok() {
                received += 1;
            }
        }
        assert!(received >= 5, "received only {received} ticks");
    }

    #[test]
    fn paused_ticker_goes_silent() {
        let (tx, rx) = mpsc::sync_channel(1);
        let mut ticker = ThreadTicker::spawn(Duration::from_millis(10), tx).unwrap();

        ticker.pause();
        // Drain anything sent before the pause landed.
        while rx.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(100));
        assert!(rx.try_recv().is_err());

        ticker.resume();
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_ok());
    }

    #[test]
    fn drop_releases_thread_and_disconnects() {
        let (tx, rx) = mpsc::sync_channel(1);
        let ticker = ThreadTicker::spawn(Duration::from_millis(10), tx).unwrap();
        drop(ticker);
        // Sender side is gone once the thread exits.
        std::thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }

    #[cfg(feature = "tokio-ticker")]
    #[test]
    fn tokio_ticker_fires_and_pauses() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, rx) = mpsc::sync_channel(1);
        let mut ticker =
            TokioTicker::spawn_on(runtime.handle(), Duration::from_millis(10), tx).unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(500)).is_ok());

        ticker.pause();
        while rx.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(100));
        assert!(rx.try_recv().is_err());
    }
}

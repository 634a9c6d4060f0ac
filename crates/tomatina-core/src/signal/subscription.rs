//! Single-observer subscription with demand-driven delivery.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use super::ticker::TickSource;

/// The observer's declared willingness to receive further ticks.
///
/// `None` disables the underlying native mechanism; any other value admits
/// delivery. `Max(n)` counts down per delivered tick and becomes `None` at
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Demand {
    /// Stop calling me.
    None,
    /// Up to this many further notifications.
    Max(u64),
    /// No limit.
    #[default]
    Unlimited,
}

impl Demand {
    pub fn is_none(&self) -> bool {
        matches!(self, Demand::None)
    }
}

/// A live attachment of one observer to a periodic signal.
///
/// The subscription exclusively owns the native tick primitive; dropping the
/// subscription releases it even when [`cancel`](Self::cancel) was never
/// called. Ticks arrive from the source's own thread into a single-slot
/// channel and the observer runs only inside [`pump`](Self::pump) /
/// [`pump_for`](Self::pump_for), on whatever thread owns the subscription --
/// that is the hand-off the UI layer relies on.
pub struct Subscription {
    /// `None` once cancelled; dropping it releases the native resource.
    source: Option<Box<dyn TickSource>>,
    ticks: Receiver<()>,
    observer: Box<dyn FnMut()>,
    demand: Demand,
}

impl Subscription {
    pub(super) fn new(
        source: Box<dyn TickSource>,
        ticks: Receiver<()>,
        observer: Box<dyn FnMut()>,
    ) -> Self {
        Self {
            source: Some(source),
            ticks,
            observer,
            demand: Demand::Unlimited,
        }
    }

    pub fn demand(&self) -> Demand {
        self.demand
    }

    /// Adjust demand. `None` (and `Max(0)`) disables the native mechanism
    /// without destroying the subscription; ticks that would have fired in
    /// the meantime are lost, not buffered. Any other value re-enables it,
    /// for arbitrarily many pause/resume cycles.
    pub fn request(&mut self, demand: Demand) {
        let demand = match demand {
            Demand::Max(0) => Demand::None,
            other => other,
        };
        self.demand = demand;
        if let Some(source) = self.source.as_mut() {
            if demand.is_none() {
                source.pause();
            } else {
                source.resume();
            }
        }
    }

    /// Permanently drop demand to `None` and release the native resource.
    /// Safe to call multiple times.
    pub fn cancel(&mut self) {
        self.demand = Demand::None;
        self.source.take();
    }

    /// Deliver any tick already waiting in the marshaling slot.
    ///
    /// Runs the observer on the calling thread. Returns the number of
    /// notifications delivered (at most one per native firing).
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while !self.demand.is_none() && self.ticks.try_recv().is_ok() {
            self.deliver();
            delivered += 1;
        }
        delivered
    }

    /// Block up to `window`, delivering ticks as they arrive.
    ///
    /// Returns early when demand drops to `None` or the source disconnects.
    /// This is the consumer loop for hosts without their own event loop,
    /// such as a terminal countdown.
    pub fn pump_for(&mut self, window: Duration) -> usize {
        let deadline = Instant::now() + window;
        let mut delivered = 0;
        while !self.demand.is_none() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.ticks.recv_timeout(deadline - now) {
                Ok(()) => {
                    self.deliver();
                    delivered += 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        delivered
    }

    fn deliver(&mut self) {
        (self.observer)();
        if let Demand::Max(n) = self.demand {
            self.demand = if n <= 1 { Demand::None } else { Demand::Max(n - 1) };
            if self.demand.is_none() {
                if let Some(source) = self.source.as_mut() {
                    source.pause();
                }
            }
        }
    }
}

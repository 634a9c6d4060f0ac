//! Periodic wake-up signal for display refresh.
//!
//! A [`PeriodicSignal`] delivers recurring no-payload ticks to exactly one
//! observer at a preferred rate, hiding which native periodic primitive the
//! host provides. Demand is the backpressure mechanism: dropping it to
//! [`Demand::None`] disables the native primitive entirely (power-aware
//! pause), and restoring it resumes delivery without replaying anything
//! missed in between.

mod subscription;
mod ticker;

pub use subscription::{Demand, Subscription};
pub use ticker::{ThreadTicker, TickSource};
#[cfg(feature = "tokio-ticker")]
pub use ticker::TokioTicker;

use std::sync::mpsc;
use std::time::Duration;

use crate::error::SignalError;

/// Rate used when the consumer passes a zero rate hint.
pub const DEFAULT_RATE_HZ: u32 = 60;

/// Factory for tick subscriptions at a preferred rate.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicSignal {
    preferred_rate_hz: u32,
}

impl PeriodicSignal {
    /// `preferred_rate_hz` of 0 means "use the platform default" (60 Hz).
    pub fn new(preferred_rate_hz: u32) -> Self {
        Self { preferred_rate_hz }
    }

    /// Interval between firings for this signal's effective rate.
    pub fn period(&self) -> Duration {
        let hz = if self.preferred_rate_hz == 0 {
            DEFAULT_RATE_HZ
        } else {
            self.preferred_rate_hz
        };
        Duration::from_secs_f64(1.0 / f64::from(hz))
    }

    /// Attach an observer, arming the interval-thread primitive immediately.
    ///
    /// Fails only when the platform resource cannot be acquired; that is
    /// fatal for this subscription, there is no degraded mode.
    pub fn subscribe(
        &self,
        observer: impl FnMut() + 'static,
    ) -> Result<Subscription, SignalError> {
        let (tx, rx) = mpsc::sync_channel(1);
        let ticker = ThreadTicker::spawn(self.period(), tx)?;
        Ok(Subscription::new(Box::new(ticker), rx, Box::new(observer)))
    }

    /// Attach an observer driven by a tokio interval on `runtime`.
    #[cfg(feature = "tokio-ticker")]
    pub fn subscribe_on(
        &self,
        runtime: &tokio::runtime::Handle,
        observer: impl FnMut() + 'static,
    ) -> Result<Subscription, SignalError> {
        let (tx, rx) = mpsc::sync_channel(1);
        let ticker = TokioTicker::spawn_on(runtime, self.period(), tx)?;
        Ok(Subscription::new(Box::new(ticker), rx, Box::new(observer)))
    }
}

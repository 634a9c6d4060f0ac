//! Calendar-unit duration arithmetic.
//!
//! A pomodoro duration is stored as counts of calendar fields ("25 minutes"),
//! not as a fixed number of elapsed seconds. End instants are derived by
//! calendar-adding those fields to a wall-clock instant, so a 25-minute timer
//! still means 25 minutes of wall clock when the addition bridges a DST
//! transition. The cost is that every derived quantity is recomputed from the
//! current instant instead of being cached at start time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A duration expressed in calendar fields, any subset populated.
///
/// Unpopulated fields are distinct from zero fields: they are skipped
/// entirely during arithmetic, and [`negated`](Self::negated) leaves them
/// unpopulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDuration {
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
    pub nanoseconds: Option<i64>,
}

impl CalendarDuration {
    /// A duration with only the minutes field populated.
    pub fn minutes(minutes: i64) -> Self {
        Self {
            minutes: Some(minutes),
            ..Self::default()
        }
    }

    /// Sign-flip every populated field; unpopulated fields stay unpopulated.
    ///
    /// Used to walk backward from an end instant to a start instant.
    /// Negating twice returns the original value field by field.
    pub fn negated(&self) -> Self {
        Self {
            hours: self.hours.map(i64::wrapping_neg),
            minutes: self.minutes.map(i64::wrapping_neg),
            seconds: self.seconds.map(i64::wrapping_neg),
            nanoseconds: self.nanoseconds.map(i64::wrapping_neg),
        }
    }

    /// Calendar-add the populated fields to `instant`.
    ///
    /// Returns `None` when a field does not fit in a time span or the
    /// resulting date is not representable. An all-unpopulated value adds
    /// nothing and succeeds.
    pub fn checked_add_to(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut out = instant;
        if let Some(hours) = self.hours {
            out = out.checked_add_signed(Duration::try_hours(hours)?)?;
        }
        if let Some(minutes) = self.minutes {
            out = out.checked_add_signed(Duration::try_minutes(minutes)?)?;
        }
        if let Some(seconds) = self.seconds {
            out = out.checked_add_signed(Duration::try_seconds(seconds)?)?;
        }
        if let Some(nanoseconds) = self.nanoseconds {
            out = out.checked_add_signed(Duration::nanoseconds(nanoseconds))?;
        }
        Some(out)
    }

    /// The signed span this duration covers when applied at `instant`.
    ///
    /// Computed as `checked_add_to(instant) - instant`, never from the raw
    /// fields, so callers always observe the span as it would land on the
    /// calendar right now.
    pub fn checked_span_from(&self, instant: DateTime<Utc>) -> Option<Duration> {
        let end = self.checked_add_to(instant)?;
        Some(end - instant)
    }
}

/// Minute/second component breakdown of a signed span.
///
/// Components are truncated toward zero, matching calendar component
/// extraction: a span of 89 seconds reads as 1 minute, 29 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBreakdown {
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeBreakdown {
    pub fn from_span(span: Duration) -> Self {
        let secs = span.num_seconds();
        Self {
            minutes: secs / 60,
            seconds: secs % 60,
        }
    }
}

impl std::fmt::Display for TimeBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.minutes < 0 || self.seconds < 0 {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}{:02}:{:02}", self.minutes.abs(), self.seconds.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn minutes_constructor_populates_only_minutes() {
        let d = CalendarDuration::minutes(25);
        assert_eq!(d.minutes, Some(25));
        assert_eq!(d.hours, None);
        assert_eq!(d.seconds, None);
        assert_eq!(d.nanoseconds, None);
    }

    #[test]
    fn add_applies_each_populated_field() {
        let d = CalendarDuration {
            hours: Some(1),
            minutes: Some(30),
            seconds: Some(15),
            nanoseconds: None,
        };
        let now = Utc::now();
        let end = d.checked_add_to(now).unwrap();
        assert_eq!(end - now, Duration::seconds(3600 + 1800 + 15));
    }

    #[test]
    fn empty_duration_adds_nothing() {
        let now = Utc::now();
        assert_eq!(CalendarDuration::default().checked_add_to(now), Some(now));
    }

    #[test]
    fn overflowing_field_fails_closed() {
        let d = CalendarDuration {
            hours: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(d.checked_add_to(Utc::now()), None);
    }

    #[test]
    fn span_matches_add() {
        let d = CalendarDuration::minutes(25);
        let now = Utc::now();
        assert_eq!(d.checked_span_from(now), Some(Duration::minutes(25)));
    }

    #[test]
    fn breakdown_truncates_toward_zero() {
        let b = TimeBreakdown::from_span(Duration::seconds(89));
        assert_eq!(b, TimeBreakdown { minutes: 1, seconds: 29 });

        let b = TimeBreakdown::from_span(Duration::seconds(-89));
        assert_eq!(b, TimeBreakdown { minutes: -1, seconds: -29 });
    }

    #[test]
    fn breakdown_display() {
        let b = TimeBreakdown::from_span(Duration::seconds(605));
        assert_eq!(b.to_string(), "10:05");

        let b = TimeBreakdown::from_span(Duration::seconds(-61));
        assert_eq!(b.to_string(), "-01:01");
    }

    fn arb_field() -> impl Strategy<Value = Option<i64>> {
        prop_oneof![Just(None), any::<i64>().prop_map(Some)]
    }

    proptest! {
        #[test]
        fn double_negation_is_identity(
            hours in arb_field(),
            minutes in arb_field(),
            seconds in arb_field(),
            nanoseconds in arb_field(),
        ) {
            let d = CalendarDuration { hours, minutes, seconds, nanoseconds };
            prop_assert_eq!(d.negated().negated(), d);
        }

        #[test]
        fn negation_flips_populated_fields(minutes in any::<i64>()) {
            let d = CalendarDuration::minutes(minutes);
            let n = d.negated();
            prop_assert_eq!(n.minutes, Some(minutes.wrapping_neg()));
            prop_assert_eq!(n.hours, None);
        }
    }
}

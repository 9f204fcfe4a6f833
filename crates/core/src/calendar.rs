//! Ledger calendar: the reference timezone and an injected wall clock.
//!
//! Every ledger timestamp and every daily-aggregate day is derived from one
//! reading of the clock, so a transfer's `created_at` and the aggregate row
//! it increments always agree on the calendar date.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use mockable::{Clock, DefaultClock};

/// Reference timezone plus clock used by the transfer engine.
#[derive(Clone)]
pub struct LedgerCalendar {
    time_zone: Tz,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl std::fmt::Debug for LedgerCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerCalendar")
            .field("time_zone", &self.time_zone)
            .finish_non_exhaustive()
    }
}

impl LedgerCalendar {
    /// Creates a calendar over the given clock.
    #[must_use]
    pub fn new(time_zone: Tz, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { time_zone, clock }
    }

    /// Creates a calendar reading the system clock.
    #[must_use]
    pub fn system(time_zone: Tz) -> Self {
        Self::new(time_zone, Arc::new(DefaultClock))
    }

    /// Returns the reference timezone.
    #[must_use]
    pub const fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Current instant as local wall-clock time in the reference timezone.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.localize(self.clock.utc())
    }

    /// Current calendar date in the reference timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Converts a stored instant to local wall-clock time.
    #[must_use]
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.time_zone).fixed_offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    fn calendar_at(time_zone: Tz, utc_now: DateTime<Utc>) -> LedgerCalendar {
        LedgerCalendar::new(time_zone, Arc::new(FixtureClock { utc_now }))
    }

    #[test]
    fn test_today_follows_reference_timezone() {
        // 05:30 UTC is still the previous evening in Mexico City (UTC-6).
        let instant = Utc.with_ymd_and_hms(2026, 3, 1, 5, 30, 0).unwrap();

        let utc = calendar_at(chrono_tz::UTC, instant);
        let cdmx = calendar_at(chrono_tz::America::Mexico_City, instant);

        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(cdmx.today(), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn test_now_carries_local_offset() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 1, 5, 30, 0).unwrap();
        let now = calendar_at(chrono_tz::America::Mexico_City, instant).now();

        assert_eq!(now.offset().local_minus_utc(), -6 * 3600);
        assert_eq!(now.with_timezone(&Utc), instant);
    }

    #[test]
    fn test_localize_preserves_instant() {
        let calendar = calendar_at(chrono_tz::Asia::Tokyo, Utc::now());
        let stored = Utc.with_ymd_and_hms(2026, 1, 1, 20, 0, 0).unwrap();

        let local = calendar.localize(stored);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(local.with_timezone(&Utc), stored);
    }
}

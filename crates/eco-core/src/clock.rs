//! Time source shared by the ledger writer and reader.
//!
//! "Today" for the day-scoped overwrite rule is derived from one [`Clock`]
//! so the current instant and the calendar day it falls in come from the
//! same place.

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};

/// Supplies the current instant and the calendar day it belongs to.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Inclusive bounds `[00:00:00.000, 23:59:59.999]` of the calendar day
    /// containing `instant`, in the clock's timezone.
    fn day_bounds(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>);

    /// Bounds of the calendar day containing [`Clock::now`].
    fn today(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        self.day_bounds(self.now())
    }
}

/// Wall clock in the server's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn day_bounds(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        day_bounds_in(&Local, instant)
    }
}

/// A clock pinned to one instant in a fixed-offset timezone.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Creates a clock that always reports `now`, with days computed in UTC.
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self {
            now,
            offset: Utc.fix(),
        }
    }

    /// Creates a clock that always reports `now`, with days computed in `offset`.
    pub const fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Moves the clock to a new instant.
    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn day_bounds(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        day_bounds_in(&self.offset, instant)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn day_bounds(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (**self).day_bounds(instant)
    }
}

/// Inclusive bounds of the calendar day containing `instant` in `tz`.
pub fn day_bounds_in<Tz: TimeZone>(
    tz: &Tz,
    instant: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = instant.with_timezone(tz).date_naive();
    date_range_in(tz, date, date)
}

/// Inclusive bounds spanning whole local days from `first` through `last`.
pub fn date_range_in<Tz: TimeZone>(
    tz: &Tz,
    first: NaiveDate,
    last: NaiveDate,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight_to_utc(tz, first);
    let end = last.succ_opt().map_or_else(
        || local_midnight_to_utc(tz, last) + Duration::days(1),
        |next| local_midnight_to_utc(tz, next),
    ) - Duration::milliseconds(1);
    (start, end)
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            // DST spring-forward gap at midnight; 1am local exists.
            date.and_hms_opt(1, 0, 0)
                .and_then(|one_am| tz.from_local_datetime(&one_am).earliest())
        })
        .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn utc_day_bounds_cover_whole_day() {
        let clock = FixedClock::utc(utc("2025-06-15T13:45:00Z"));
        let (start, end) = clock.today();
        assert_eq!(start, utc("2025-06-15T00:00:00Z"));
        assert_eq!(end, utc("2025-06-15T23:59:59.999Z"));
    }

    #[test]
    fn offset_day_bounds_follow_local_calendar() {
        // 02:00 UTC is still the previous evening at UTC-5.
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let clock = FixedClock::with_offset(utc("2025-06-15T02:00:00Z"), offset);
        let (start, end) = clock.today();
        assert_eq!(start, utc("2025-06-14T05:00:00Z"));
        assert_eq!(end, utc("2025-06-15T04:59:59.999Z"));
    }

    #[test]
    fn midnight_belongs_to_the_new_day() {
        let clock = FixedClock::utc(utc("2025-06-15T00:00:00Z"));
        let (start, _) = clock.today();
        assert_eq!(start, utc("2025-06-15T00:00:00Z"));
    }

    #[test]
    fn advance_moves_now() {
        let mut clock = FixedClock::utc(utc("2025-06-15T23:00:00Z"));
        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), utc("2025-06-16T01:00:00Z"));
        assert_eq!(clock.today().0, utc("2025-06-16T00:00:00Z"));
    }

    #[test]
    fn date_range_spans_inclusive_days() {
        let first = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let last = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let (start, end) = date_range_in(&Utc, first, last);
        assert_eq!(start, utc("2025-01-06T00:00:00Z"));
        assert_eq!(end, utc("2025-01-12T23:59:59.999Z"));
    }
}

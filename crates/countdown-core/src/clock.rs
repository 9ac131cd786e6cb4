//! Wall-clock sources.
//!
//! The controller asks a [`Clock`] for "now" whenever no override date is
//! set, and to place wall-clock readings (target, override) on the real
//! timeline. Production uses the local zone; tests use a [`ManualClock`]
//! they can move by hand, in UTC unless given a zone.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};

use crate::countdown::resolve_local;

pub trait Clock {
    /// Current instant, carrying the local offset in force.
    fn now(&self) -> DateTime<FixedOffset>;

    /// The instant a local wall-clock reading denotes in this clock's zone.
    fn resolve(&self, local: NaiveDateTime) -> DateTime<FixedOffset>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn resolve(&self, local: NaiveDateTime) -> DateTime<FixedOffset> {
        resolve_local(&Local, local).fixed_offset()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock<Tz: TimeZone = Utc> {
    now: Rc<Cell<DateTime<Utc>>>,
    zone: Tz,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self::in_zone(Utc, start)
    }
}

impl<Tz: TimeZone> ManualClock<Tz> {
    /// Start at the wall-clock reading `start` in `zone`.
    pub fn in_zone(zone: Tz, start: NaiveDateTime) -> Self {
        let now = resolve_local(&zone, start).with_timezone(&Utc);
        Self {
            now: Rc::new(Cell::new(now)),
            zone,
        }
    }

    pub fn set(&self, to: NaiveDateTime) {
        self.now
            .set(resolve_local(&self.zone, to).with_timezone(&Utc));
    }

    pub fn advance_ms(&self, ms: u64) {
        let ms = i64::try_from(ms).unwrap_or(i64::MAX);
        self.now.set(self.now.get() + Duration::milliseconds(ms));
    }
}

impl<Tz: TimeZone> Clock for ManualClock<Tz> {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get().with_timezone(&self.zone).fixed_offset()
    }

    fn resolve(&self, local: NaiveDateTime) -> DateTime<FixedOffset> {
        resolve_local(&self.zone, local).fixed_offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::America::New_York;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(at(1, 12, 0));
        let handle = clock.clone();
        handle.advance_ms(1_500);
        assert_eq!(
            clock.now().naive_local(),
            at(1, 12, 0) + Duration::milliseconds(1_500)
        );
    }

    #[test]
    fn zoned_clock_reports_local_offset_after_fall_back() {
        let clock = ManualClock::in_zone(New_York, at(2, 0, 30));
        assert_eq!(clock.now().offset().local_minus_utc(), -4 * 3_600);
        clock.advance_ms(2 * 3_600_000);
        // Two real hours later the wall clock reads 01:30 EST.
        assert_eq!(clock.now().naive_local(), at(2, 1, 30));
        assert_eq!(clock.now().offset().local_minus_utc(), -5 * 3_600);
    }
}

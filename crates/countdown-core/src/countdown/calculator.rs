//! Countdown calculator.
//!
//! Turns a "now" instant and a target instant into a [`CountdownSnapshot`].
//! The remaining time is the difference between real instants, so a DST
//! change in between shortens or lengthens it by the offset shift. Calendar
//! dates are read in each instant's local offset, so day boundaries are
//! local midnights.
//!
//! Days are counted on calendar dates by default: the day field drops by one
//! exactly when the local date changes, while hours/minutes/seconds come from
//! the sub-day remainder of the precise difference. [`DayCounting::Elapsed`]
//! counts whole 24-hour blocks instead.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// How the `days` field is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCounting {
    /// Difference between calendar dates; decrements at local midnight.
    #[default]
    Calendar,
    /// Whole 24-hour multiples of the precise remaining duration.
    Elapsed,
}

/// Time remaining until the target at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_complete: bool,
}

impl CountdownSnapshot {
    /// The snapshot reported once the target has been reached.
    pub fn complete() -> Self {
        Self {
            is_complete: true,
            ..Self::default()
        }
    }

    /// `[days, hours, minutes, seconds]` with their display labels.
    pub fn units(&self) -> [(&'static str, u64); 4] {
        [
            ("Days", self.days),
            ("Hours", self.hours),
            ("Minutes", self.minutes),
            ("Seconds", self.seconds),
        ]
    }
}

/// The instant a local wall-clock reading denotes in `zone`.
///
/// A reading repeated by a fall-back takes its earlier instant; one skipped
/// by a spring-forward moves past the gap.
pub fn resolve_local<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .unwrap_or_else(|| zone.from_utc_datetime(&local))
}

/// Milliseconds from `now` until `target`; negative once the target passed.
pub fn remaining_ms<Tz: TimeZone, Tz2: TimeZone>(
    now: &DateTime<Tz>,
    target: &DateTime<Tz2>,
) -> i64 {
    target.timestamp_millis() - now.timestamp_millis()
}

/// Compute the snapshot for the instant `now` against the instant `target`.
pub fn compute_between<Tz: TimeZone>(
    now: &DateTime<Tz>,
    target: &DateTime<Tz>,
    mode: DayCounting,
) -> CountdownSnapshot {
    let remaining = remaining_ms(now, target);
    if remaining <= 0 {
        return CountdownSnapshot::complete();
    }

    let days = match mode {
        DayCounting::Calendar => (target.date_naive() - now.date_naive()).num_days(),
        DayCounting::Elapsed => remaining / MS_PER_DAY,
    };

    let sub_day = remaining % MS_PER_DAY;
    CountdownSnapshot {
        days: clamp_non_negative(days),
        hours: clamp_non_negative(sub_day / MS_PER_HOUR),
        minutes: clamp_non_negative((remaining % MS_PER_HOUR) / MS_PER_MINUTE),
        seconds: clamp_non_negative((remaining % MS_PER_MINUTE) / MS_PER_SECOND),
        is_complete: false,
    }
}

/// Compute the snapshot for two wall-clock readings taken in `zone`.
pub fn compute_in<Tz: TimeZone>(
    zone: &Tz,
    now: NaiveDateTime,
    target: NaiveDateTime,
    mode: DayCounting,
) -> CountdownSnapshot {
    compute_between(&resolve_local(zone, now), &resolve_local(zone, target), mode)
}

/// [`compute_in`] the system's local time zone.
pub fn compute(now: NaiveDateTime, target: NaiveDateTime, mode: DayCounting) -> CountdownSnapshot {
    compute_in(&Local, now, target, mode)
}

fn clamp_non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// A resolved target instant bound to a day-counting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownCalculator {
    target: DateTime<FixedOffset>,
    mode: DayCounting,
}

impl CountdownCalculator {
    pub fn new(target: DateTime<FixedOffset>, mode: DayCounting) -> Self {
        Self { target, mode }
    }

    /// Resolve the wall-clock `target` in `zone` first.
    pub fn in_zone<Tz: TimeZone>(zone: &Tz, target: NaiveDateTime, mode: DayCounting) -> Self {
        Self::new(resolve_local(zone, target).fixed_offset(), mode)
    }

    /// Target as a local wall-clock reading.
    pub fn target(&self) -> NaiveDateTime {
        self.target.naive_local()
    }

    pub fn target_instant(&self) -> DateTime<FixedOffset> {
        self.target
    }

    pub fn mode(&self) -> DayCounting {
        self.mode
    }

    pub fn snapshot_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> CountdownSnapshot {
        compute_between(&now.fixed_offset(), &self.target, self.mode)
    }

    /// Calendar days between `date` and the target date, zero once reached.
    pub fn days_remaining_on(&self, date: NaiveDate) -> u64 {
        clamp_non_negative((self.target.date_naive() - date).num_days())
    }
}

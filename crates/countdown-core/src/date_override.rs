//! Test-date override picker.
//!
//! Lets a tester substitute a calendar date for "now" so every screen can be
//! previewed without waiting. Typed dates may not go past the target date;
//! the quick-pick presets are fixed offsets from the target and may.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse `YYYY-MM-DD`, trimming surrounding whitespace.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::UnparseableDate {
            input: input.to_string(),
        }
    })
}

/// Reject dates later than `target_date`.
pub fn check_bound(date: NaiveDate, target_date: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if date > target_date {
        return Err(ValidationError::DateAfterTarget {
            date,
            max: target_date,
        });
    }
    Ok(date)
}

/// Override instant for a picked date: local midnight.
pub fn override_instant(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Calendar days from `date` to `target_date`, zero once reached.
pub fn days_remaining(date: NaiveDate, target_date: NaiveDate) -> u64 {
    u64::try_from((target_date - date).num_days()).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickPick {
    TwoDaysLeft,
    SevenDaysLeft,
    TargetDay,
    AfterTarget,
}

impl QuickPick {
    pub const ALL: [QuickPick; 4] = [
        QuickPick::TwoDaysLeft,
        QuickPick::SevenDaysLeft,
        QuickPick::TargetDay,
        QuickPick::AfterTarget,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuickPick::TwoDaysLeft => "2 days left",
            QuickPick::SevenDaysLeft => "7 days left",
            QuickPick::TargetDay => "Target day",
            QuickPick::AfterTarget => "After target",
        }
    }

    pub fn date_for(self, target_date: NaiveDate) -> NaiveDate {
        let offset = match self {
            QuickPick::TwoDaysLeft => -2,
            QuickPick::SevenDaysLeft => -7,
            QuickPick::TargetDay => 0,
            QuickPick::AfterTarget => 1,
        };
        target_date + Duration::days(offset)
    }
}

/// How the picker was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    Apply,
    UseRealDate,
    Cancel,
}

/// What the owner should do with its override once the picker closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    Set(NaiveDate),
    Clear,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct DatePicker {
    target_date: NaiveDate,
    open: bool,
    selected: NaiveDate,
}

impl DatePicker {
    pub fn new(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            open: false,
            selected: target_date,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }

    /// Open seeded with the current override, or today. Returns `false` and
    /// keeps the in-progress selection when already open.
    pub fn open(&mut self, current: Option<NaiveDate>, today: NaiveDate) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.selected = current.unwrap_or(today);
        true
    }

    /// Select a typed date. On error the selection is left as it was.
    pub fn input(&mut self, text: &str) -> Result<NaiveDate, ValidationError> {
        let date = check_bound(parse_date(text)?, self.target_date)?;
        self.selected = date;
        Ok(date)
    }

    pub fn quick_pick(&mut self, pick: QuickPick) -> NaiveDate {
        self.selected = pick.date_for(self.target_date);
        self.selected
    }

    /// Days remaining if the current selection were applied.
    pub fn preview_days(&self) -> u64 {
        days_remaining(self.selected, self.target_date)
    }

    /// Close the picker. `None` when it was not open.
    pub fn finish(&mut self, action: PickerAction) -> Option<PickerOutcome> {
        if !self.open {
            return None;
        }
        self.open = false;
        Some(match action {
            PickerAction::Apply => PickerOutcome::Set(self.selected),
            PickerAction::UseRealDate => PickerOutcome::Clear,
            PickerAction::Cancel => PickerOutcome::Unchanged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn picker() -> DatePicker {
        DatePicker::new(d(2025, 10, 17))
    }

    #[test]
    fn parse_accepts_iso_dates() {
        assert_eq!(parse_date(" 2025-10-15 ").unwrap(), d(2025, 10, 15));
        assert!(matches!(
            parse_date("15/10/2025"),
            Err(ValidationError::UnparseableDate { .. })
        ));
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn open_is_noop_when_already_open() {
        let mut p = picker();
        assert!(p.open(None, d(2025, 9, 1)));
        p.input("2025-10-01").unwrap();
        assert!(!p.open(None, d(2025, 9, 1)));
        assert_eq!(p.selected(), d(2025, 10, 1));
    }

    #[test]
    fn open_seeds_from_override() {
        let mut p = picker();
        p.open(Some(d(2025, 10, 10)), d(2025, 9, 1));
        assert_eq!(p.selected(), d(2025, 10, 10));
    }

    #[test]
    fn input_rejects_bad_text_and_keeps_selection() {
        let mut p = picker();
        p.open(None, d(2025, 9, 1));
        assert!(p.input("not a date").is_err());
        assert_eq!(p.selected(), d(2025, 9, 1));
    }

    #[test]
    fn input_rejects_dates_after_target() {
        let mut p = picker();
        p.open(None, d(2025, 9, 1));
        let err = p.input("2025-10-18").unwrap_err();
        assert_eq!(
            err,
            ValidationError::DateAfterTarget {
                date: d(2025, 10, 18),
                max: d(2025, 10, 17),
            }
        );
        assert!(p.input("2025-10-17").is_ok());
    }

    #[test]
    fn quick_picks_are_offsets_from_target() {
        let target = d(2025, 10, 17);
        assert_eq!(QuickPick::TwoDaysLeft.date_for(target), d(2025, 10, 15));
        assert_eq!(QuickPick::SevenDaysLeft.date_for(target), d(2025, 10, 10));
        assert_eq!(QuickPick::TargetDay.date_for(target), target);
        assert_eq!(QuickPick::AfterTarget.date_for(target), d(2025, 10, 18));
    }

    #[test]
    fn preview_counts_calendar_days() {
        let mut p = picker();
        p.open(None, d(2025, 9, 1));
        p.quick_pick(QuickPick::TwoDaysLeft);
        assert_eq!(p.preview_days(), 2);
        p.quick_pick(QuickPick::AfterTarget);
        assert_eq!(p.preview_days(), 0);
    }

    #[test]
    fn finish_reports_outcome_and_closes() {
        let mut p = picker();
        assert_eq!(p.finish(PickerAction::Apply), None);

        p.open(None, d(2025, 10, 1));
        assert_eq!(p.finish(PickerAction::Apply), Some(PickerOutcome::Set(d(2025, 10, 1))));
        assert!(!p.is_open());

        p.open(None, d(2025, 10, 1));
        assert_eq!(p.finish(PickerAction::UseRealDate), Some(PickerOutcome::Clear));

        p.open(None, d(2025, 10, 1));
        assert_eq!(p.finish(PickerAction::Cancel), Some(PickerOutcome::Unchanged));
    }
}

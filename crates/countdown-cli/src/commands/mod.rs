pub mod config;
pub mod simulate;
pub mod status;
pub mod watch;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, ValueEnum};
use countdown_core::date_override::{check_bound, parse_date};
use countdown_core::{QuickPick, ValidationError};

/// Test-date flags shared by every command that computes a countdown.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Pretend today is this date (YYYY-MM-DD, not after the target)
    #[arg(long, conflicts_with = "quick")]
    pub date: Option<String>,
    /// Pretend today is a preset date relative to the target
    #[arg(long, value_enum)]
    pub quick: Option<QuickArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickArg {
    TwoDaysLeft,
    SevenDaysLeft,
    TargetDay,
    AfterTarget,
}

impl From<QuickArg> for QuickPick {
    fn from(arg: QuickArg) -> Self {
        match arg {
            QuickArg::TwoDaysLeft => QuickPick::TwoDaysLeft,
            QuickArg::SevenDaysLeft => QuickPick::SevenDaysLeft,
            QuickArg::TargetDay => QuickPick::TargetDay,
            QuickArg::AfterTarget => QuickPick::AfterTarget,
        }
    }
}

impl OverrideArgs {
    /// The override date these flags ask for, if any.
    pub fn resolve(&self, target: NaiveDateTime) -> Result<Option<NaiveDate>, ValidationError> {
        let target_date = target.date();
        if let Some(text) = &self.date {
            return check_bound(parse_date(text)?, target_date).map(Some);
        }
        Ok(self
            .quick
            .map(|pick| QuickPick::from(pick).date_for(target_date)))
    }
}

/// "October 17, 2025"
pub fn long_date(at: NaiveDateTime) -> String {
    at.format("%B %-d, %Y").to_string()
}

/// "Oct 17, 2025"
pub fn short_date(at: NaiveDateTime) -> String {
    at.format("%b %-d, %Y").to_string()
}

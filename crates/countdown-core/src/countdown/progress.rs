use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::calculator::MS_PER_DAY;

/// How far along the journey from `start` to the target we are.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JourneyProgress {
    pub days_spent: u64,
    pub total_days: u64,
    /// 0.0 .. 100.0
    pub percent: f64,
}

impl JourneyProgress {
    pub fn compute(
        now: NaiveDateTime,
        start: NaiveDateTime,
        target: NaiveDateTime,
        is_complete: bool,
    ) -> Self {
        let total_ms = (target - start).num_milliseconds().max(0);
        let elapsed_ms = (now - start).num_milliseconds().max(0);

        // Ceiling division; total_ms is non-negative.
        let total_days = (total_ms + MS_PER_DAY - 1) / MS_PER_DAY;
        let days_spent = elapsed_ms / MS_PER_DAY;

        let percent = if is_complete || total_ms == 0 {
            100.0
        } else {
            (elapsed_ms as f64 / total_ms as f64 * 100.0).clamp(0.0, 100.0)
        };

        Self {
            days_spent: days_spent as u64,
            total_days: total_days as u64,
            percent,
        }
    }

    /// Percentage with one decimal, e.g. `"62.1%"`.
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }

    /// 0.0 .. 1.0, for gauge widgets.
    pub fn ratio(&self) -> f64 {
        self.percent / 100.0
    }
}

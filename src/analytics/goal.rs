//! Daily goal progress.
//!
//! Compares the sets logged on a given day against a daily target. "Today"
//! is always passed in by the caller.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::record::PracticeRecord;

/// Target used when nothing has been configured or stored.
pub const DEFAULT_DAILY_TARGET: u32 = 6;

// ---------------------------------------------------------------------------
// DailyTarget
// ---------------------------------------------------------------------------

/// A strictly positive number of sets per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct DailyTarget(u32);

impl DailyTarget {
    /// `None` unless `value` is positive.
    pub fn new(value: i64) -> Option<Self> {
        u32::try_from(value).ok().filter(|v| *v > 0).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Replace the target with `proposed` if it is positive.
    ///
    /// Returns `false` and keeps the current value otherwise.
    pub fn update(&mut self, proposed: i64) -> bool {
        match Self::new(proposed) {
            Some(target) => {
                *self = target;
                true
            }
            None => false,
        }
    }
}

impl Default for DailyTarget {
    fn default() -> Self {
        Self(DEFAULT_DAILY_TARGET)
    }
}

impl TryFrom<i64> for DailyTarget {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("daily target must be positive, got {value}"))
    }
}

impl From<DailyTarget> for u32 {
    fn from(target: DailyTarget) -> Self {
        target.0
    }
}

impl fmt::Display for DailyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Presentation bucket for goal progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalCategory {
    BelowHalf,
    OnTrack,
    Met,
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelowHalf => write!(f, "below half"),
            Self::OnTrack => write!(f, "on track"),
            Self::Met => write!(f, "met"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub sets_today: u64,
    /// Capped at 100; 0 for a non-positive target.
    pub progress_pct: f64,
    pub category: GoalCategory,
}

/// Progress of the sets logged on `today` towards `target`.
///
/// `target` is taken as a raw integer so a bad stored value degrades to 0%
/// progress instead of failing.
pub fn compute_goal_progress(
    records: &[PracticeRecord],
    today: NaiveDate,
    target: i64,
) -> GoalProgress {
    let sets_today: u64 = records
        .iter()
        .filter(|r| r.date == today)
        .map(|r| u64::from(metrics::total_sets(r)))
        .sum();

    let progress_pct = if target > 0 {
        (sets_today as f64 / target as f64 * 100.0).min(100.0)
    } else {
        0.0
    };

    let category = if i128::from(sets_today) >= i128::from(target) {
        GoalCategory::Met
    } else if progress_pct > 50.0 {
        GoalCategory::OnTrack
    } else {
        GoalCategory::BelowHalf
    };

    GoalProgress {
        sets_today,
        progress_pct,
        category,
    }
}

//! Time-bucketed aggregation of practice records.
//!
//! Groups a record snapshot by day, week, or month and produces chart-ready
//! points. Bucket accuracy always comes from the summed counts of the
//! bucket (`Σ correct / Σ attempted`), never from averaging per-record
//! accuracies, so a day with two questions cannot outweigh a day with two
//! hundred.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::record::{PracticeRecord, SubjectFilter};

/// Number of most recent points kept in daily mode.
pub const DAILY_WINDOW: usize = 30;

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

/// Bucketing resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One point per record, labelled by its date.
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            other => anyhow::bail!("unknown granularity '{other}' (expected daily, weekly or monthly)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Grouping key of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKey {
    /// Daily points are never merged, so the key carries the point's position.
    Day { date: NaiveDate, seq: usize },
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
}

impl BucketKey {
    fn label(&self) -> String {
        match self {
            Self::Day { date, .. } => date.format("%Y-%m-%d").to_string(),
            Self::Week { year, week } => format!("{year}-W{week:02}"),
            Self::Month { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1)
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|| format!("{year}-{month:02}")),
        }
    }
}

/// One aggregated data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    #[serde(skip)]
    pub key: BucketKey,
    pub label: String,
    /// `total_correct / total_attempted * 100`, 0 without attempts.
    pub accuracy_pct: f64,
    pub total_sets: u64,
    pub total_attempted: u64,
    pub total_correct: u64,
}

impl TimeBucket {
    fn empty(key: BucketKey) -> Self {
        Self {
            key,
            label: key.label(),
            accuracy_pct: 0.0,
            total_sets: 0,
            total_attempted: 0,
            total_correct: 0,
        }
    }

    fn add(&mut self, record: &PracticeRecord) {
        self.total_sets += u64::from(metrics::total_sets(record));
        self.total_attempted += u64::from(record.questions_attempted);
        self.total_correct += u64::from(record.correct_answers);
        self.accuracy_pct = metrics::accuracy_pct(self.total_correct, self.total_attempted);
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate `records` at `granularity`, keeping the default daily window.
pub fn aggregate_by_period(
    records: &[PracticeRecord],
    granularity: Granularity,
    filter: SubjectFilter,
) -> Vec<TimeBucket> {
    aggregate_with_window(records, granularity, filter, DAILY_WINDOW)
}

/// Aggregate `records` at `granularity`.
///
/// Records are filtered by subject, then stably sorted by date so sessions
/// sharing a date keep their input order. Daily mode emits one point per
/// record and keeps only the last `daily_window` points; weekly and monthly
/// modes merge records into buckets emitted in chronological order.
pub fn aggregate_with_window(
    records: &[PracticeRecord],
    granularity: Granularity,
    filter: SubjectFilter,
    daily_window: usize,
) -> Vec<TimeBucket> {
    let mut selected: Vec<&PracticeRecord> = records
        .iter()
        .filter(|r| filter.matches(r.subject))
        .collect();
    selected.sort_by_key(|r| r.date);

    tracing::debug!(
        granularity = %granularity,
        filter = %filter,
        records = selected.len(),
        "aggregating practice records"
    );

    match granularity {
        Granularity::Daily => {
            let skip = selected.len().saturating_sub(daily_window);
            selected
                .iter()
                .enumerate()
                .skip(skip)
                .map(|(seq, record)| {
                    let mut bucket = TimeBucket::empty(BucketKey::Day {
                        date: record.date,
                        seq,
                    });
                    bucket.add(record);
                    bucket
                })
                .collect()
        }
        Granularity::Weekly => group_by(&selected, |date| BucketKey::Week {
            year: date.year(),
            week: week_label(date),
        }),
        Granularity::Monthly => group_by(&selected, |date| BucketKey::Month {
            year: date.year(),
            month: date.month(),
        }),
    }
}

/// Merge date-sorted records into buckets, preserving first-seen order.
fn group_by<F>(records: &[&PracticeRecord], key_of: F) -> Vec<TimeBucket>
where
    F: Fn(NaiveDate) -> BucketKey,
{
    let mut buckets: Vec<TimeBucket> = Vec::new();
    let mut index: HashMap<BucketKey, usize> = HashMap::new();

    for record in records {
        let key = key_of(record.date);
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(TimeBucket::empty(key));
            buckets.len() - 1
        });
        buckets[slot].add(record);
    }

    buckets
}

/// Week number of `date` within its year.
///
/// `ceil((day_of_year + weekday_of_jan_1) / 7)` with a 0-based day of year
/// and Sunday = 0. This is not ISO-8601: a year starting on Sunday has a
/// week 0, and late December can land in week 53 in some years only.
pub fn week_label(date: NaiveDate) -> u32 {
    let day_of_year = date.ordinal0();
    let first_weekday = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|jan1| jan1.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (day_of_year + first_weekday).div_ceil(7)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

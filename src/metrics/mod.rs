//! Per-record derived metrics.
//!
//! Every function here is total: a zero denominator yields `0.0`, never
//! `NaN` or a panic. The ratio primitives are shared with the bucket
//! aggregator so that bucket accuracy is computed from summed counts.

use serde::Serialize;

use crate::record::PracticeRecord;

/// Statistics derived from a single [`PracticeRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordMetrics {
    pub total_sets: u32,
    /// `correct / attempted * 100`. Not clamped: a record with more correct
    /// answers than attempts reports more than 100.
    pub accuracy_pct: f64,
    /// Minutes per set.
    pub speed: f64,
}

/// Derive `total_sets`, accuracy and speed for one record.
pub fn compute_metrics(record: &PracticeRecord) -> RecordMetrics {
    let total_sets = total_sets(record);
    RecordMetrics {
        total_sets,
        accuracy_pct: accuracy_pct(
            u64::from(record.correct_answers),
            u64::from(record.questions_attempted),
        ),
        speed: speed(record.time_taken, total_sets),
    }
}

/// Sum of the four set counters.
pub fn total_sets(record: &PracticeRecord) -> u32 {
    record
        .lr_sets
        .saturating_add(record.di_sets)
        .saturating_add(record.vault_sets)
        .saturating_add(record.sectional_sets)
}

/// Percentage of correct answers; 0 when nothing was attempted.
pub fn accuracy_pct(correct: u64, attempted: u64) -> f64 {
    if attempted == 0 {
        0.0
    } else {
        (correct as f64 / attempted as f64) * 100.0
    }
}

/// Minutes per set; 0 when no sets were logged.
pub fn speed(minutes: f64, sets: u32) -> f64 {
    if sets == 0 {
        0.0
    } else {
        minutes / f64::from(sets)
    }
}

/// Round to two decimal places for display and chart output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

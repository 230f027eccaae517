//! Whole-log summaries: overall totals, per-subject breakdown, weak topics.

use std::collections::HashSet;

use serde::Serialize;

use crate::metrics;
use crate::record::{PracticeRecord, Subject};

/// Totals across every record in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub sessions: usize,
    pub total_sets: u64,
    pub total_minutes: f64,
    pub total_attempted: u64,
    pub total_correct: u64,
    pub accuracy_pct: f64,
    /// Minutes per set across the whole log.
    pub avg_speed: f64,
}

/// Totals for one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStat {
    pub subject: Subject,
    pub sessions: usize,
    pub total_sets: u64,
    pub total_attempted: u64,
    pub total_correct: u64,
    pub accuracy_pct: f64,
}

pub fn overall_summary(records: &[PracticeRecord]) -> OverallSummary {
    let total_sets: u64 = records.iter().map(|r| u64::from(metrics::total_sets(r))).sum();
    let total_minutes: f64 = records.iter().map(|r| r.time_taken).sum();
    let total_attempted: u64 = records.iter().map(|r| u64::from(r.questions_attempted)).sum();
    let total_correct: u64 = records.iter().map(|r| u64::from(r.correct_answers)).sum();

    let avg_speed = if total_sets == 0 {
        0.0
    } else {
        total_minutes / total_sets as f64
    };

    OverallSummary {
        sessions: records.len(),
        total_sets,
        total_minutes,
        total_attempted,
        total_correct,
        accuracy_pct: metrics::accuracy_pct(total_correct, total_attempted),
        avg_speed,
    }
}

/// Per-subject totals in the fixed subject order, skipping subjects with no
/// sessions.
pub fn subject_breakdown(records: &[PracticeRecord]) -> Vec<SubjectStat> {
    Subject::ALL
        .iter()
        .filter_map(|&subject| {
            let group: Vec<&PracticeRecord> =
                records.iter().filter(|r| r.subject == subject).collect();
            if group.is_empty() {
                return None;
            }

            let total_attempted: u64 = group.iter().map(|r| u64::from(r.questions_attempted)).sum();
            let total_correct: u64 = group.iter().map(|r| u64::from(r.correct_answers)).sum();

            Some(SubjectStat {
                subject,
                sessions: group.len(),
                total_sets: group.iter().map(|r| u64::from(metrics::total_sets(r))).sum(),
                total_attempted,
                total_correct,
                accuracy_pct: metrics::accuracy_pct(total_correct, total_attempted),
            })
        })
        .collect()
}

/// Distinct topics flagged as weak, in the order first seen. Blank topics
/// are skipped; comparison ignores surrounding whitespace and case.
pub fn weak_topics(records: &[PracticeRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| r.is_weak_topic)
        .map(|r| r.topic.trim())
        .filter(|topic| !topic.is_empty())
        .filter(|topic| seen.insert(topic.to_lowercase()))
        .map(str::to_string)
        .collect()
}

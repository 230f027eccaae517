//! Practice record model.
//!
//! A [`PracticeRecord`] is one logged study session. Records are owned by the
//! external store; everything in [`crate::metrics`] and [`crate::analytics`]
//! only reads them.
//!
//! Deserialization is deliberately forgiving: numeric fields accept JSON
//! numbers, numeric strings, `null`, or nothing at all, and anything that
//! cannot be read as a non-negative number becomes `0`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// Exam section a session was spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Subject {
    Lr,
    Di,
    Quant,
    Varc,
}

impl Subject {
    pub const ALL: [Subject; 4] = [Subject::Lr, Subject::Di, Subject::Quant, Subject::Varc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lr => "LR",
            Self::Di => "DI",
            Self::Quant => "QUANT",
            Self::Varc => "VARC",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LR" => Ok(Self::Lr),
            "DI" => Ok(Self::Di),
            "QUANT" => Ok(Self::Quant),
            "VARC" => Ok(Self::Varc),
            other => anyhow::bail!("unknown subject '{other}' (expected LR, DI, QUANT or VARC)"),
        }
    }
}

/// Subject selector for aggregation: every subject, or exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubjectFilter {
    #[default]
    All,
    Only(Subject),
}

impl SubjectFilter {
    pub fn matches(&self, subject: Subject) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == subject,
        }
    }
}

impl FromStr for SubjectFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for SubjectFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.pad("all"),
            Self::Only(subject) => subject.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// PracticeRecord
// ---------------------------------------------------------------------------

/// One logged practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    /// Opaque id assigned by the store at creation.
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    pub subject: Subject,
    #[serde(default)]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub lr_sets: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub di_sets: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub vault_sets: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sectional_sets: u32,
    /// Minutes spent.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub time_taken: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub questions_attempted: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub correct_answers: u32,
    /// Self-rated confidence, 1..=5.
    #[serde(default = "default_confidence", deserialize_with = "lenient_confidence")]
    pub confidence: u8,
    #[serde(default)]
    pub learnings: String,
    #[serde(default)]
    pub is_weak_topic: bool,
}

impl PracticeRecord {
    /// Empty session on `date` for `subject`; every count starts at zero.
    pub fn new(date: NaiveDate, subject: Subject) -> Self {
        Self {
            id: String::new(),
            date,
            subject,
            topic: String::new(),
            lr_sets: 0,
            di_sets: 0,
            vault_sets: 0,
            sectional_sets: 0,
            time_taken: 0.0,
            questions_attempted: 0,
            correct_answers: 0,
            confidence: default_confidence(),
            learnings: String::new(),
            is_weak_topic: false,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set counts in `lr, di, vault, sectional` order.
    pub fn with_sets(mut self, lr: u32, di: u32, vault: u32, sectional: u32) -> Self {
        self.lr_sets = lr;
        self.di_sets = di;
        self.vault_sets = vault;
        self.sectional_sets = sectional;
        self
    }

    pub fn with_time(mut self, minutes: f64) -> Self {
        self.time_taken = minutes.max(0.0);
        self
    }

    pub fn with_questions(mut self, attempted: u32, correct: u32) -> Self {
        self.questions_attempted = attempted;
        self.correct_answers = correct;
        self
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.clamp(1, 5);
        self
    }

    pub fn with_learnings(mut self, learnings: impl Into<String>) -> Self {
        self.learnings = learnings.into();
        self
    }

    pub fn weak(mut self, is_weak: bool) -> Self {
        self.is_weak_topic = is_weak;
        self
    }
}

// ---------------------------------------------------------------------------
// Lenient numeric coercion
// ---------------------------------------------------------------------------

fn default_confidence() -> u8 {
    3
}

/// Read a JSON value as a number, accepting numeric strings.
fn coerce_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(coerce_number)
        .map(|n| if n > 0.0 { n as u32 } else { 0 })
        .unwrap_or(0))
}

fn lenient_minutes<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_number).unwrap_or(0.0).max(0.0))
}

fn lenient_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(coerce_number)
        .map(|n| n.clamp(1.0, 5.0) as u8)
        .unwrap_or_else(default_confidence))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_record() {
        let json = r#"{
            "id": "r1",
            "date": "2024-03-01",
            "subject": "LR",
            "topic": "Arrangements",
            "lrSets": 2,
            "diSets": 1,
            "vaultSets": 0,
            "sectionalSets": 1,
            "timeTaken": 42.5,
            "questionsAttempted": 20,
            "correctAnswers": 15,
            "confidence": 4,
            "learnings": "Missed conditional constraints",
            "isWeakTopic": true
        }"#;
        let record: PracticeRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, "r1");
        assert_eq!(record.subject, Subject::Lr);
        assert_eq!(record.lr_sets, 2);
        assert_eq!(record.sectional_sets, 1);
        assert_eq!(record.time_taken, 42.5);
        assert_eq!(record.confidence, 4);
        assert!(record.is_weak_topic);
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let json = r#"{"date": "2024-03-01", "subject": "DI"}"#;
        let record: PracticeRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.lr_sets, 0);
        assert_eq!(record.questions_attempted, 0);
        assert_eq!(record.time_taken, 0.0);
        assert_eq!(record.confidence, 3);
        assert!(record.learnings.is_empty());
        assert!(!record.is_weak_topic);
    }

    #[test]
    fn numeric_strings_and_nulls_are_coerced() {
        let json = r#"{
            "date": "2024-03-01",
            "subject": "QUANT",
            "lrSets": "3",
            "diSets": null,
            "vaultSets": "abc",
            "sectionalSets": -2,
            "timeTaken": "12.5",
            "questionsAttempted": 7.9,
            "confidence": 9
        }"#;
        let record: PracticeRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.lr_sets, 3);
        assert_eq!(record.di_sets, 0);
        assert_eq!(record.vault_sets, 0);
        assert_eq!(record.sectional_sets, 0);
        assert_eq!(record.time_taken, 12.5);
        assert_eq!(record.questions_attempted, 7);
        assert_eq!(record.confidence, 5);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = PracticeRecord::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), Subject::Varc)
            .with_sets(1, 0, 0, 0);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["subject"], "VARC");
        assert_eq!(value["date"], "2024-03-01");
        assert_eq!(value["lrSets"], 1);
        assert!(value.get("isWeakTopic").is_some());
    }

    #[test]
    fn subject_parsing_is_case_insensitive() {
        assert_eq!("lr".parse::<Subject>().unwrap(), Subject::Lr);
        assert_eq!("Quant".parse::<Subject>().unwrap(), Subject::Quant);
        assert!("math".parse::<Subject>().is_err());
    }

    #[test]
    fn subject_filter_parsing() {
        assert_eq!("all".parse::<SubjectFilter>().unwrap(), SubjectFilter::All);
        assert_eq!(
            "di".parse::<SubjectFilter>().unwrap(),
            SubjectFilter::Only(Subject::Di)
        );
        assert!(SubjectFilter::All.matches(Subject::Varc));
        assert!(!SubjectFilter::Only(Subject::Lr).matches(Subject::Varc));
    }
}

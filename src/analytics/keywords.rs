//! Recurring-term analysis over session notes.
//!
//! A frequency heuristic, not language understanding: notes are joined,
//! lower-cased, stripped of punctuation and split on whitespace. Stop words
//! and short tokens are dropped, the rest are counted and the most frequent
//! terms reported. Ties rank by first appearance in the joined text, so the
//! result is a pure function of the record list and its order.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::record::PracticeRecord;

/// Default number of terms reported.
pub const TOP_KEYWORDS: usize = 5;

/// Tokens with this many characters or fewer are ignored.
const MIN_TOKEN_CHARS: usize = 3;

/// Punctuation removed before splitting. Removed, not replaced with a space.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.,!?;:"()]"#).expect("punctuation regex must compile"));

/// Closed stop-word list: articles, pronouns, conjunctions, prepositions and
/// a few auxiliaries. Only entries longer than three characters matter since
/// shorter tokens are dropped anyway, but the full list is kept for clarity.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "nor", "so", "yet", "for", "if", "then", "than",
    "because", "while", "although", "though", "unless", "since", "whether", "i", "me", "my",
    "mine", "myself", "we", "us", "our", "ours", "you", "your", "yours", "he", "him", "his",
    "she", "her", "hers", "it", "its", "they", "them", "their", "theirs", "this", "that",
    "these", "those", "what", "which", "who", "whom", "whose", "in", "on", "at", "by", "of",
    "to", "from", "with", "without", "into", "onto", "about", "above", "below", "over",
    "under", "after", "before", "between", "through", "during", "against", "among", "upon",
    "within", "is", "am", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "having", "do", "does", "did", "will", "would", "shall", "should", "can", "could", "may",
    "might", "must", "not", "also", "just", "very", "some", "more", "most", "such", "each",
    "other", "there", "here", "when", "where", "how", "all", "any", "both", "only", "own",
    "same", "too", "again", "once",
];

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A ranked term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordStat {
    pub term: String,
    pub count: usize,
    /// 1-based position in the ranking.
    pub rank: usize,
}

/// Outcome of a keyword analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "keywords", rename_all = "kebab-case")]
pub enum KeywordReport {
    Ranked(Vec<KeywordStat>),
    /// No record has any notes.
    NoData,
    /// Notes exist, but nothing survived stop-word and length filtering.
    InsufficientData,
}

impl KeywordReport {
    pub fn keywords(&self) -> &[KeywordStat] {
        match self {
            Self::Ranked(stats) => stats,
            Self::NoData | Self::InsufficientData => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Rank the top [`TOP_KEYWORDS`] terms across all notes.
pub fn analyze_keywords(records: &[PracticeRecord]) -> KeywordReport {
    analyze_keywords_top(records, TOP_KEYWORDS)
}

/// Rank the `limit` most frequent terms across all notes.
pub fn analyze_keywords_top(records: &[PracticeRecord], limit: usize) -> KeywordReport {
    let corpus = records
        .iter()
        .map(|r| r.learnings.as_str())
        .filter(|notes| !notes.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if corpus.trim().is_empty() {
        return KeywordReport::NoData;
    }

    let counts = count_terms(&tokenize(&corpus));
    if counts.is_empty() {
        return KeywordReport::InsufficientData;
    }

    let mut ranked = counts;
    // Stable: equal counts keep first-seen order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    tracing::debug!(terms = ranked.len(), "ranked note keywords");

    KeywordReport::Ranked(
        ranked
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (term, count))| KeywordStat {
                term,
                count,
                rank: i + 1,
            })
            .collect(),
    )
}

/// Lower-case, strip punctuation, split on whitespace, and drop stop words
/// and short tokens.
fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = PUNCTUATION_RE.replace_all(&lowered, "");
    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Count tokens, returning `(term, count)` pairs in first-seen order.
fn count_terms(tokens: &[String]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for token in tokens {
        match index.get(token.as_str()) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(token.as_str(), counts.len());
                counts.push((token.clone(), 1));
            }
        }
    }

    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Subject;
    use chrono::NaiveDate;

    fn notes(text: &str) -> PracticeRecord {
        PracticeRecord::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), Subject::Lr)
            .with_learnings(text)
    }

    #[test]
    fn tokenize_strips_punctuation_and_filters() {
        let tokens = tokenize("The Venn diagram, again. Careless (calculation)!");
        assert_eq!(tokens, vec!["venn", "diagram", "careless", "calculation"]);
    }

    #[test]
    fn count_terms_preserves_first_seen_order() {
        let tokens: Vec<String> = ["beta", "alpha", "beta", "gamma"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let counts = count_terms(&tokens);
        assert_eq!(
            counts,
            vec![
                ("beta".to_string(), 2),
                ("alpha".to_string(), 1),
                ("gamma".to_string(), 1)
            ]
        );
    }

    #[test]
    fn ranks_by_count_then_first_occurrence() {
        let records = vec![
            notes("silly errors in percentages"),
            notes("percentages again, silly rounding errors"),
            notes("rounding rounding"),
        ];
        let report = analyze_keywords(&records);
        let terms: Vec<(&str, usize)> = report
            .keywords()
            .iter()
            .map(|k| (k.term.as_str(), k.count))
            .collect();

        assert_eq!(
            terms,
            vec![
                ("rounding", 3),
                ("silly", 2),
                ("errors", 2),
                ("percentages", 2),
            ]
        );
        assert_eq!(report.keywords()[0].rank, 1);
    }

    #[test]
    fn returns_at_most_limit_terms() {
        let records = vec![notes("alpha bravo charlie delta echoes foxtrot golfer")];
        assert_eq!(analyze_keywords(&records).keywords().len(), TOP_KEYWORDS);
        assert_eq!(analyze_keywords_top(&records, 2).keywords().len(), 2);
    }

    #[test]
    fn empty_notes_report_no_data() {
        let records = vec![notes(""), notes("")];
        assert_eq!(analyze_keywords(&records), KeywordReport::NoData);
        assert_eq!(analyze_keywords(&[]), KeywordReport::NoData);
    }

    #[test]
    fn only_short_or_stop_words_report_insufficient_data() {
        let records = vec![notes("the and was it"), notes("they were with them")];
        assert_eq!(analyze_keywords(&records), KeywordReport::InsufficientData);
    }
}

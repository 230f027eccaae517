/// End-to-end analytics tests over literal practice logs.
///
/// Covers bucket composition across granularities, keyword ranking
/// determinism, and goal progress, driven through the public library API.
use chrono::NaiveDate;
use studylog::analytics::aggregator::{Granularity, aggregate_by_period, week_label};
use studylog::analytics::goal::{GoalCategory, compute_goal_progress};
use studylog::analytics::keywords::{KeywordReport, analyze_keywords};
use studylog::metrics::{self, compute_metrics};
use studylog::record::{PracticeRecord, Subject, SubjectFilter};

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn parse_records(json: &str) -> Vec<PracticeRecord> {
    serde_json::from_str(json).unwrap()
}

fn mixed_log() -> Vec<PracticeRecord> {
    vec![
        PracticeRecord::new(day("2024-02-28"), Subject::Lr)
            .with_sets(2, 0, 0, 0)
            .with_questions(12, 9),
        PracticeRecord::new(day("2024-03-01"), Subject::Di)
            .with_sets(0, 3, 0, 0)
            .with_questions(20, 11),
        PracticeRecord::new(day("2024-03-01"), Subject::Lr)
            .with_sets(1, 0, 1, 0)
            .with_questions(8, 8),
        PracticeRecord::new(day("2024-03-15"), Subject::Quant)
            .with_sets(0, 0, 0, 1)
            .with_questions(0, 0),
        PracticeRecord::new(day("2024-04-02"), Subject::Lr)
            .with_sets(4, 0, 0, 0)
            .with_questions(30, 12),
    ]
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[test]
fn monthly_scenario_from_raw_json() {
    let records = parse_records(
        r#"[
        {"date":"2024-03-01","subject":"LR","lrSets":2,"diSets":0,"vaultSets":0,"sectionalSets":0,
         "timeTaken":20,"questionsAttempted":10,"correctAnswers":8},
        {"date":"2024-03-02","subject":"LR","lrSets":1,"diSets":1,"vaultSets":0,"sectionalSets":0,
         "timeTaken":15,"questionsAttempted":8,"correctAnswers":4}
    ]"#,
    );

    let buckets = aggregate_by_period(&records, Granularity::Monthly, SubjectFilter::All);

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].label, "Mar 2024");
    assert_eq!(buckets[0].total_sets, 4);
    assert_eq!(metrics::round2(buckets[0].accuracy_pct), 66.67);
}

#[test]
fn bucket_accuracy_is_not_mean_of_record_accuracies() {
    let records = vec![
        PracticeRecord::new(day("2024-06-03"), Subject::Varc).with_questions(10, 10),
        PracticeRecord::new(day("2024-06-04"), Subject::Varc).with_questions(100, 0),
    ];
    let buckets = aggregate_by_period(&records, Granularity::Weekly, SubjectFilter::All);

    assert_eq!(buckets.len(), 1);
    assert_eq!(metrics::round2(buckets[0].accuracy_pct), 9.09);
    assert_ne!(metrics::round2(buckets[0].accuracy_pct), 50.0);
}

#[test]
fn bucket_sets_sum_to_filtered_input_sets() {
    let records = mixed_log();

    for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
        for filter in [
            SubjectFilter::All,
            SubjectFilter::Only(Subject::Lr),
            SubjectFilter::Only(Subject::Di),
        ] {
            let expected: u64 = records
                .iter()
                .filter(|r| filter.matches(r.subject))
                .map(|r| u64::from(compute_metrics(r).total_sets))
                .sum();
            let actual: u64 = aggregate_by_period(&records, granularity, filter)
                .iter()
                .map(|b| b.total_sets)
                .sum();
            assert_eq!(actual, expected, "{granularity} / {filter}");
        }
    }
}

#[test]
fn monthly_buckets_are_chronological() {
    let mut records = mixed_log();
    records.reverse();
    let labels: Vec<String> = aggregate_by_period(&records, Granularity::Monthly, SubjectFilter::All)
        .into_iter()
        .map(|b| b.label)
        .collect();

    assert_eq!(labels, vec!["Feb 2024", "Mar 2024", "Apr 2024"]);
}

#[test]
fn aggregation_does_not_touch_input() {
    let records = mixed_log();
    let before = records.clone();
    let _ = aggregate_by_period(&records, Granularity::Weekly, SubjectFilter::All);
    assert_eq!(records, before);
}

#[test]
fn week_numbering_within_one_year() {
    // 2024-01-01 (Monday) and 2024-01-07 (Sunday) share a week label.
    assert_eq!(week_label(day("2024-01-01")), week_label(day("2024-01-07")));

    let records = vec![
        PracticeRecord::new(day("2024-01-01"), Subject::Lr).with_sets(1, 0, 0, 0),
        PracticeRecord::new(day("2024-01-07"), Subject::Lr).with_sets(1, 0, 0, 0),
    ];
    let buckets = aggregate_by_period(&records, Granularity::Weekly, SubjectFilter::All);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].label, "2024-W01");
}

#[test]
fn week_numbering_across_year_boundary() {
    // 2023 starts on a Sunday: Dec 31 is day 364, ceil(364 / 7) = 52.
    assert_eq!(week_label(day("2023-12-31")), 52);
    assert_eq!(week_label(day("2024-01-01")), 1);

    let records = vec![
        PracticeRecord::new(day("2023-12-31"), Subject::Lr).with_sets(1, 0, 0, 0),
        PracticeRecord::new(day("2024-01-01"), Subject::Lr).with_sets(2, 0, 0, 0),
    ];
    let buckets = aggregate_by_period(&records, Granularity::Weekly, SubjectFilter::All);

    let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["2023-W52", "2024-W01"]);
}

#[test]
fn late_december_can_fall_in_week_53() {
    // 2022 starts on a Saturday (index 6): Dec 31 is day 364, ceil(370 / 7) = 53.
    assert_eq!(week_label(day("2022-12-31")), 53);
    // 2024 starts on a Monday and is a leap year: Dec 31 is day 365, ceil(366 / 7) = 53.
    assert_eq!(week_label(day("2024-12-31")), 53);
    // 2023: ceil(364 / 7) = 52.
    assert_eq!(week_label(day("2023-12-31")), 52);
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

fn with_notes(date: &str, notes: &str) -> PracticeRecord {
    PracticeRecord::new(day(date), Subject::Lr).with_learnings(notes)
}

#[test]
fn keyword_ranking_is_deterministic() {
    let records = vec![
        with_notes("2024-03-01", "Careless calculation in percentages."),
        with_notes("2024-03-02", "Calculation slip, careless reading"),
        with_notes("2024-03-03", "Skipped reading the whole passage"),
    ];

    let first = analyze_keywords(&records);
    for _ in 0..5 {
        assert_eq!(analyze_keywords(&records), first);
    }

    let terms: Vec<&str> = first.keywords().iter().map(|k| k.term.as_str()).collect();
    assert_eq!(
        terms,
        vec!["careless", "calculation", "reading", "percentages", "slip"]
    );
}

#[test]
fn reordering_records_without_ties_or_shared_terms_keeps_result() {
    let a = with_notes("2024-03-01", "geometry geometry geometry");
    let b = with_notes("2024-03-02", "algebra algebra");

    let forward = analyze_keywords(&[a.clone(), b.clone()]);
    let backward = analyze_keywords(&[b, a]);
    assert_eq!(forward, backward);
}

#[test]
fn tied_terms_rank_by_first_occurrence() {
    let forward = analyze_keywords(&[
        with_notes("2024-03-01", "algebra"),
        with_notes("2024-03-02", "geometry"),
    ]);
    let backward = analyze_keywords(&[
        with_notes("2024-03-02", "geometry"),
        with_notes("2024-03-01", "algebra"),
    ]);

    assert_eq!(forward.keywords()[0].term, "algebra");
    assert_eq!(backward.keywords()[0].term, "geometry");
}

#[test]
fn keyword_sentinels_are_distinct() {
    let empty = vec![with_notes("2024-03-01", ""), with_notes("2024-03-02", "")];
    let stop_only = vec![with_notes("2024-03-01", "the cat and the dog, with them.")];

    assert_eq!(analyze_keywords(&empty), KeywordReport::NoData);
    assert_eq!(analyze_keywords(&stop_only), KeywordReport::InsufficientData);
    assert_ne!(KeywordReport::NoData, KeywordReport::InsufficientData);
}

#[test]
fn keyword_report_serializes_with_status_tag() {
    let report = analyze_keywords(&[with_notes("2024-03-01", "inference inference")]);
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["status"], "ranked");
    assert_eq!(value["keywords"][0]["term"], "inference");
    assert_eq!(value["keywords"][0]["count"], 2);

    let none = serde_json::to_value(KeywordReport::NoData).unwrap();
    assert_eq!(none["status"], "no-data");
}

// ---------------------------------------------------------------------------
// Goal progress
// ---------------------------------------------------------------------------

#[test]
fn goal_progress_examples() {
    let today = day("2024-03-01");
    let records = vec![
        PracticeRecord::new(today, Subject::Lr).with_sets(3, 0, 0, 0),
        PracticeRecord::new(today, Subject::Di).with_sets(0, 2, 1, 0),
        PracticeRecord::new(day("2024-02-29"), Subject::Di).with_sets(0, 9, 0, 0),
    ];

    let met = compute_goal_progress(&records, today, 6);
    assert_eq!(met.sets_today, 6);
    assert_eq!(met.progress_pct, 100.0);
    assert_eq!(met.category, GoalCategory::Met);

    let nothing = compute_goal_progress(&records, day("2024-03-02"), 6);
    assert_eq!(nothing.sets_today, 0);
    assert_eq!(nothing.progress_pct, 0.0);
    assert_eq!(nothing.category, GoalCategory::BelowHalf);

    for target in [0, -1, -100] {
        assert_eq!(compute_goal_progress(&records, today, target).progress_pct, 0.0);
    }
}

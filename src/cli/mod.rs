//! CLI command implementations for studylog.
//!
//! Provides subcommand handlers for:
//! - `studylog add` — log a practice session
//! - `studylog list` / `delete` — inspect and prune the log
//! - `studylog trends` — accuracy and volume per day, week or month
//! - `studylog keywords` — recurring terms in session notes
//! - `studylog goal` / `target` — daily goal progress and target
//! - `studylog summary` — overall and per-subject totals, weak topics
//! - `studylog tip` — the study tip of the day
//! - `studylog config show|init|set|reset` — configuration management

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;

use crate::analytics::aggregator::{self, Granularity, TimeBucket};
use crate::analytics::goal::{self, DailyTarget, GoalCategory, GoalProgress};
use crate::analytics::insights::{self, OverallSummary, SubjectStat};
use crate::analytics::keywords::{self, KeywordReport};
use crate::config::{self, StudylogConfig};
use crate::metrics::{self, round2};
use crate::record::{PracticeRecord, SubjectFilter};
use crate::store::{FileStore, PracticeLog};
use crate::tips;

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

fn open_log(cfg: &StudylogConfig) -> PracticeLog<FileStore> {
    PracticeLog::new(FileStore::in_dir(&cfg.data_dir()))
}

fn default_target(cfg: &StudylogConfig) -> DailyTarget {
    cfg.goal.daily_target
}

// ---------------------------------------------------------------------------
// studylog add / list / delete
// ---------------------------------------------------------------------------

/// Store a new session and echo its derived metrics.
pub fn run_add(cfg: &StudylogConfig, record: PracticeRecord) -> Result<()> {
    let mut log = open_log(cfg);
    let stored = log.add_record(record)?;
    let m = metrics::compute_metrics(&stored);

    println!(
        "{} Logged {} session on {} ({})",
        "✓".green().bold(),
        stored.subject.to_string().bold(),
        stored.date,
        stored.id.dimmed()
    );
    println!(
        "  Sets: {}  Accuracy: {:.1}%  Speed: {:.1} min/set",
        m.total_sets, m.accuracy_pct, m.speed
    );
    Ok(())
}

/// List stored sessions, oldest first.
pub fn run_list(cfg: &StudylogConfig, filter: SubjectFilter, format: OutputFormat) -> Result<()> {
    let mut records: Vec<PracticeRecord> = open_log(cfg)
        .records()?
        .into_iter()
        .filter(|r| filter.matches(r.subject))
        .collect();
    records.sort_by_key(|r| r.date);

    if records.is_empty() {
        println!(
            "{}",
            "No sessions logged yet. Add one with `studylog add`.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Csv => print_records_csv(&records),
        OutputFormat::Table => print_records_table(&records),
    }
    Ok(())
}

fn print_records_table(records: &[PracticeRecord]) {
    println!("{}", "Practice Sessions".bold().cyan());
    println!("{}", "=".repeat(78));
    println!(
        "  {:<10} {:<5} {:<20} {:>5} {:>8} {:>8}  {}",
        "Date", "Subj", "Topic", "Sets", "Acc %", "Min/set", "Id"
    );
    println!("  {}", "-".repeat(76));

    for (i, record) in records.iter().enumerate() {
        let m = metrics::compute_metrics(record);
        let topic = if record.is_weak_topic {
            format!("{} *", truncate(&record.topic, 18))
        } else {
            truncate(&record.topic, 20)
        };
        let line = format!(
            "  {:<10} {:<5} {:<20} {:>5} {:>7.1}% {:>8.1}  {}",
            record.date.to_string(),
            record.subject,
            topic,
            m.total_sets,
            m.accuracy_pct,
            m.speed,
            truncate(&record.id, 8),
        );
        if i % 2 == 0 {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_records_csv(records: &[PracticeRecord]) {
    println!("id,date,subject,topic,total_sets,attempted,correct,accuracy_pct,speed,weak");
    for r in records {
        let m = metrics::compute_metrics(r);
        println!(
            "{},{},{},{},{},{},{},{:.2},{:.2},{}",
            r.id,
            r.date,
            r.subject,
            csv_field(&r.topic),
            m.total_sets,
            r.questions_attempted,
            r.correct_answers,
            m.accuracy_pct,
            m.speed,
            r.is_weak_topic,
        );
    }
}

/// Delete a session by id.
pub fn run_delete(cfg: &StudylogConfig, id: &str) -> Result<()> {
    if open_log(cfg).delete_record(id)? {
        println!("{} Deleted {}", "✓".green().bold(), id);
    } else {
        println!("{}", format!("No session with id {id}.").yellow());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// studylog trends
// ---------------------------------------------------------------------------

/// Show accuracy and volume per period.
pub fn run_trends(
    cfg: &StudylogConfig,
    granularity: Option<Granularity>,
    filter: SubjectFilter,
    format: OutputFormat,
) -> Result<()> {
    let granularity = granularity.unwrap_or(cfg.analytics.default_granularity);
    let records = open_log(cfg).records()?;
    let buckets = aggregator::aggregate_with_window(
        &records,
        granularity,
        filter,
        cfg.analytics.daily_window,
    );

    if buckets.is_empty() {
        println!(
            "{}",
            format!("No sessions match subject filter '{filter}'.").yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_trends_json(&buckets)?,
        OutputFormat::Csv => print_trends_csv(&buckets),
        OutputFormat::Table => print_trends_table(&buckets, granularity, filter),
    }
    Ok(())
}

fn print_trends_table(buckets: &[TimeBucket], granularity: Granularity, filter: SubjectFilter) {
    println!(
        "{}",
        format!("Trends — {granularity}, subject {filter}").bold().cyan()
    );
    println!("{}", "=".repeat(50));
    println!(
        "  {:<12} {:>6} {:>10} {:>9}",
        "Period", "Sets", "Attempted", "Acc %"
    );
    println!("  {}", "-".repeat(48));

    for bucket in buckets {
        println!(
            "  {:<12} {:>6} {:>10} {:>8.2}%",
            bucket.label,
            format_number(bucket.total_sets),
            format_number(bucket.total_attempted),
            round2(bucket.accuracy_pct),
        );
    }
}

fn print_trends_json(buckets: &[TimeBucket]) -> Result<()> {
    let values: Vec<_> = buckets
        .iter()
        .map(|b| {
            serde_json::json!({
                "label": b.label,
                "accuracy_pct": round2(b.accuracy_pct),
                "total_sets": b.total_sets,
                "total_attempted": b.total_attempted,
                "total_correct": b.total_correct,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

fn print_trends_csv(buckets: &[TimeBucket]) {
    println!("label,accuracy_pct,total_sets,total_attempted,total_correct");
    for b in buckets {
        println!(
            "{},{:.2},{},{},{}",
            csv_field(&b.label),
            b.accuracy_pct,
            b.total_sets,
            b.total_attempted,
            b.total_correct,
        );
    }
}

// ---------------------------------------------------------------------------
// studylog keywords
// ---------------------------------------------------------------------------

/// Show the most frequent terms in session notes.
pub fn run_keywords(cfg: &StudylogConfig, format: OutputFormat) -> Result<()> {
    let records = open_log(cfg).records()?;
    let report = keywords::analyze_keywords_top(&records, cfg.analytics.top_keywords);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => {
            println!("rank,term,count");
            for k in report.keywords() {
                println!("{},{},{}", k.rank, k.term, k.count);
            }
        }
        OutputFormat::Table => print_keywords_table(&report),
    }
    Ok(())
}

fn print_keywords_table(report: &KeywordReport) {
    match report {
        KeywordReport::NoData => {
            println!(
                "{}",
                "No notes to analyze yet. Log some learnings with your sessions first.".yellow()
            );
        }
        KeywordReport::InsufficientData => {
            println!(
                "{}",
                "Not enough detail in your notes to spot patterns. Try describing mistakes in a few more words."
                    .yellow()
            );
        }
        KeywordReport::Ranked(stats) => {
            println!("{}", "Recurring Themes in Your Notes".bold().cyan());
            println!("{}", "=".repeat(40));
            for k in stats {
                println!(
                    "  {:>2}. {:<24} {:>4}×",
                    k.rank,
                    truncate(&k.term, 24),
                    k.count
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// studylog goal / target
// ---------------------------------------------------------------------------

/// Show progress towards the daily target on `today`.
pub fn run_goal(cfg: &StudylogConfig, today: NaiveDate, format: OutputFormat) -> Result<()> {
    let log = open_log(cfg);
    let target = log.daily_target(default_target(cfg))?;
    let records = log.records()?;
    let progress = goal::compute_goal_progress(&records, today, i64::from(target.get()));

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "date": today.to_string(),
                "target": target.get(),
                "sets_today": progress.sets_today,
                "progress_pct": round2(progress.progress_pct),
                "category": progress.category,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            println!("date,target,sets_today,progress_pct,category");
            println!(
                "{},{},{},{:.2},{}",
                today,
                target,
                progress.sets_today,
                progress.progress_pct,
                progress.category
            );
        }
        OutputFormat::Table => print_goal_table(today, target, &progress),
    }
    Ok(())
}

fn print_goal_table(today: NaiveDate, target: DailyTarget, progress: &GoalProgress) {
    println!("{}", format!("Daily Goal — {today}").bold().cyan());
    println!("{}", "=".repeat(40));
    println!(
        "  {} / {} sets  {}  {:.0}%",
        progress.sets_today,
        target,
        colorize_category(progress.category, &progress_bar(progress.progress_pct, 20)),
        progress.progress_pct
    );
    println!(
        "  {} {}",
        "Status:".bold(),
        colorize_category(progress.category, &progress.category.to_string())
    );
}

/// Update the stored daily target. Non-positive values are rejected and the
/// previous target kept.
pub fn run_target(cfg: &StudylogConfig, value: &str) -> Result<()> {
    let mut log = open_log(cfg);
    let accepted = match value.trim().parse::<i64>() {
        Ok(proposed) => log.set_daily_target(proposed)?,
        Err(_) => false,
    };

    let current = log.daily_target(default_target(cfg))?;
    if accepted {
        println!(
            "{} Daily target set to {} sets",
            "✓".green().bold(),
            current
        );
    } else {
        println!(
            "{}",
            format!("Target must be a positive whole number; keeping {current}.").yellow()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// studylog summary
// ---------------------------------------------------------------------------

/// Overall totals, per-subject breakdown and weak topics.
pub fn run_summary(cfg: &StudylogConfig, format: OutputFormat) -> Result<()> {
    let records = open_log(cfg).records()?;
    let overall = insights::overall_summary(&records);
    let subjects = insights::subject_breakdown(&records);
    let weak = insights::weak_topics(&records);

    if overall.sessions == 0 {
        println!(
            "{}",
            "No sessions logged yet. Add one with `studylog add`.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "overall": overall,
                "subjects": subjects,
                "weak_topics": weak,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => print_summary_csv(&subjects),
        OutputFormat::Table => print_summary_table(&overall, &subjects, &weak),
    }
    Ok(())
}

fn print_summary_table(overall: &OverallSummary, subjects: &[SubjectStat], weak: &[String]) {
    println!("{}", "Practice Summary".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Sessions:    ".bold(), overall.sessions);
    println!("  {} {}", "Total sets:  ".bold(), format_number(overall.total_sets));
    println!("  {} {:.0}", "Minutes:     ".bold(), overall.total_minutes);
    println!("  {} {:.1}%", "Accuracy:    ".bold(), overall.accuracy_pct);
    println!("  {} {:.1} min/set", "Speed:       ".bold(), overall.avg_speed);
    println!();

    println!("{}", "By Subject".bold().cyan());
    println!(
        "  {:<6} {:>8} {:>6} {:>10} {:>8}",
        "Subj", "Sessions", "Sets", "Attempted", "Acc %"
    );
    println!("  {}", "-".repeat(42));
    for s in subjects {
        println!(
            "  {:<6} {:>8} {:>6} {:>10} {:>7.1}%",
            s.subject.to_string(),
            s.sessions,
            s.total_sets,
            s.total_attempted,
            s.accuracy_pct
        );
    }

    if !weak.is_empty() {
        println!();
        println!("{}", "Weak Topics".bold().cyan());
        for topic in weak {
            println!("  {} {}", "•".red(), topic);
        }
    }
}

fn print_summary_csv(subjects: &[SubjectStat]) {
    println!("subject,sessions,total_sets,total_attempted,total_correct,accuracy_pct");
    for s in subjects {
        println!(
            "{},{},{},{},{},{:.2}",
            s.subject, s.sessions, s.total_sets, s.total_attempted, s.total_correct, s.accuracy_pct
        );
    }
}

// ---------------------------------------------------------------------------
// studylog tip
// ---------------------------------------------------------------------------

pub fn run_tip(today: NaiveDate) -> Result<()> {
    println!("{} {}", "Tip:".bold().cyan(), tips::tip_for_day(today));
    Ok(())
}

// ---------------------------------------------------------------------------
// studylog config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective studylog Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.studylog/config.toml", global_exists);
    print_source(".studylog.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "STUDYLOG_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            format!("{name} (not found)").dimmed()
        );
    }
}

/// Initialize a default config file at `~/.studylog/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field if it contains a separator, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Fixed-width bar for a 0–100 percentage.
fn progress_bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn colorize_category(category: GoalCategory, text: &str) -> colored::ColoredString {
    match category {
        GoalCategory::Met => text.green(),
        GoalCategory::OnTrack => text.yellow(),
        GoalCategory::BelowHalf => text.red(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("Mar 2024"), "Mar 2024");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(50.0, 4), "██░░");
        assert_eq!(progress_bar(100.0, 4), "████");
        assert_eq!(progress_bar(150.0, 4), "████");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }
}

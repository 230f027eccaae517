use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use studylog::analytics::aggregator::Granularity;
use studylog::cli::{self, OutputFormat};
use studylog::config;
use studylog::logging;
use studylog::record::{PracticeRecord, Subject, SubjectFilter};

#[derive(Debug, Parser)]
#[command(name = "studylog")]
#[command(about = "Log practice sessions and track accuracy, volume and recurring mistakes")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log a practice session
    Add {
        /// Subject: LR, DI, QUANT or VARC
        #[arg(long)]
        subject: Subject,
        /// Session date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        topic: String,
        #[arg(long, default_value_t = 0)]
        lr_sets: u32,
        #[arg(long, default_value_t = 0)]
        di_sets: u32,
        #[arg(long, default_value_t = 0)]
        vault_sets: u32,
        #[arg(long, default_value_t = 0)]
        sectional_sets: u32,
        /// Minutes spent
        #[arg(long, default_value_t = 0.0)]
        time: f64,
        #[arg(long, default_value_t = 0)]
        attempted: u32,
        #[arg(long, default_value_t = 0)]
        correct: u32,
        /// Self-rated confidence, 1-5
        #[arg(long, default_value_t = 3)]
        confidence: u8,
        /// Free-text notes on what went wrong or right
        #[arg(long, default_value = "")]
        learnings: String,
        /// Flag the topic as weak
        #[arg(long)]
        weak: bool,
    },
    /// List logged sessions
    List {
        /// Subject filter: all, LR, DI, QUANT, VARC
        #[arg(long, default_value = "all")]
        subject: SubjectFilter,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Delete a session by id
    Delete { id: String },
    /// Accuracy and volume per day, week or month
    Trends {
        /// daily, weekly or monthly (default from config)
        #[arg(long)]
        granularity: Option<Granularity>,
        #[arg(long, default_value = "all")]
        subject: SubjectFilter,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Recurring terms in session notes
    Keywords {
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Progress towards today's set target
    Goal {
        /// Day to check (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Set the daily set target (positive whole number)
    Target {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Overall and per-subject totals, weak topics
    Summary {
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the study tip of the day
    Tip,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config to ~/.studylog/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a value by dotted key, e.g. goal.daily_target 8
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    let today = Local::now().date_naive();

    // Logging problems must never stop a command.
    let _guard = match logging::init(&cfg.logging, &cfg.data_dir()) {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("studylog: logging disabled: {error:#}");
            None
        }
    };

    match app.command {
        Commands::Add {
            subject,
            date,
            topic,
            lr_sets,
            di_sets,
            vault_sets,
            sectional_sets,
            time,
            attempted,
            correct,
            confidence,
            learnings,
            weak,
        } => {
            let record = PracticeRecord::new(date.unwrap_or(today), subject)
                .with_topic(topic)
                .with_sets(lr_sets, di_sets, vault_sets, sectional_sets)
                .with_time(time)
                .with_questions(attempted, correct)
                .with_confidence(confidence)
                .with_learnings(learnings)
                .weak(weak);
            cli::run_add(&cfg, record)
        }
        Commands::List { subject, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_list(&cfg, subject, fmt)
        }
        Commands::Delete { id } => cli::run_delete(&cfg, &id),
        Commands::Trends {
            granularity,
            subject,
            format,
        } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_trends(&cfg, granularity, subject, fmt)
        }
        Commands::Keywords { format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_keywords(&cfg, fmt)
        }
        Commands::Goal { date, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_goal(&cfg, date.unwrap_or(today), fmt)
        }
        Commands::Target { value } => cli::run_target(&cfg, &value),
        Commands::Summary { format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_summary(&cfg, fmt)
        }
        Commands::Tip => cli::run_tip(today),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

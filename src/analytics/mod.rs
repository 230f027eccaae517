//! Derived views over a practice-log snapshot.
//!
//! - [`aggregator`]: day / week / month buckets for charting
//! - [`keywords`]: recurring terms in session notes
//! - [`goal`]: progress towards the daily set target
//! - [`insights`]: overall totals, per-subject breakdown, weak topics
//!
//! Every entry point is a pure function of the records it is given.

pub mod aggregator;
pub mod goal;
pub mod insights;
pub mod keywords;

pub use aggregator::{Granularity, TimeBucket, aggregate_by_period};
pub use goal::{DailyTarget, GoalCategory, GoalProgress, compute_goal_progress};
pub use keywords::{KeywordReport, KeywordStat, analyze_keywords};

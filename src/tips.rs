//! Static study tips shown alongside reports.

use chrono::{Datelike, NaiveDate};

pub const TIPS: &[&str] = &[
    "Review every wrong answer before starting a new set.",
    "Time each set; speed matters as much as accuracy on exam day.",
    "Write down the trap you fell for, not just the right answer.",
    "Revisit weak topics within three days while the mistakes are fresh.",
    "Mix one sectional into every week to build stamina.",
    "Skip and return: do not let one question eat the whole set.",
    "Read the full DI table headers before touching the questions.",
];

/// The tip for `date`, rotating daily.
pub fn tip_for_day(date: NaiveDate) -> &'static str {
    TIPS[date.ordinal0() as usize % TIPS.len()]
}

//! Personal study-practice log.
//!
//! Records practice sessions and derives metrics from them: per-session
//! accuracy and speed, accuracy/volume trends by day, week or month,
//! recurring terms in session notes, and progress towards a daily set target.
//!
//! The analytics in [`metrics`] and [`analytics`] are pure functions over a
//! record snapshot. Persistence lives in [`store`] and is only driven by the
//! [`cli`].

pub mod analytics;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod record;
pub mod store;
pub mod tips;

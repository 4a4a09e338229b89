//! Stats module - descriptive statistics and grouped aggregates

mod calculator;

pub use calculator::{ColumnStats, GroupedSummary, StatsCalculator, StatsError, DESCRIBE_ROWS};

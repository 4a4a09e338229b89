//! Charts module - chart data and static rendering

pub mod series;
mod renderer;

pub use renderer::{ChartKind, ChartOutcome, StaticChartRenderer};

//! Report Configuration
//! Fixed file locations, designated chart columns and label policy.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PETAL_LENGTH: &str = "petal length (cm)";
pub const SEPAL_LENGTH: &str = "sepal length (cm)";

/// Settings for a single report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Plain CSV copy of the dataset, written after a primary load and read as fallback.
    pub cache_path: PathBuf,
    pub output_dir: PathBuf,
    /// Categorical label column. `None` picks `target`, then `species`,
    /// then falls back to the last column of the table.
    pub label_column: Option<String>,
    pub line_feature: String,
    pub bar_feature: String,
    pub histogram_feature: String,
    pub histogram_bins: usize,
    pub scatter_x: String,
    pub scatter_y: String,
    /// Pixel size (width, height) of every chart.
    pub chart_size: (u32, u32),
    /// Open each saved chart in the system viewer when a display exists.
    pub show_charts: bool,
    pub head_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("iris.csv"),
            output_dir: PathBuf::from("plots"),
            label_column: None,
            line_feature: PETAL_LENGTH.to_string(),
            bar_feature: PETAL_LENGTH.to_string(),
            histogram_feature: SEPAL_LENGTH.to_string(),
            histogram_bins: 20,
            scatter_x: SEPAL_LENGTH.to_string(),
            scatter_y: PETAL_LENGTH.to_string(),
            chart_size: (800, 500),
            show_charts: true,
            head_rows: 5,
        }
    }
}

impl ReportConfig {
    /// Same defaults, rooted at `dir` and with the viewer disabled.
    #[cfg(test)]
    pub fn rooted_at(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            cache_path: dir.join("iris.csv"),
            output_dir: dir.join("plots"),
            show_charts: false,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable config: {e}>"))
    }
}

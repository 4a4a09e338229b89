//! Statistics Calculator Module
//! Handles descriptive statistics and per-label aggregation.

use crate::data::{DataProcessor, ProcessorError, ValidatedDataset};
use polars::prelude::*;
use statrs::statistics::Statistics;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("Dataset has no numeric columns to summarize")]
    NoNumericColumns,
}

/// Row labels of the descriptive statistics table, in print order.
pub const DESCRIBE_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics for a single numeric column.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Values in `DESCRIBE_ROWS` order.
    pub fn as_row(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Mean of every feature per distinct label value, sorted by label.
#[derive(Debug, Clone)]
pub struct GroupedSummary {
    frame: DataFrame,
    labels: Vec<String>,
    columns: Vec<String>,
    means: Vec<Vec<f64>>,
}

impl GroupedSummary {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn mean(&self, label: &str, column: &str) -> Option<f64> {
        let row = self.labels.iter().position(|l| l == label)?;
        let col = self.columns.iter().position(|c| c == column)?;
        self.means.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(column: &str, values: &[f64]) -> ColumnStats {
        let n = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // `Statistics` yields NaN for an empty slice and for std with n < 2
        ColumnStats {
            column: column.to_string(),
            count: n,
            mean: values.iter().mean(),
            std: values.iter().std_dev(),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Descriptive statistics for every numeric column, label included when numeric.
    pub fn describe(df: &DataFrame) -> Result<Vec<ColumnStats>, StatsError> {
        let numeric = DataProcessor::numeric_columns(df);
        if numeric.is_empty() {
            return Err(StatsError::NoNumericColumns);
        }

        numeric
            .iter()
            .map(|name| {
                let values = DataProcessor::column_as_f64(df, name)?;
                Ok(Self::compute_descriptive_stats(name, &values))
            })
            .collect()
    }

    /// Group rows by the label column and average every feature column.
    pub fn grouped_means(dataset: &ValidatedDataset) -> Result<GroupedSummary, StatsError> {
        let label = dataset.label_column();
        let columns = dataset.feature_columns().to_vec();
        if columns.is_empty() {
            return Err(StatsError::NoNumericColumns);
        }

        let aggs: Vec<Expr> = columns
            .iter()
            .map(|c| col(c.as_str()).cast(DataType::Float64).mean())
            .collect();

        let frame = dataset
            .dataframe()
            .clone()
            .lazy()
            .group_by([col(label)])
            .agg(aggs)
            .sort([label], SortMultipleOptions::default())
            .collect()?;

        let labels = DataProcessor::column_as_strings(&frame, label)?;
        let per_column = columns
            .iter()
            .map(|c| DataProcessor::column_as_f64(&frame, c))
            .collect::<Result<Vec<_>, _>>()?;
        let means = (0..labels.len())
            .map(|row| per_column.iter().map(|values| values[row]).collect())
            .collect();

        Ok(GroupedSummary {
            frame,
            labels,
            columns,
            means,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::iris;

    const TOLERANCE: f64 = 1e-9;

    fn iris_dataset() -> ValidatedDataset {
        DataProcessor::validate(&iris::load().unwrap(), None).unwrap()
    }

    #[test]
    fn descriptive_stats_match_pandas_conventions() {
        let stats = StatsCalculator::compute_descriptive_stats("x", &[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < TOLERANCE);
        // sample standard deviation (n - 1)
        assert!((stats.std - (5.0f64 / 3.0).sqrt()).abs() < TOLERANCE);
        assert_eq!(stats.min, 1.0);
        assert!((stats.q25 - 1.75).abs() < TOLERANCE);
        assert!((stats.median - 2.5).abs() < TOLERANCE);
        assert!((stats.q75 - 3.25).abs() < TOLERANCE);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn single_value_has_undefined_std() {
        let stats = StatsCalculator::compute_descriptive_stats("x", &[7.0]);
        assert_eq!(stats.median, 7.0);
        assert!(stats.std.is_nan());
    }

    #[test]
    fn describe_covers_every_numeric_column() {
        let stats = StatsCalculator::describe(iris_dataset().dataframe()).unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names.len(), 5);
        assert_eq!(names[4], "target");
        let sepal = &stats[0];
        assert_eq!(sepal.count, 150);
        assert_eq!(sepal.min, 4.3);
        assert_eq!(sepal.max, 7.9);
        assert!((sepal.mean - 5.843333333333334).abs() < 1e-6);
    }

    #[test]
    fn describe_rejects_tables_without_numbers() {
        let df = df! { "species" => ["a", "b"] }.unwrap();
        assert!(matches!(
            StatsCalculator::describe(&df),
            Err(StatsError::NoNumericColumns)
        ));
    }

    #[test]
    fn grouped_means_equal_restricted_arithmetic_means() {
        let dataset = iris_dataset();
        let summary = StatsCalculator::grouped_means(&dataset).unwrap();
        assert_eq!(summary.labels(), ["0", "1", "2"]);
        assert_eq!(summary.columns().len(), 4);
        assert_eq!(summary.frame().height(), 3);

        let labels = dataset.labels().unwrap();
        for column in dataset.feature_columns() {
            let values = dataset.values(column).unwrap();
            for label in summary.labels() {
                let selected: Vec<f64> = labels
                    .iter()
                    .zip(&values)
                    .filter(|(l, _)| *l == label)
                    .map(|(_, v)| *v)
                    .collect();
                let expected = selected.iter().sum::<f64>() / selected.len() as f64;
                let actual = summary.mean(label, column).unwrap();
                assert!((actual - expected).abs() < TOLERANCE, "{label}/{column}");
            }
        }
    }

    #[test]
    fn petal_length_means_per_species() {
        let summary = StatsCalculator::grouped_means(&iris_dataset()).unwrap();
        let expected = [("0", 1.462), ("1", 4.26), ("2", 5.552)];
        for (label, want) in expected {
            let mean = summary.mean(label, "petal length (cm)").unwrap();
            assert!((mean - want).abs() < 1e-6, "{label}");
        }
        assert!(summary.mean("0", "missing").is_none());
        assert!(summary.mean("3", "petal length (cm)").is_none());
    }

    #[test]
    fn string_labels_group_correctly() {
        let df = df! {
            "x" => [1.0, 2.0, 3.0, 5.0],
            "species" => ["b", "a", "b", "a"],
        }
        .unwrap();
        let dataset = DataProcessor::validate(&df, None).unwrap();
        let summary = StatsCalculator::grouped_means(&dataset).unwrap();
        assert_eq!(summary.labels(), ["a", "b"]);
        assert_eq!(summary.mean("a", "x"), Some(3.5));
        assert_eq!(summary.mean("b", "x"), Some(2.0));
    }
}

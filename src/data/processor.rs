//! Data Processor Module
//! Validates the loaded table: null accounting, row dropping and label resolution.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Dataset has no columns")]
    NoColumns,
    #[error("Label column '{0}' not found in dataset")]
    LabelColumnMissing(String),
}

/// Label column names tried, in order, when none is configured.
pub const LABEL_CANDIDATES: [&str; 2] = ["target", "species"];

/// Per-column structure line for the dataset info report.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
}

/// Table that passed validation: no nulls, label and features resolved.
#[derive(Debug, Clone)]
pub struct ValidatedDataset {
    df: DataFrame,
    label_col: String,
    feature_cols: Vec<String>,
}

impl ValidatedDataset {
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn label_column(&self) -> &str {
        &self.label_col
    }

    /// Numeric columns other than the label, in table order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_cols
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Values of a numeric column as `f64`.
    pub fn values(&self, column: &str) -> Result<Vec<f64>, ProcessorError> {
        DataProcessor::column_as_f64(&self.df, column)
    }

    /// Label values rendered as strings, in row order.
    pub fn labels(&self) -> Result<Vec<String>, ProcessorError> {
        DataProcessor::column_as_strings(&self.df, &self.label_col)
    }
}

/// Handles data cleaning and column classification.
pub struct DataProcessor;

impl DataProcessor {
    pub fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Get list of numeric column names.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| Self::is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Dtype and non-null count per column.
    pub fn column_info(df: &DataFrame) -> Result<Vec<ColumnInfo>, ProcessorError> {
        let normalized = Self::nan_to_null(df)?;
        Ok(normalized
            .get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                non_null: col.len() - col.null_count(),
            })
            .collect())
    }

    /// Missing cells per column. NaN in float columns counts as missing.
    pub fn null_counts(df: &DataFrame) -> Result<Vec<(String, usize)>, ProcessorError> {
        let normalized = Self::nan_to_null(df)?;
        Ok(normalized
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect())
    }

    pub fn count_nulls(df: &DataFrame) -> usize {
        df.get_columns().iter().map(|col| col.null_count()).sum()
    }

    /// Replace NaN with null in every float column.
    pub fn nan_to_null(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| -> Result<Column, ProcessorError> {
                if !matches!(col.dtype(), DataType::Float32 | DataType::Float64) {
                    return Ok(col.clone());
                }
                let values = col.cast(&DataType::Float64)?;
                let cleaned: Float64Chunked = values
                    .f64()?
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect();
                let cleaned = cleaned.with_name(col.name().clone()).into_series();
                Ok(cleaned.cast(col.dtype())?.into())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DataFrame::new(columns)?)
    }

    /// Remove every row holding a missing cell.
    pub fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let normalized = Self::nan_to_null(df)?;
        Ok(normalized.drop_nulls::<String>(None)?)
    }

    /// Resolve the categorical label column.
    ///
    /// An explicit name must exist. Otherwise `target`, then `species`, and
    /// finally the last column of the table.
    pub fn resolve_label_column(
        df: &DataFrame,
        configured: Option<&str>,
    ) -> Result<String, ProcessorError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        if let Some(name) = configured {
            return names
                .iter()
                .find(|n| n.as_str() == name)
                .cloned()
                .ok_or_else(|| ProcessorError::LabelColumnMissing(name.to_string()));
        }

        LABEL_CANDIDATES
            .iter()
            .find_map(|candidate| names.iter().find(|n| n.as_str() == *candidate))
            .or_else(|| names.last())
            .cloned()
            .ok_or(ProcessorError::NoColumns)
    }

    /// Drop incomplete rows and classify columns.
    pub fn validate(
        df: &DataFrame,
        label_column: Option<&str>,
    ) -> Result<ValidatedDataset, ProcessorError> {
        let cleaned = Self::drop_incomplete_rows(df)?;
        let label_col = Self::resolve_label_column(&cleaned, label_column)?;
        let feature_cols = Self::numeric_columns(&cleaned)
            .into_iter()
            .filter(|c| c != &label_col)
            .collect();

        Ok(ValidatedDataset {
            df: cleaned,
            label_col,
            feature_cols,
        })
    }

    pub fn column_as_f64(df: &DataFrame, column: &str) -> Result<Vec<f64>, ProcessorError> {
        let values = df.column(column)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().flatten().collect())
    }

    pub fn column_as_strings(df: &DataFrame, column: &str) -> Result<Vec<String>, ProcessorError> {
        let values = df.column(column)?.cast(&DataType::String)?;
        Ok(values
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_gaps() -> DataFrame {
        df! {
            "sepal length (cm)" => [Some(5.1), None, Some(6.3), Some(f64::NAN)],
            "petal length (cm)" => [Some(1.4), Some(4.7), Some(6.0), Some(5.0)],
            "species" => [Some("setosa"), Some("versicolor"), None, Some("virginica")],
        }
        .unwrap()
    }

    #[test]
    fn null_counts_include_nan() {
        let counts = DataProcessor::null_counts(&frame_with_gaps()).unwrap();
        assert_eq!(
            counts,
            vec![
                ("sepal length (cm)".to_string(), 2),
                ("petal length (cm)".to_string(), 0),
                ("species".to_string(), 1),
            ]
        );
    }

    #[test]
    fn validation_leaves_no_nulls() {
        let validated = DataProcessor::validate(&frame_with_gaps(), None).unwrap();
        assert_eq!(validated.height(), 1);
        assert_eq!(DataProcessor::count_nulls(validated.dataframe()), 0);
        assert_eq!(validated.labels().unwrap(), vec!["setosa".to_string()]);
    }

    #[test]
    fn label_prefers_target_then_species() {
        let df = df! {
            "species" => ["a"],
            "target" => [0i64],
            "x" => [1.0],
        }
        .unwrap();
        assert_eq!(DataProcessor::resolve_label_column(&df, None).unwrap(), "target");

        let df = df! { "species" => ["a"], "x" => [1.0] }.unwrap();
        assert_eq!(DataProcessor::resolve_label_column(&df, None).unwrap(), "species");
    }

    #[test]
    fn label_falls_back_to_last_column() {
        let df = df! { "x" => [1.0], "kind" => ["a"] }.unwrap();
        assert_eq!(DataProcessor::resolve_label_column(&df, None).unwrap(), "kind");
    }

    #[test]
    fn configured_label_must_exist() {
        let df = df! { "x" => [1.0], "kind" => ["a"] }.unwrap();
        assert_eq!(
            DataProcessor::resolve_label_column(&df, Some("x")).unwrap(),
            "x"
        );
        assert!(matches!(
            DataProcessor::resolve_label_column(&df, Some("class")),
            Err(ProcessorError::LabelColumnMissing(name)) if name == "class"
        ));
    }

    #[test]
    fn features_exclude_numeric_label() {
        let df = df! {
            "a" => [1.0, 2.0],
            "b" => [3.0, 4.0],
            "target" => [0i64, 1],
        }
        .unwrap();
        let validated = DataProcessor::validate(&df, None).unwrap();
        assert_eq!(validated.label_column(), "target");
        assert_eq!(validated.feature_columns(), ["a".to_string(), "b".to_string()]);
        assert_eq!(validated.labels().unwrap(), vec!["0", "1"]);
    }

    #[test]
    fn column_info_reports_non_null_counts() {
        let info = DataProcessor::column_info(&frame_with_gaps()).unwrap();
        // NaN is missing, matching the null counts
        assert_eq!(info[0].non_null, 2);
        assert_eq!(info[2].non_null, 3);
        assert_eq!(info[1].dtype, "f64");
    }
}

//! Summary Reporter
//! Writes the dataset overview, descriptive statistics and grouped means as text.

use crate::data::{DataProcessor, ProcessorError, ValidatedDataset};
use crate::stats::{ColumnStats, GroupedSummary, StatsCalculator, StatsError, DESCRIBE_ROWS};
use polars::prelude::*;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Fixed narrative notes printed after the grouped means.
pub const OBSERVATIONS: [&str; 2] = [
    "Sepal length & width vary by species.",
    "Petal length is a clear differentiator between species.",
];

/// Results computed while summarising, kept for the caller.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub describe: Vec<ColumnStats>,
    pub grouped: GroupedSummary,
}

/// Writes human-readable report sections to any `Write` sink.
pub struct SummaryReporter<W: Write> {
    out: W,
}

impl<W: Write> SummaryReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// First rows, column structure and missing-value counts of the raw table.
    pub fn report_structure(&mut self, df: &DataFrame, head_rows: usize) -> Result<(), ReportError> {
        writeln!(self.out, "\nFirst {} rows of the dataset:", head_rows)?;
        writeln!(self.out, "{}", df.head(Some(head_rows)))?;

        writeln!(self.out, "\nDataset Info:")?;
        writeln!(
            self.out,
            "{} rows, {} columns",
            df.height(),
            df.width()
        )?;
        writeln!(self.out, " #  {:<22} {:>14}  {}", "Column", "Non-Null Count", "Dtype")?;
        for (idx, info) in DataProcessor::column_info(df)?.iter().enumerate() {
            writeln!(
                self.out,
                "{:>2}  {:<22} {:>5} non-null  {}",
                idx, info.name, info.non_null, info.dtype
            )?;
        }

        writeln!(self.out, "\nMissing values per column:")?;
        for (name, count) in DataProcessor::null_counts(df)? {
            writeln!(self.out, "{:<22} {}", name, count)?;
        }
        Ok(())
    }

    /// Descriptive statistics, grouped means and the fixed observations.
    pub fn report_summary(&mut self, dataset: &ValidatedDataset) -> Result<SummaryReport, ReportError> {
        let describe = StatsCalculator::describe(dataset.dataframe())?;
        writeln!(self.out, "\nDescriptive Statistics:")?;
        self.write_describe_table(&describe)?;

        let grouped = StatsCalculator::grouped_means(dataset)?;
        writeln!(self.out, "\nMean values grouped by Species/Target:")?;
        writeln!(self.out, "{}", grouped.frame())?;

        writeln!(self.out, "\nObservations:")?;
        for note in OBSERVATIONS {
            writeln!(self.out, "- {}", note)?;
        }
        self.out.flush()?;

        Ok(SummaryReport { describe, grouped })
    }

    fn write_describe_table(&mut self, stats: &[ColumnStats]) -> io::Result<()> {
        let widths: Vec<usize> = stats.iter().map(|s| s.column.len().max(12)).collect();

        write!(self.out, "{:<6}", "")?;
        for (s, w) in stats.iter().zip(&widths) {
            write!(self.out, "  {:>w$}", s.column, w = *w)?;
        }
        writeln!(self.out)?;

        let rows: Vec<[f64; 8]> = stats.iter().map(ColumnStats::as_row).collect();
        for (r, label) in DESCRIBE_ROWS.iter().enumerate() {
            write!(self.out, "{:<6}", label)?;
            for (row, w) in rows.iter().zip(&widths) {
                write!(self.out, "  {:>w$.6}", row[r], w = *w)?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }
}

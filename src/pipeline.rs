//! Report Pipeline
//! Runs load, validation, summary and chart rendering in sequence.

use crate::charts::{ChartOutcome, StaticChartRenderer};
use crate::config::ReportConfig;
use crate::data::{DataProcessor, DatasetLoader, LoaderError, ProcessorError};
use crate::report::{SummaryReport, SummaryReporter};
use log::{debug, error, info};
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    DatasetUnavailable(#[from] LoaderError),
    #[error("Dataset failed validation: {0}")]
    Validation(#[from] ProcessorError),
    #[error("Failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
}

/// What a completed run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub source: &'static str,
    pub rows: usize,
    /// `None` when summarising failed; the error has been logged.
    pub summary: Option<SummaryReport>,
    pub charts: Vec<ChartOutcome>,
}

impl PipelineReport {
    pub fn charts_written(&self) -> usize {
        self.charts.iter().filter(|c| c.is_written()).count()
    }
}

/// Run the full report, writing text sections to `out`.
///
/// A missing dataset or an unusable table is fatal. Summary and chart
/// failures are logged and the run continues.
pub fn run<W: Write>(
    config: &ReportConfig,
    loader: &DatasetLoader,
    out: W,
) -> Result<PipelineReport, PipelineError> {
    std::fs::create_dir_all(&config.output_dir)?;

    let outcome = loader.load();
    let source = outcome.source_label();
    let raw = outcome.into_result()?;
    info!("Dataset source: {}", source);

    let mut reporter = SummaryReporter::new(out);
    if let Err(e) = reporter.report_structure(&raw, config.head_rows) {
        error!("Could not describe dataset structure: {}", e);
    }

    let dataset = DataProcessor::validate(&raw, config.label_column.as_deref())?;
    info!(
        "Validated {} of {} rows, label column '{}'",
        dataset.height(),
        raw.height(),
        dataset.label_column()
    );
    debug!(
        "{} missing cells remain after validation",
        DataProcessor::count_nulls(dataset.dataframe())
    );

    let summary = match reporter.report_summary(&dataset) {
        Ok(summary) => Some(summary),
        Err(e) => {
            error!("Could not summarize dataset: {}", e);
            None
        }
    };

    let charts = StaticChartRenderer::new(config).render_all(&dataset);

    Ok(PipelineReport {
        source,
        rows: dataset.height(),
        summary,
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;
    use tempfile::tempdir;

    fn png_files(dir: &std::path::Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .filter(|name| name.ends_with(".png"))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn no_dataset_is_fatal_and_renders_nothing() {
        let temp = tempdir().unwrap();
        let config = ReportConfig::rooted_at(temp.path());
        let loader = DatasetLoader::cache_only(&config.cache_path);

        let result = run(&config, &loader, Vec::new());
        assert!(matches!(
            result,
            Err(PipelineError::DatasetUnavailable(LoaderError::DatasetNotFound { .. }))
        ));
        assert!(config.output_dir.is_dir());
        assert!(png_files(&config.output_dir).is_empty());
    }

    #[test]
    fn fallback_run_uses_cached_table() {
        let temp = tempdir().unwrap();
        let config = ReportConfig::rooted_at(temp.path());
        std::fs::write(
            &config.cache_path,
            "sepal length (cm),petal length (cm),target\n\
             5.1,1.4,0\n4.9,,0\n7.0,4.7,1\n6.3,6.0,2\n",
        )
        .unwrap();
        let loader = DatasetLoader::cache_only(&config.cache_path);

        let mut out = Vec::new();
        let report = run(&config, &loader, &mut out).unwrap();
        assert_eq!(report.source, "CSV cache");
        assert_eq!(report.rows, 3);
        let summary = report.summary.unwrap();
        assert_eq!(summary.grouped.labels(), ["0", "1", "2"]);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Missing values per column:"));
        assert!(text.contains("Observations:"));
    }

    #[test]
    fn unknown_label_column_is_fatal() {
        let temp = tempdir().unwrap();
        let mut config = ReportConfig::rooted_at(temp.path());
        config.label_column = Some("class".to_string());
        std::fs::write(&config.cache_path, "x,species\n1.0,a\n").unwrap();
        let loader = DatasetLoader::cache_only(&config.cache_path);

        assert!(matches!(
            run(&config, &loader, Vec::new()),
            Err(PipelineError::Validation(ProcessorError::LabelColumnMissing(_)))
        ));
    }

    #[test]
    fn summary_failure_still_renders_charts() {
        let temp = tempdir().unwrap();
        let config = ReportConfig::rooted_at(temp.path());
        std::fs::write(&config.cache_path, "species\na\nb\n").unwrap();
        let loader = DatasetLoader::cache_only(&config.cache_path);

        let report = run(&config, &loader, Vec::new()).unwrap();
        assert!(report.summary.is_none());
        assert_eq!(report.charts.len(), 4);
        assert_eq!(report.charts_written(), 0);
    }

    #[cfg(feature = "bundled-dataset")]
    #[test]
    fn end_to_end_on_reference_table() {
        let temp = tempdir().unwrap();
        let config = ReportConfig::rooted_at(temp.path());
        let loader = DatasetLoader::new(&config.cache_path);

        let report = run(&config, &loader, Vec::new()).unwrap();
        assert_eq!(report.source, "bundled dataset");
        assert_eq!(report.rows, 150);
        assert!(config.cache_path.exists());

        let summary = report.summary.as_ref().unwrap();
        assert_eq!(summary.grouped.frame().height(), 3);
        assert_eq!(summary.grouped.columns().len(), 4);

        let kinds: Vec<ChartKind> = report.charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, ChartKind::ALL);
        let written = png_files(&config.output_dir);
        assert_eq!(written.len(), report.charts_written());
        for chart in report.charts.iter().filter(|c| c.is_written()) {
            assert!(written.contains(&chart.kind.file_name().to_string()));
        }
    }
}

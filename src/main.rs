//! Iris Report - Dataset Summary & Static Chart Generator
//!
//! Loads the Iris dataset, prints descriptive statistics and per-species
//! means, and renders four charts into `plots/`.

mod charts;
mod config;
mod data;
mod pipeline;
mod report;
mod stats;

use anyhow::Context;
use config::ReportConfig;
use data::DatasetLoader;
use log::{debug, info};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ReportConfig::default();
    debug!("Configuration: {}", config.to_json());

    let loader = DatasetLoader::new(&config.cache_path);
    let report = pipeline::run(&config, &loader, std::io::stdout())
        .context("Iris report could not be produced")?;

    if let Some(summary) = &report.summary {
        debug!(
            "Summarized {} columns across {} label groups",
            summary.describe.len(),
            summary.grouped.labels().len()
        );
    }
    for chart in report.charts.iter().filter(|c| c.is_written()) {
        debug!("{:?} chart at {}", chart.kind, chart.path.display());
    }
    info!(
        "Done: {} rows from {}, {}/{} charts written to {}",
        report.rows,
        report.source,
        report.charts_written(),
        report.charts.len(),
        config.output_dir.display()
    );
    Ok(())
}

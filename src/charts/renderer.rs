//! Static Chart Renderer
//! Draws the four report charts to PNG files with plotters.
//!
//! Every chart shares one light theme: white background, light grey
//! major grid, no minor grid. Each chart reads its own columns from the
//! dataset, so a failure in one never blocks the others.

use crate::charts::series::{self, ScatterGroup};
use crate::config::ReportConfig;
use crate::data::{ProcessorError, ValidatedDataset};
use log::{debug, error, info, warn};
use plotters::prelude::*;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Theme colors
const GRID: RGBColor = RGBColor(221, 221, 221);
const AXIS: RGBColor = RGBColor(80, 80, 80);
const LINE_BLUE: RGBColor = RGBColor(76, 114, 176);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

/// Default categorical palette for bars
const BAR_PALETTE: [RGBColor; 6] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
];

/// "Set1" qualitative palette for scatter hues
const SET1: [RGBColor; 9] = [
    RGBColor(228, 26, 28),
    RGBColor(55, 126, 184),
    RGBColor(77, 175, 74),
    RGBColor(152, 78, 163),
    RGBColor(255, 127, 0),
    RGBColor(255, 255, 51),
    RGBColor(166, 86, 40),
    RGBColor(247, 129, 191),
    RGBColor(153, 153, 153),
];

const FONT: &str = "sans-serif";
const BAR_HALF_WIDTH: f64 = 0.35;

type DrawResult = Result<(), Box<dyn StdError>>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Data(#[from] ProcessorError),
    #[error("No values to plot")]
    EmptySeries,
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The four fixed report charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Histogram,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Histogram,
        ChartKind::Scatter,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::Line => "line_chart.png",
            ChartKind::Bar => "bar_chart.png",
            ChartKind::Histogram => "histogram.png",
            ChartKind::Scatter => "scatter_plot.png",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Line => "Cumulative Petal Length Over Samples",
            ChartKind::Bar => "Average Petal Length per Species",
            ChartKind::Histogram => "Distribution of Sepal Length",
            ChartKind::Scatter => "Sepal Length vs Petal Length by Species",
        }
    }
}

/// Result of rendering one chart.
#[derive(Debug)]
pub struct ChartOutcome {
    pub kind: ChartKind,
    pub path: PathBuf,
    pub result: Result<(), RenderError>,
}

impl ChartOutcome {
    pub fn is_written(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct StaticChartRenderer<'a> {
    config: &'a ReportConfig,
}

impl<'a> StaticChartRenderer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn chart_path(&self, kind: ChartKind) -> PathBuf {
        self.config.output_dir.join(kind.file_name())
    }

    /// Render every chart; failures are logged and do not stop the rest.
    pub fn render_all(&self, dataset: &ValidatedDataset) -> Vec<ChartOutcome> {
        ChartKind::ALL
            .iter()
            .map(|&kind| {
                let path = self.chart_path(kind);
                let result = self.render(kind, dataset, &path);
                match &result {
                    Ok(()) => {
                        info!("Saved {}", path.display());
                        self.show(&path);
                    }
                    Err(e) => error!("Failed to render {}: {}", kind.file_name(), e),
                }
                ChartOutcome { kind, path, result }
            })
            .collect()
    }

    pub fn render(
        &self,
        kind: ChartKind,
        dataset: &ValidatedDataset,
        path: &Path,
    ) -> Result<(), RenderError> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let size = self.config.chart_size;

        let drawn = match kind {
            ChartKind::Line => {
                let values = dataset.values(&self.config.line_feature)?;
                let cumulative = series::cumulative_sum(&values);
                if cumulative.is_empty() {
                    return Err(RenderError::EmptySeries);
                }
                Self::draw_line(path, size, &cumulative)
            }
            ChartKind::Bar => {
                let labels = series::display_labels(dataset)?;
                let values = dataset.values(&self.config.bar_feature)?;
                let means = series::group_means(&labels, &values);
                if means.is_empty() {
                    return Err(RenderError::EmptySeries);
                }
                Self::draw_bar(path, size, &means)
            }
            ChartKind::Histogram => {
                let values = dataset.values(&self.config.histogram_feature)?;
                if values.is_empty() {
                    return Err(RenderError::EmptySeries);
                }
                let hist = series::histogram(&values, self.config.histogram_bins);
                debug!("Histogram of {} values in {} bins", hist.total(), hist.counts.len());
                Self::draw_histogram(path, size, &hist)
            }
            ChartKind::Scatter => {
                let labels = series::display_labels(dataset)?;
                let xs = dataset.values(&self.config.scatter_x)?;
                let ys = dataset.values(&self.config.scatter_y)?;
                let groups = series::scatter_groups(&labels, &xs, &ys);
                if groups.is_empty() {
                    return Err(RenderError::EmptySeries);
                }
                Self::draw_scatter(path, size, &groups)
            }
        };

        drawn.map_err(|e| RenderError::Drawing(e.to_string()))
    }

    /// Hand a saved chart to the system viewer when one can be shown.
    fn show(&self, path: &Path) {
        if !self.config.show_charts {
            return;
        }
        if !display_available() {
            debug!("No display available, not opening {}", path.display());
            return;
        }
        if let Err(e) = open::that(path) {
            warn!("Could not open {}: {}", path.display(), e);
        }
    }

    fn draw_line(path: &Path, size: (u32, u32), cumulative: &[f64]) -> DrawResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let x_max = (cumulative.len().max(2) - 1) as f64;
        let (y_lo, y_hi) = padded_range(cumulative.iter().copied());

        let mut chart = ChartBuilder::on(&root)
            .caption(ChartKind::Line.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(65)
            .build_cartesian_2d(0f64..x_max, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .max_light_lines(0)
            .bold_line_style(GRID)
            .axis_style(AXIS)
            .label_style((FONT, 14))
            .x_desc("Sample Index")
            .y_desc("Cumulative Petal Length")
            .draw()?;

        chart.draw_series(LineSeries::new(
            cumulative.iter().enumerate().map(|(i, v)| (i as f64, *v)),
            LINE_BLUE.stroke_width(2),
        ))?;

        root.present()?;
        Ok(())
    }

    fn draw_bar(path: &Path, size: (u32, u32), means: &[(String, f64)]) -> DrawResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let y_hi = means.iter().map(|(_, m)| *m).fold(0.0, f64::max) * 1.1;
        let y_hi = if y_hi > 0.0 { y_hi } else { 1.0 };
        // One unit per category, bars centred on integer positions
        let x_hi = means.len() as f64 - 0.5;

        let mut chart = ChartBuilder::on(&root)
            .caption(ChartKind::Bar.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(-0.5f64..x_hi, 0f64..y_hi)?;

        let label_of = |x: &f64| {
            let nearest = x.round();
            if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
                return String::new();
            }
            means
                .get(nearest as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default()
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .max_light_lines(0)
            .bold_line_style(GRID)
            .axis_style(AXIS)
            .label_style((FONT, 14))
            .x_label_formatter(&label_of)
            .x_desc("Species")
            .y_desc("Petal Length (cm)")
            .draw()?;

        chart.draw_series(means.iter().enumerate().map(|(i, (_, m))| {
            let center = i as f64;
            Rectangle::new(
                [(center - BAR_HALF_WIDTH, 0.0), (center + BAR_HALF_WIDTH, *m)],
                BAR_PALETTE[i % BAR_PALETTE.len()].filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    fn draw_histogram(path: &Path, size: (u32, u32), hist: &series::Histogram) -> DrawResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let x_lo = hist.edges.first().copied().unwrap_or(0.0);
        let x_hi = hist.edges.last().copied().unwrap_or(1.0);
        let y_hi = hist.max_count().max(1) as f64 * 1.1;

        let mut chart = ChartBuilder::on(&root)
            .caption(ChartKind::Histogram.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)?;

        chart
            .configure_mesh()
            .max_light_lines(0)
            .bold_line_style(GRID)
            .axis_style(AXIS)
            .label_style((FONT, 14))
            .x_desc("Sepal Length (cm)")
            .y_desc("Frequency")
            .draw()?;

        let bins = || {
            hist.edges
                .windows(2)
                .zip(&hist.counts)
                .map(|(w, &c)| [(w[0], 0.0), (w[1], c as f64)])
        };
        chart.draw_series(bins().map(|corners| Rectangle::new(corners, SKY_BLUE.filled())))?;
        chart.draw_series(bins().map(|corners| Rectangle::new(corners, BLACK.stroke_width(1))))?;

        root.present()?;
        Ok(())
    }

    fn draw_scatter(path: &Path, size: (u32, u32), groups: &[ScatterGroup]) -> DrawResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let all = || groups.iter().flat_map(|g| g.points.iter().copied());
        let (x_lo, x_hi) = padded_range(all().map(|(x, _)| x));
        let (y_lo, y_hi) = padded_range(all().map(|(_, y)| y));

        let mut chart = ChartBuilder::on(&root)
            .caption(ChartKind::Scatter.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .max_light_lines(0)
            .bold_line_style(GRID)
            .axis_style(AXIS)
            .label_style((FONT, 14))
            .x_desc("Sepal Length (cm)")
            .y_desc("Petal Length (cm)")
            .draw()?;

        // Marker-less entry acts as the legend title
        chart
            .draw_series(std::iter::empty::<Circle<(f64, f64), u32>>())?
            .label("Species");

        for (idx, group) in groups.iter().enumerate() {
            let color = SET1[idx % SET1.len()];
            chart
                .draw_series(
                    group
                        .points
                        .iter()
                        .map(move |&(x, y)| Circle::new((x, y), 4u32, color.filled())),
                )?
                .label(group.label.as_str())
                .legend(move |(x, y)| Circle::new((x + 10, y), 4u32, color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(GRID)
            .label_font((FONT, 14))
            .draw()?;

        root.present()?;
        Ok(())
    }
}

/// Data range with 5% padding on both ends; degenerate ranges widened by 0.5.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

#[cfg(target_os = "linux")]
fn display_available() -> bool {
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

#[cfg(not(target_os = "linux"))]
fn display_available() -> bool {
    true
}

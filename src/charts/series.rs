//! Chart Series Module
//! Derives the plotted values of every chart from the validated dataset.

use crate::data::{iris, ProcessorError, ValidatedDataset};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Equal-width histogram over the observed value range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Scatter points sharing one label value.
#[derive(Debug, Clone)]
pub struct ScatterGroup {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Label values of every row, with `target` codes shown as species names.
pub fn display_labels(dataset: &ValidatedDataset) -> Result<Vec<String>, ProcessorError> {
    Ok(dataset
        .labels()?
        .into_iter()
        .map(|l| display_label(dataset.label_column(), &l))
        .collect())
}

/// Running total in row order.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Mean of `values` per label, ordered by `sort_labels`.
pub fn group_means(labels: &[String], values: &[f64]) -> Vec<(String, f64)> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for (label, value) in labels.iter().zip(values) {
        let entry = sums.entry(label.as_str()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let mut keys: Vec<String> = sums.keys().map(|k| k.to_string()).collect();
    sort_labels(&mut keys);
    keys.into_iter()
        .map(|k| {
            let (sum, n) = sums[k.as_str()];
            (k, sum / n as f64)
        })
        .collect()
}

/// Count values into `bins` equal-width bins spanning [min, max].
///
/// The last bin is closed on the right. A constant column is widened to
/// [v - 0.5, v + 0.5].
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Histogram {
            edges: (0..=bins).map(|i| i as f64 / bins as f64).collect(),
            counts: vec![0; bins],
        };
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let norm = bins as f64 / (hi - lo);

    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    edges[bins] = hi;
    let mut counts = vec![0; bins];
    for v in finite {
        let mut idx = (((v - lo) * norm) as usize).min(bins - 1);
        // Rounding can push a value sitting on an edge into a neighbouring bin
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

/// Points grouped by label, groups ordered by `sort_labels`.
pub fn scatter_groups(labels: &[String], xs: &[f64], ys: &[f64]) -> Vec<ScatterGroup> {
    let mut groups: Vec<ScatterGroup> = Vec::new();
    for ((label, &x), &y) in labels.iter().zip(xs).zip(ys) {
        match groups.iter_mut().find(|g| &g.label == label) {
            Some(group) => group.points.push((x, y)),
            None => groups.push(ScatterGroup {
                label: label.clone(),
                points: vec![(x, y)],
            }),
        }
    }

    let mut order: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
    sort_labels(&mut order);
    groups.sort_by_key(|g| order.iter().position(|l| l == &g.label));
    groups
}

/// Numeric order when every label parses as a number, lexicographic otherwise.
pub fn sort_labels(labels: &mut [String]) {
    let numeric: Option<Vec<f64>> = labels.iter().map(|l| l.parse::<f64>().ok()).collect();
    if numeric.is_some() {
        labels.sort_by(|a, b| {
            let (a, b) = (a.parse::<f64>().unwrap_or(0.0), b.parse::<f64>().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        });
    } else {
        labels.sort();
    }
}

/// Species name for integer `target` codes; other labels pass through.
pub fn display_label(label_column: &str, value: &str) -> String {
    if label_column == iris::TARGET_COLUMN {
        if let Some(name) = value.parse::<i64>().ok().and_then(iris::species_name) {
            return name.to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataProcessor;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cumulative_sum_is_monotonic_and_ends_at_total() {
        let values = [1.4, 0.0, 4.7, 6.0, 1.5];
        let series = cumulative_sum(&values);
        assert!(series.windows(2).all(|w| w[1] >= w[0]));
        let total: f64 = values.iter().sum();
        assert!((series.last().unwrap() - total).abs() < 1e-12);
        assert!(cumulative_sum(&[]).is_empty());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..150).map(|i| 4.3 + (i as f64) * 0.024).collect();
        let hist = histogram(&values, 20);
        assert_eq!(hist.counts.len(), 20);
        assert_eq!(hist.edges.len(), 21);
        assert_eq!(hist.total(), 150);
        assert!((hist.edges[0] - 4.3).abs() < 1e-12);
        assert!((hist.edges[20] - values[149]).abs() < 1e-9);
    }

    #[test]
    fn histogram_maximum_lands_in_last_bin() {
        let hist = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(hist.counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn values_on_interior_edges_open_the_next_bin() {
        // 6.1 sits on the left edge of bin 10 for [4.3, 7.9] in 20 bins
        let values = [4.3, 6.1, 6.1, 7.9];
        let hist = histogram(&values, 20);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[9], 0);
        assert_eq!(hist.counts[10], 2);
        assert_eq!(hist.counts[19], 1);
        assert_eq!(hist.edges[20], 7.9);
    }

    #[test]
    fn histogram_of_constant_column_is_widened() {
        let hist = histogram(&[5.0, 5.0, 5.0], 20);
        assert_eq!(hist.total(), 3);
        assert!((hist.edges[0] - 4.5).abs() < 1e-12);
        assert!((hist.edges[20] - 5.5).abs() < 1e-12);
        assert_eq!(hist.max_count(), 3);
    }

    #[test]
    fn group_means_per_label() {
        let labels = strings(&["b", "a", "b", "a"]);
        let means = group_means(&labels, &[1.0, 2.0, 3.0, 6.0]);
        assert_eq!(means, vec![("a".to_string(), 4.0), ("b".to_string(), 2.0)]);
    }

    #[test]
    fn numeric_labels_sort_numerically() {
        let mut labels = strings(&["10", "2", "1"]);
        sort_labels(&mut labels);
        assert_eq!(labels, ["1", "2", "10"]);
    }

    #[test]
    fn scatter_keeps_one_point_per_sample() {
        let labels = strings(&["y", "x", "y"]);
        let groups = scatter_groups(&labels, &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "x");
        assert_eq!(groups[1].points, vec![(1.0, 4.0), (3.0, 6.0)]);
    }

    #[test]
    fn target_codes_display_as_species() {
        assert_eq!(display_label("target", "1"), "versicolor");
        assert_eq!(display_label("target", "7"), "7");
        assert_eq!(display_label("species", "0"), "0");
    }

    #[test]
    fn reference_table_series() {
        let dataset = DataProcessor::validate(&iris::load().unwrap(), None).unwrap();
        let labels = display_labels(&dataset).unwrap();
        let petal = dataset.values("petal length (cm)").unwrap();
        let sepal = dataset.values("sepal length (cm)").unwrap();

        let cumulative = cumulative_sum(&petal);
        assert_eq!(cumulative.len(), 150);
        assert!((cumulative[149] - 563.7).abs() < 1e-6);

        let hist = histogram(&sepal, 20);
        assert_eq!(hist.total(), dataset.height());
        assert_eq!(
            hist.counts,
            vec![4, 5, 7, 16, 9, 5, 13, 14, 10, 6, 10, 16, 7, 11, 4, 2, 4, 1, 5, 1]
        );

        let bar_means = group_means(&labels, &petal);
        let bar_labels: Vec<&str> = bar_means.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(bar_labels, ["setosa", "versicolor", "virginica"]);
        assert!((bar_means[2].1 - 5.552).abs() < 1e-6);

        let scatter = scatter_groups(&labels, &sepal, &petal);
        let points: usize = scatter.iter().map(|g| g.points.len()).sum();
        assert_eq!(points, 150);
    }
}

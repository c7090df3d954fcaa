//! Boolean item matrix for rule mining.
//!
//! Assignments and Tutorials are split at their column median into `_Low`
//! (`< median`) and `_High` (`>= median`) indicators; a value sitting on the
//! median counts as High. PerformanceLevel is one-hot encoded, one column per
//! label present, in label-name order.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::Serialize;

use crate::constants::{COL_PERFORMANCE, DISCRETIZED_FEATURES, FEATURE_COLUMNS};
use crate::logic::dataset::StudentRecord;

/// Median used to split one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMedian {
    pub feature: String,
    pub median: f64,
}

/// Rows × items boolean matrix with its column names
#[derive(Debug, Clone)]
pub struct ItemMatrix {
    pub items: Vec<String>,
    pub matrix: Array2<bool>,
    pub medians: Vec<FeatureMedian>,
}

impl ItemMatrix {
    pub fn n_rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn column(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }
}

/// Median of a column; the mean of the two middle values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn feature_index(name: &str) -> usize {
    FEATURE_COLUMNS
        .iter()
        .position(|c| *c == name)
        .unwrap_or_default()
}

/// Build the indicator matrix for a batch of records
pub fn build_item_matrix(records: &[StudentRecord]) -> ItemMatrix {
    let features: Vec<_> = records.iter().map(|r| r.features()).collect();

    let medians: Vec<FeatureMedian> = DISCRETIZED_FEATURES
        .iter()
        .map(|&name| {
            let idx = feature_index(name);
            let column: Vec<f64> = features.iter().map(|f| f[idx]).collect();
            FeatureMedian {
                feature: name.to_string(),
                median: median(&column).unwrap_or_default(),
            }
        })
        .collect();

    let labels: Vec<&'static str> = records
        .iter()
        .map(|r| r.performance_level.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut items: Vec<String> = Vec::new();
    items.extend(medians.iter().map(|m| format!("{}_Low", m.feature)));
    items.extend(medians.iter().map(|m| format!("{}_High", m.feature)));
    items.extend(labels.iter().map(|l| format!("{}_{}", COL_PERFORMANCE, l)));

    let n_split = medians.len();
    let mut matrix = Array2::from_elem((records.len(), items.len()), false);

    for (row, record) in records.iter().enumerate() {
        for (j, m) in medians.iter().enumerate() {
            let value = features[row][feature_index(&m.feature)];
            let high = value >= m.median;
            matrix[[row, j]] = !high;
            matrix[[row, n_split + j]] = high;
        }

        let label = record.performance_level.as_str();
        if let Some(k) = labels.iter().position(|l| *l == label) {
            matrix[[row, 2 * n_split + k]] = true;
        }
    }

    ItemMatrix { items, matrix, medians }
}

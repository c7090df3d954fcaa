use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::logic::dataset::PerformanceLevel;
use crate::logic::model::TreeRule;
use crate::logic::rules::FeatureMedian;

/// What one pipeline run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Rows loaded from the raw table
    pub rows: usize,

    pub tree_text: String,
    pub tree_rules: Vec<TreeRule<PerformanceLevel>>,
    pub tree_depth: usize,

    /// Count of rows per predicted class
    pub predicted_distribution: BTreeMap<PerformanceLevel, usize>,

    /// Fraction of rows whose prediction matches their label
    pub training_accuracy: f64,

    pub medians: Vec<FeatureMedian>,
    pub frequent_itemsets: usize,
    pub rules: usize,
}

impl PipelineReport {
    /// One-line outcome for API responses
    pub fn summary(&self) -> String {
        let distribution = self
            .predicted_distribution
            .iter()
            .map(|(level, count)| format!("{}={}", level, count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Processed {} students ({}); {} association rules",
            self.rows, distribution, self.rules
        )
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

//! Read-side views over the persisted output tables.
//!
//! Every call re-reads the store; nothing is cached between calls.

use std::collections::BTreeMap;

use crate::error::PipelineResult;
use crate::logic::dataset::{read_predictions, read_rules, PredictedRecord, RuleRecord};
use crate::logic::store::{Table, TableStore};

pub fn load_predictions(store: &dyn TableStore) -> PipelineResult<Vec<PredictedRecord>> {
    let data = store.read(Table::Predictions)?;
    read_predictions(&data)
}

pub fn load_rules(store: &dyn TableStore) -> PipelineResult<Vec<RuleRecord>> {
    let data = store.read(Table::Rules)?;
    read_rules(&data)
}

/// Row count per predicted class, keyed by label
pub fn performance_distribution(rows: &[PredictedRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts
            .entry(row.predicted_performance.as_str().to_string())
            .or_insert(0) += 1;
    }
    counts
}

/// Rows predicted Low, in table order
pub fn at_risk(rows: Vec<PredictedRecord>) -> Vec<PredictedRecord> {
    rows.into_iter().filter(PredictedRecord::is_at_risk).collect()
}

pub fn find_student<'a>(rows: &'a [PredictedRecord], student_id: &str) -> Option<&'a PredictedRecord> {
    rows.iter().find(|r| r.student_id == student_id)
}

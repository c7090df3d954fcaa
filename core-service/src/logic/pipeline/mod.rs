//! Pipeline Module - Classification & rule mining run
//!
//! Load -> train -> predict -> mine -> commit. Nothing is written until every
//! stage has succeeded, and the outputs go out in a single store commit.

pub mod report;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use chrono::Utc;
use ndarray::Array2;
use uuid::Uuid;

use crate::constants::{FEATURE_COLUMNS, FEATURE_COUNT};
use crate::error::PipelineResult;
use crate::logic::config::PipelineConfig;
use crate::logic::dataset::{
    read_students, write_predictions, write_rules, PerformanceLevel, PredictedRecord, RuleRecord,
    StudentRecord,
};
use crate::logic::model::{export_text, leaf_rules, DecisionTree, TreeParams};
use crate::logic::rules::{self, AssociationRule};
use crate::logic::store::{Commit, Table, TableStore};

pub use report::PipelineReport;

/// Everything a run computes, before anything is persisted
#[derive(Debug, Clone)]
pub struct Analysis {
    pub predictions: Vec<PredictedRecord>,
    pub rules: Vec<AssociationRule>,
    pub report: PipelineReport,
}

impl Analysis {
    pub fn rule_records(&self) -> Vec<RuleRecord> {
        self.rules.iter().map(AssociationRule::to_record).collect()
    }

    /// Stage both output tables
    fn staged(&self) -> PipelineResult<Commit> {
        Ok(Commit::new()
            .put(Table::Predictions, write_predictions(&self.predictions)?)
            .put(Table::Rules, write_rules(&self.rule_records())?))
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run over the stored raw table and replace both output tables
    pub fn run(&self, store: &dyn TableStore) -> PipelineResult<PipelineReport> {
        let raw = store.read(Table::RawStudents)?;
        let analysis = self.analyze(&raw)?;

        store.commit(analysis.staged()?)?;
        Ok(self.finish(analysis.report))
    }

    /// Replace the raw table with `raw` and run over it.
    ///
    /// The raw table and both outputs are committed together, so input that
    /// fails any stage leaves every stored table untouched.
    pub fn ingest(&self, store: &dyn TableStore, raw: Vec<u8>) -> PipelineResult<PipelineReport> {
        let analysis = self.analyze(&raw)?;

        store.commit(analysis.staged()?.put(Table::RawStudents, raw))?;
        Ok(self.finish(analysis.report))
    }

    /// Compute predictions and rules for a raw table without touching storage
    pub fn analyze(&self, raw: &[u8]) -> PipelineResult<Analysis> {
        self.config.validate()?;

        let started_at = Utc::now();
        let run_id = Uuid::new_v4();

        let records = read_students(raw)?;
        log::info!("Run {}: loaded {} student records", run_id, records.len());

        let x = feature_matrix(&records);
        let labels: Vec<PerformanceLevel> = records.iter().map(|r| r.performance_level).collect();

        let params = TreeParams {
            max_depth: self.config.max_depth,
            seed: self.config.random_seed,
            ..Default::default()
        };
        let tree = DecisionTree::fit(x.view(), &labels, &FEATURE_COLUMNS, params)?;
        let tree_text = export_text(&tree);
        log::debug!("Decision tree rules:\n{}", tree_text);

        // One fitted tree labels the whole batch
        let predicted = tree.predict(x.view());

        let correct = predicted.iter().zip(&labels).filter(|(p, l)| p == l).count();
        let training_accuracy = correct as f64 / records.len() as f64;

        let mut predicted_distribution: BTreeMap<PerformanceLevel, usize> = BTreeMap::new();
        for level in &predicted {
            *predicted_distribution.entry(*level).or_insert(0) += 1;
        }

        let mined = rules::mine(&records, self.config.min_support, self.config.min_confidence);
        for rule in &mined.rules {
            log::debug!("{}", rule.describe());
        }

        let rows = records.len();
        let predictions: Vec<PredictedRecord> = records
            .into_iter()
            .zip(predicted)
            .map(|(record, level)| record.with_prediction(level))
            .collect();

        let report = PipelineReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            rows,
            tree_text,
            tree_rules: leaf_rules(&tree),
            tree_depth: tree.depth(),
            predicted_distribution,
            training_accuracy,
            medians: mined.medians,
            frequent_itemsets: mined.itemsets.len(),
            rules: mined.rules.len(),
        };

        Ok(Analysis {
            predictions,
            rules: mined.rules,
            report,
        })
    }

    fn finish(&self, mut report: PipelineReport) -> PipelineReport {
        report.finished_at = Utc::now();
        log::info!(
            "Run {} committed in {} ms: {} rows, accuracy {:.3}, {} rules",
            report.run_id,
            report.elapsed_ms(),
            report.rows,
            report.training_accuracy,
            report.rules
        );
        report
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Rows x features matrix in `FEATURE_COLUMNS` order
pub fn feature_matrix(records: &[StudentRecord]) -> Array2<f64> {
    let mut x = Array2::zeros((records.len(), FEATURE_COUNT));
    for (i, record) in records.iter().enumerate() {
        for (j, value) in record.features().into_iter().enumerate() {
            x[[i, j]] = value;
        }
    }
    x
}

//! Rules Module - Engagement/performance association mining
//!
//! Discretize -> one-hot -> Apriori -> association rules.

pub mod discretize;
pub mod apriori;
pub mod association;

pub use discretize::{build_item_matrix, median, FeatureMedian, ItemMatrix};
pub use apriori::{apriori, FrequentItemset};
pub use association::{association_rules, AssociationRule, TOKEN_SEPARATOR};

use crate::logic::dataset::StudentRecord;

/// Output of one mining pass
#[derive(Debug, Clone)]
pub struct MiningOutcome {
    pub items: Vec<String>,
    pub medians: Vec<FeatureMedian>,
    pub itemsets: Vec<FrequentItemset>,
    pub rules: Vec<AssociationRule>,
}

/// Mine association rules between engagement indicators and performance labels
pub fn mine(records: &[StudentRecord], min_support: f64, min_confidence: f64) -> MiningOutcome {
    let matrix = build_item_matrix(records);
    let itemsets = apriori(matrix.matrix.view(), min_support);
    let rules = association_rules(&itemsets, &matrix.items, min_confidence);

    log::debug!(
        "Mined {} frequent itemsets and {} rules over {} items",
        itemsets.len(),
        rules.len(),
        matrix.items.len()
    );

    MiningOutcome {
        items: matrix.items,
        medians: matrix.medians,
        itemsets,
        rules,
    }
}

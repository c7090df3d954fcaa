//! Association rules derived from frequent itemsets

use std::collections::HashMap;

use serde::Serialize;

use crate::constants::DISPLAY_PRECISION;
use crate::logic::dataset::RuleRecord;
use super::apriori::FrequentItemset;

/// Separator between tokens of a persisted antecedent or consequent
pub const TOKEN_SEPARATOR: &str = ", ";

/// `antecedents -> consequents` with its metrics at full precision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationRule {
    pub antecedents: Vec<String>,
    pub consequents: Vec<String>,
    pub support: f64,
    pub confidence: f64,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    pub lift: f64,
}

impl AssociationRule {
    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            antecedents: self.antecedents.join(TOKEN_SEPARATOR),
            consequents: self.consequents.join(TOKEN_SEPARATOR),
            support: self.support,
            confidence: self.confidence,
            antecedent_support: self.antecedent_support,
            consequent_support: self.consequent_support,
            lift: self.lift,
        }
    }

    /// One-line summary with metrics rounded for display
    pub fn describe(&self) -> String {
        let p = DISPLAY_PRECISION as usize;
        format!(
            "If [{}] --> [{}]: support={:.p$}, confidence={:.p$}",
            self.antecedents.join(TOKEN_SEPARATOR),
            self.consequents.join(TOKEN_SEPARATOR),
            self.support,
            self.confidence,
            p = p,
        )
    }
}

/// Every rule `A -> S \ A` over frequent itemsets `S` (size >= 2) whose
/// confidence `support(S) / support(A)` reaches `min_confidence`.
///
/// Per itemset, larger antecedents come first, each size in lexicographic
/// order.
pub fn association_rules(
    itemsets: &[FrequentItemset],
    item_names: &[String],
    min_confidence: f64,
) -> Vec<AssociationRule> {
    let supports: HashMap<&[usize], f64> = itemsets
        .iter()
        .map(|s| (s.items.as_slice(), s.support))
        .collect();

    let names = |items: &[usize]| -> Vec<String> {
        items.iter().map(|&i| item_names[i].clone()).collect()
    };

    let mut rules = Vec::new();

    for set in itemsets.iter().filter(|s| s.items.len() >= 2) {
        for size in (1..set.items.len()).rev() {
            for antecedent in combinations(&set.items, size) {
                let consequent: Vec<usize> = set
                    .items
                    .iter()
                    .copied()
                    .filter(|i| !antecedent.contains(i))
                    .collect();

                // Subsets of a frequent itemset are always frequent
                let (Some(&a_support), Some(&c_support)) = (
                    supports.get(antecedent.as_slice()),
                    supports.get(consequent.as_slice()),
                ) else {
                    continue;
                };
                if a_support <= 0.0 || c_support <= 0.0 {
                    continue;
                }

                let confidence = set.support / a_support;
                if confidence < min_confidence {
                    continue;
                }

                rules.push(AssociationRule {
                    antecedents: names(&antecedent),
                    consequents: names(&consequent),
                    support: set.support,
                    confidence,
                    antecedent_support: a_support,
                    consequent_support: c_support,
                    lift: confidence / c_support,
                });
            }
        }
    }

    rules
}

/// `size`-element combinations of `items`, lexicographic
fn combinations(items: &[usize], size: usize) -> Vec<Vec<usize>> {
    fn walk(items: &[usize], size: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i]);
            walk(items, size, i + 1, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    walk(items, size, 0, &mut Vec::with_capacity(size), &mut out);
    out
}

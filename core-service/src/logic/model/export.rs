//! Human-readable views of a fitted tree

use std::fmt::{self, Display, Write};

use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    LessEq,
    Greater,
}

/// One threshold test on a root-to-leaf path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub feature: String,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.comparison {
            Comparison::LessEq => "<=",
            Comparison::Greater => ">",
        };
        write!(f, "{} {} {:.2}", self.feature, op, self.threshold)
    }
}

/// Conjunctive path from the root to one leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRule<L> {
    pub conditions: Vec<Condition>,
    pub class: L,
    pub samples: usize,
}

impl<L: Display> Display for TreeRule<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "ALWAYS => {} ({} samples)", self.class, self.samples);
        }
        let joined = self
            .conditions
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" AND ");
        write!(f, "IF {} => {} ({} samples)", joined, self.class, self.samples)
    }
}

/// Render the tree as indented branches, one line per test or leaf:
///
/// ```text
/// |--- Attendance <= 74.50
/// |   |--- class: Low
/// |--- Attendance >  74.50
/// |   |--- class: High
/// ```
pub fn export_text<L: Copy + Ord + Display>(tree: &DecisionTree<L>) -> String {
    let mut out = String::new();
    write_node(tree, 0, 0, &mut out);
    out
}

fn write_node<L: Copy + Ord + Display>(
    tree: &DecisionTree<L>,
    id: usize,
    depth: usize,
    out: &mut String,
) {
    let indent = "|   ".repeat(depth);
    match &tree.nodes()[id] {
        Node::Split { feature, threshold, left, right, .. } => {
            let name = &tree.feature_names()[*feature];
            let _ = writeln!(out, "{}|--- {} <= {:.2}", indent, name, threshold);
            write_node(tree, *left, depth + 1, out);
            let _ = writeln!(out, "{}|--- {} >  {:.2}", indent, name, threshold);
            write_node(tree, *right, depth + 1, out);
        }
        Node::Leaf { class, .. } => {
            let _ = writeln!(out, "{}|--- class: {}", indent, tree.classes()[*class]);
        }
    }
}

/// Every root-to-leaf path, left branches first
pub fn leaf_rules<L: Copy + Ord>(tree: &DecisionTree<L>) -> Vec<TreeRule<L>> {
    let mut rules = Vec::with_capacity(tree.n_leaves());
    collect_rules(tree, 0, &mut Vec::new(), &mut rules);
    rules
}

fn collect_rules<L: Copy + Ord>(
    tree: &DecisionTree<L>,
    id: usize,
    path: &mut Vec<Condition>,
    rules: &mut Vec<TreeRule<L>>,
) {
    match &tree.nodes()[id] {
        Node::Split { feature, threshold, left, right, .. } => {
            let feature = tree.feature_names()[*feature].clone();

            path.push(Condition {
                feature: feature.clone(),
                comparison: Comparison::LessEq,
                threshold: *threshold,
            });
            collect_rules(tree, *left, path, rules);
            path.pop();

            path.push(Condition {
                feature,
                comparison: Comparison::Greater,
                threshold: *threshold,
            });
            collect_rules(tree, *right, path, rules);
            path.pop();
        }
        Node::Leaf { class, samples, .. } => rules.push(TreeRule {
            conditions: path.clone(),
            class: tree.classes()[*class],
            samples: *samples,
        }),
    }
}

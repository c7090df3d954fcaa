//! CART Decision Tree
//!
//! Gini-impurity classification tree with a depth bound. Split thresholds sit
//! halfway between consecutive distinct feature values and samples with
//! `value <= threshold` go left. The seed only decides the order features are
//! scanned in, which settles ties between equally good splits.
//!
//! An impure node below the depth bound always splits when any threshold
//! exists, even if no split lowers its impurity, so an XOR-shaped pair of
//! features can still be separated one level down.
//!
//! Leaf majority ties go to the first class in `L`'s `Ord` order. For
//! `PerformanceLevel` that is Low, Medium, High, not the alphabetical
//! High, Low, Medium a string-labelled classifier would use.

use std::collections::BTreeSet;

use ndarray::{ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_RANDOM_SEED};

/// Impurity differences below this are treated as equal
const EPSILON: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("{rows} feature rows but {labels} labels")]
    ShapeMismatch { rows: usize, labels: usize },

    #[error("expected {expected} feature names, got {actual}")]
    FeatureNames { expected: usize, actual: usize },
}

/// Tree growth parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: DEFAULT_RANDOM_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        samples: usize,
    },
    Leaf {
        /// Index into the tree's class list
        class: usize,
        counts: Vec<usize>,
        samples: usize,
    },
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Fitted classification tree over labels of type `L`
#[derive(Debug, Clone)]
pub struct DecisionTree<L> {
    params: TreeParams,
    classes: Vec<L>,
    feature_names: Vec<String>,
    nodes: Vec<Node>,
}

impl<L: Copy + Ord> DecisionTree<L> {
    /// Fit a tree on `x` (one row per sample) and `labels`
    pub fn fit(
        x: ArrayView2<f64>,
        labels: &[L],
        feature_names: &[&str],
        params: TreeParams,
    ) -> Result<Self, TreeError> {
        let (rows, cols) = x.dim();
        if rows == 0 {
            return Err(TreeError::EmptyTrainingSet);
        }
        if rows != labels.len() {
            return Err(TreeError::ShapeMismatch { rows, labels: labels.len() });
        }
        if cols != feature_names.len() {
            return Err(TreeError::FeatureNames {
                expected: cols,
                actual: feature_names.len(),
            });
        }

        let classes: Vec<L> = labels.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let encoded: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or_default())
            .collect();

        let mut tree = Self {
            params,
            classes,
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            nodes: Vec::new(),
        };

        let mut rng = StdRng::seed_from_u64(tree.params.seed);
        tree.grow(x, &encoded, (0..rows).collect(), 0, &mut rng);

        Ok(tree)
    }

    fn grow(
        &mut self,
        x: ArrayView2<f64>,
        y: &[usize],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let counts = self.class_counts(y, &indices);
        let samples = indices.len();
        let impurity = gini(&counts, samples);

        let node_id = self.nodes.len();
        self.nodes.push(leaf(counts, samples));

        if depth >= self.params.max_depth
            || samples < self.params.min_samples_split
            || impurity <= EPSILON
        {
            return node_id;
        }

        let Some(split) = self.best_split(x, y, &indices, rng) else {
            return node_id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[[i, split.feature]] <= split.threshold);

        let left = self.grow(x, y, left_idx, depth + 1, rng);
        let right = self.grow(x, y, right_idx, depth + 1, rng);

        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            samples,
        };

        node_id
    }

    fn best_split(
        &self,
        x: ArrayView2<f64>,
        y: &[usize],
        indices: &[usize],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let total = self.class_counts(y, indices);

        let mut features: Vec<usize> = (0..x.ncols()).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;

        for feature in features {
            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left_counts = vec![0usize; self.classes.len()];

            for pos in 0..n - 1 {
                left_counts[y[sorted[pos]]] += 1;

                let current = x[[sorted[pos], feature]];
                let next = x[[sorted[pos + 1], feature]];
                if next <= current + EPSILON {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_counts: Vec<usize> = total
                    .iter()
                    .zip(&left_counts)
                    .map(|(t, l)| t - l)
                    .collect();

                let weighted = (n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right))
                    / n as f64;

                if best.as_ref().map_or(true, |b| weighted < b.impurity - EPSILON) {
                    let mut threshold = (current + next) / 2.0;
                    if threshold >= next {
                        threshold = current;
                    }
                    best = Some(SplitCandidate { feature, threshold, impurity: weighted });
                }
            }
        }

        best
    }

    fn class_counts(&self, y: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &i in indices {
            counts[y[i]] += 1;
        }
        counts
    }

    /// Predict the class of one feature row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> L {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Split { feature, threshold, left, right, .. } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { class, .. } => return self.classes[*class],
            }
        }
    }

    /// Predict every row of `x`
    pub fn predict(&self, x: ArrayView2<f64>) -> Vec<L> {
        x.axis_iter(Axis(0)).map(|row| self.predict_row(row)).collect()
    }

    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    /// Number of split levels on the longest path
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

fn leaf(counts: Vec<usize>, samples: usize) -> Node {
    // First maximum wins, matching class order
    let class = counts
        .iter()
        .enumerate()
        .fold((0, 0), |(best_i, best_c), (i, &c)| if c > best_c { (i, c) } else { (best_i, best_c) })
        .0;
    Node::Leaf { class, counts, samples }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

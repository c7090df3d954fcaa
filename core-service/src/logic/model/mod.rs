//! Model Module - Performance classifier
//!
//! Shallow CART tree over the engagement metrics, plus text and rule views
//! of the fitted tree for interpretation.

pub mod tree;
pub mod export;

// Re-export common types
pub use tree::{DecisionTree, Node, TreeError, TreeParams};
pub use export::{export_text, leaf_rules, Comparison, Condition, TreeRule};

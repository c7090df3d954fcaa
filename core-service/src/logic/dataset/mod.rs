//! Dataset Module - Student tables
//!
//! Typed rows for the raw, predictions and rules tables and their CSV codec.

pub mod record;
pub mod codec;


pub use record::{round_to, PerformanceLevel, PredictedRecord, RuleRecord, StudentRecord};
pub use codec::{
    read_predictions, read_rules, read_students, write_predictions, write_rules,
    write_students, RULE_COLUMNS,
};

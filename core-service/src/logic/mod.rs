//! Logic Module - Data generation, classification & rule mining
//!
//! ## Layout
//! - `dataset/` - Typed tables and their CSV codec
//! - `store/` - Table persistence (flat files, in-memory)
//! - `generator` - Synthetic student tables
//! - `model/` - Decision tree classifier and its text/rule views
//! - `rules/` - Discretization, Apriori, association rules
//! - `pipeline/` - One end-to-end run with an all-or-nothing commit
//! - `query` - Read-side views for the API

pub mod config;
pub mod dataset;
pub mod store;
pub mod generator;
pub mod model;
pub mod rules;
pub mod pipeline;
pub mod query;

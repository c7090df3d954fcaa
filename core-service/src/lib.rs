//! Student Analytics Core
//!
//! Synthetic student records, a shallow decision tree over engagement
//! metrics, and association rules linking engagement to performance.
//!
//! # Data flow
//!
//! ```text
//! ┌───────────┐   raw table   ┌──────────────────────────────┐
//! │ Generator │ ────────────▶ │ Pipeline                     │
//! └───────────┘               │  load → tree → predict       │
//!       ▲                     │       → discretize → Apriori │
//!       │ upload              └──────────────┬───────────────┘
//! ┌─────┴─────┐                              │ one commit
//! │ API       │ ◀──── predictions, rules ─── ▼
//! └───────────┘                        ┌────────────┐
//!                                      │ TableStore │
//!                                      └────────────┘
//! ```

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{PipelineError, PipelineResult};
pub use logic::config::PipelineConfig;
pub use logic::dataset::{PerformanceLevel, PredictedRecord, RuleRecord, StudentRecord};
pub use logic::generator::Generator;
pub use logic::pipeline::{Analysis, Pipeline, PipelineReport};
pub use logic::store::{Commit, FileStore, MemoryStore, StoreError, Table, TableStore};

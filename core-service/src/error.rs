//! Error handling

use thiserror::Error;

use crate::logic::model::TreeError;
use crate::logic::store::{StoreError, Table};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A table the run depends on has never been written
    #[error("{0} table not found")]
    MissingFile(Table),

    /// Input does not have the shape of a student table
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Settings that cannot produce well-defined rules or trees
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("training failed: {0}")]
    Training(#[from] TreeError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Commit of output tables failed; prior tables are left in place
    #[error("storage error: {0}")]
    Storage(String),
}

impl PipelineError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        PipelineError::MalformedInput(msg.into())
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(table) => PipelineError::MissingFile(table),
            other => PipelineError::Storage(other.to_string()),
        }
    }
}

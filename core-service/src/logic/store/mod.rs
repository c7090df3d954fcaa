//! Store Module - Table persistence
//!
//! Every table the system reads or writes goes through a [`TableStore`].
//! A commit replaces all of its tables as one unit, so readers never see
//! predictions from one run next to rules from another. The file backend
//! keeps that guarantee across crashes by publishing whole generations.

pub mod file;
pub mod memory;


use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{PREDICTIONS_TABLE_FILE, RAW_TABLE_FILE, RULES_TABLE_FILE};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Persisted tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Table {
    RawStudents,
    Predictions,
    Rules,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::RawStudents, Table::Predictions, Table::Rules];

    pub fn file_name(&self) -> &'static str {
        match self {
            Table::RawStudents => RAW_TABLE_FILE,
            Table::Predictions => PREDICTIONS_TABLE_FILE,
            Table::Rules => RULES_TABLE_FILE,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::RawStudents => "raw students",
            Table::Predictions => "predictions",
            Table::Rules => "rules",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} table not found")]
    NotFound(Table),

    #[error("io error on {table}: {source}")]
    Io {
        table: Table,
        #[source]
        source: std::io::Error,
    },
}

/// Tables to replace together
#[derive(Debug, Default, Clone)]
pub struct Commit {
    writes: Vec<(Table, Vec<u8>)>,
}

impl Commit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a table; staging the same table twice keeps the last contents
    pub fn put(mut self, table: Table, contents: Vec<u8>) -> Self {
        self.writes.retain(|(t, _)| *t != table);
        self.writes.push((table, contents));
        self
    }

    pub fn tables(&self) -> Vec<Table> {
        self.writes.iter().map(|(t, _)| *t).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_writes(self) -> Vec<(Table, Vec<u8>)> {
        self.writes
    }
}

/// Storage backend for the student tables
pub trait TableStore: Send + Sync {
    /// Full contents of a table
    fn read(&self, table: Table) -> Result<Vec<u8>, StoreError>;

    fn exists(&self, table: Table) -> bool;

    /// Replace every staged table, all or nothing
    fn commit(&self, commit: Commit) -> Result<(), StoreError>;
}

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{Commit, StoreError, Table, TableStore};

/// In-process table store, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one table
    pub fn with_table(table: Table, contents: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.tables.write().insert(table, contents.into());
        store
    }
}

impl TableStore for MemoryStore {
    fn read(&self, table: Table) -> Result<Vec<u8>, StoreError> {
        self.tables
            .read()
            .get(&table)
            .cloned()
            .ok_or(StoreError::NotFound(table))
    }

    fn exists(&self, table: Table) -> bool {
        self.tables.read().contains_key(&table)
    }

    fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        for (table, contents) in commit.into_writes() {
            tables.insert(table, contents);
        }
        Ok(())
    }
}

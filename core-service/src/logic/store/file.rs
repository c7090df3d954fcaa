use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use uuid::Uuid;

use super::{Commit, StoreError, Table, TableStore};

const CURRENT_FILE: &str = "CURRENT";
const GENERATIONS_DIR: &str = "generations";

/// Unpublished generations older than this are left over from a crashed commit
const STALE_GENERATION_AGE: Duration = Duration::from_secs(600);

/// Table store rooted at a data directory.
///
/// Each commit builds a complete generation of the table set under
/// `generations/<id>/` and publishes it by atomically renaming a new
/// `CURRENT` pointer into place. A crash before that rename leaves the
/// previous generation live; a crash after it leaves the new one live.
///
/// Without a `CURRENT` pointer, tables are read from flat files in the data
/// directory, and the first commit carries them into its generation.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where `table` is currently read from
    pub fn path(&self, table: Table) -> PathBuf {
        self.table_dir(self.current_generation().as_deref())
            .join(table.file_name())
    }

    fn current_generation(&self) -> Option<String> {
        let id = fs::read_to_string(self.base_dir.join(CURRENT_FILE)).ok()?;
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    fn generations_dir(&self) -> PathBuf {
        self.base_dir.join(GENERATIONS_DIR)
    }

    fn table_dir(&self, generation: Option<&str>) -> PathBuf {
        match generation {
            Some(id) => self.generations_dir().join(id),
            None => self.base_dir.clone(),
        }
    }

    /// Build a full generation under `generations/<id>/` without publishing it.
    ///
    /// Tables the commit does not touch are linked (or copied) from the live
    /// generation. On failure the partial directory is removed.
    pub(super) fn stage_generation(
        &self,
        writes: Vec<(Table, Vec<u8>)>,
        id: &str,
    ) -> Result<PathBuf, StoreError> {
        let Some(first) = writes.first().map(|(t, _)| *t) else {
            return Err(StoreError::Io {
                table: Table::RawStudents,
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty generation"),
            });
        };

        let dir = self.generations_dir().join(id);
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io { table: first, source })?;

        let source_dir = self.table_dir(self.current_generation().as_deref());
        let result = fill_generation(&dir, &source_dir, writes);
        if result.is_err() {
            let _ = fs::remove_dir_all(&dir);
        }
        result.map(|_| dir)
    }

    /// Point `CURRENT` at generation `id`
    fn publish(&self, id: &str) -> io::Result<()> {
        let tmp = self.base_dir.join(format!(".{}.{}.tmp", CURRENT_FILE, id));
        let result = write_synced(&tmp, id.as_bytes())
            .and_then(|_| fs::rename(&tmp, self.base_dir.join(CURRENT_FILE)));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result?;

        sync_dir(&self.base_dir);
        Ok(())
    }

    /// Drop the generation just replaced and any stale leftovers
    fn prune(&self, live: &str, replaced: Option<&str>) {
        match replaced {
            Some(previous) => {
                let dir = self.generations_dir().join(previous);
                if let Err(e) = fs::remove_dir_all(&dir) {
                    log::warn!("Failed to remove generation {}: {}", dir.display(), e);
                }
            }
            None => {
                for table in Table::ALL {
                    let flat = self.base_dir.join(table.file_name());
                    if flat.is_file() {
                        if let Err(e) = fs::remove_file(&flat) {
                            log::warn!("Failed to remove {}: {}", flat.display(), e);
                        }
                    }
                }
            }
        }

        let Ok(entries) = fs::read_dir(self.generations_dir()) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.file_name() == live {
                continue;
            }
            let stale = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .map_or(false, |age| age > STALE_GENERATION_AGE);
            if stale {
                log::info!("Removing abandoned generation {}", entry.path().display());
                let _ = fs::remove_dir_all(entry.path());
            }
        }
    }
}

impl TableStore for FileStore {
    fn read(&self, table: Table) -> Result<Vec<u8>, StoreError> {
        // A commit may retire the generation between resolving and reading
        for _ in 0..3 {
            let generation = self.current_generation();
            let path = self.table_dir(generation.as_deref()).join(table.file_name());
            match fs::read(&path) {
                Ok(contents) => return Ok(contents),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    if self.current_generation() == generation {
                        return Err(StoreError::NotFound(table));
                    }
                }
                Err(source) => return Err(StoreError::Io { table, source }),
            }
        }
        Err(StoreError::NotFound(table))
    }

    fn exists(&self, table: Table) -> bool {
        self.path(table).is_file()
    }

    fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        let Some(first) = commit.tables().first().copied() else {
            return Ok(());
        };

        fs::create_dir_all(&self.base_dir)
            .map_err(|source| StoreError::Io { table: first, source })?;

        let replaced = self.current_generation();
        let id = Uuid::new_v4().simple().to_string();
        let dir = self.stage_generation(commit.into_writes(), &id)?;

        if let Err(source) = self.publish(&id) {
            log::error!("Commit {} failed to publish: {}", id, source);
            let _ = fs::remove_dir_all(&dir);
            return Err(StoreError::Io { table: first, source });
        }

        self.prune(&id, replaced.as_deref());
        log::debug!("Commit {} published in {}", id, self.base_dir.display());
        Ok(())
    }
}

fn fill_generation(
    dir: &Path,
    source_dir: &Path,
    writes: Vec<(Table, Vec<u8>)>,
) -> Result<(), StoreError> {
    let written: Vec<Table> = writes.iter().map(|(t, _)| *t).collect();

    for table in Table::ALL.into_iter().filter(|t| !written.contains(t)) {
        let from = source_dir.join(table.file_name());
        if !from.is_file() {
            continue;
        }
        let to = dir.join(table.file_name());
        if fs::hard_link(&from, &to).is_err() {
            fs::copy(&from, &to).map_err(|source| StoreError::Io { table, source })?;
        }
    }

    for (table, contents) in writes {
        write_synced(&dir.join(table.file_name()), &contents)
            .map_err(|source| StoreError::Io { table, source })?;
    }

    sync_dir(dir);
    Ok(())
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Best effort; not every platform can open a directory for syncing
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

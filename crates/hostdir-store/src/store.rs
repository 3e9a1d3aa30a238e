//! RecordStore — CSV-backed alias directory.
//!
//! Provides the four operations the HTTP layer consumes: resolve a host,
//! resolve a timestamp, bind an alias, update a timestamp. Each one runs
//! inside a single critical section; mutations hold the write lock across
//! lookup, mutation and the file rewrite.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::persist;
use crate::record::Record;

/// Open-time knobs for a [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Replace the backing file through a temp file + rename instead of
    /// truncating it in place.
    pub atomic_writes: bool,
}

/// Thread-safe alias/record store backed by a CSV file.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    options: StoreOptions,
    records: RwLock<Vec<Record>>,
}

impl RecordStore {
    /// Open (or create) the store at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open (or create) the store at `path`.
    ///
    /// Fails with [`StoreError::Open`] when the file cannot be created or
    /// read; the caller should not start serving in that case.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = persist::load(&path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        debug!(?path, records = records.len(), "record store opened");
        Ok(Self {
            inner: Arc::new(Inner {
                path,
                options,
                records: RwLock::new(records),
            }),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record in insertion order.
    pub fn records(&self) -> Vec<Record> {
        self.read().clone()
    }

    // ── Lookups ────────────────────────────────────────────────────

    /// Resolve `alias` (case-insensitive) to its host identifier.
    ///
    /// The scan covers every field, so a host identifier resolves to itself.
    pub fn resolve_host(&self, alias: &str) -> StoreResult<String> {
        let alias = alias.to_lowercase();
        let records = self.read();
        find(&records, &alias)
            .map(|i| records[i].host().to_string())
            .ok_or(StoreError::NotFound(alias))
    }

    /// Resolve `alias` (case-insensitive) to the timestamp of its record.
    pub fn resolve_timestamp(&self, alias: &str) -> StoreResult<String> {
        let alias = alias.to_lowercase();
        let records = self.read();
        find(&records, &alias)
            .map(|i| records[i].timestamp().to_string())
            .ok_or(StoreError::NotFound(alias))
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Bind `alias` to `host`.
    ///
    /// Rejected with [`StoreError::AliasConflict`] if the alias already
    /// resolves anywhere, including to `host` itself. Otherwise the alias is
    /// appended to the record holding `host`, or a new
    /// `[host, timestamp, alias]` record is created.
    pub fn bind_alias(&self, host: &str, alias: &str, timestamp: &str) -> StoreResult<()> {
        let alias = alias.to_lowercase();
        let mut records = self.write();
        check_unbound(&records, &alias)?;

        match find(&records, host) {
            Some(i) => records[i].push_alias(alias.clone()),
            None => {
                let mut record = Record::new(host, timestamp);
                record.push_alias(alias.clone());
                records.push(record);
            }
        }
        debug!(host, %alias, "alias bound");
        self.persist(&records)
    }

    /// Refresh the timestamp of the record holding `host`.
    ///
    /// An existing record only has its timestamp overwritten; `alias` is
    /// ignored. For an unseen host a new record is created, carrying `alias`
    /// when it is non-empty, under the same conflict rule as
    /// [`bind_alias`](Self::bind_alias).
    pub fn update_timestamp(&self, host: &str, alias: &str, timestamp: &str) -> StoreResult<()> {
        let mut records = self.write();

        match find(&records, host) {
            Some(i) => records[i].set_timestamp(timestamp),
            None => {
                let mut record = Record::new(host, timestamp);
                if !alias.is_empty() {
                    let alias = alias.to_lowercase();
                    check_unbound(&records, &alias)?;
                    record.push_alias(alias);
                }
                records.push(record);
            }
        }
        debug!(host, timestamp, "timestamp updated");
        self.persist(&records)
    }

    fn persist(&self, records: &[Record]) -> StoreResult<()> {
        persist::save(&self.inner.path, records, self.inner.options.atomic_writes).map_err(
            |source| StoreError::PersistenceFailure {
                path: self.inner.path.clone(),
                source,
            },
        )
    }

    // A panicking holder can at worst leave one pushed alias or one
    // overwritten timestamp behind, both of which are valid states.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Record>> {
        self.inner
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Record>> {
        self.inner
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Index of the first record with a field equal to `key`. Linear scan.
fn find(records: &[Record], key: &str) -> Option<usize> {
    records.iter().position(|record| record.contains(key))
}

fn check_unbound(records: &[Record], alias: &str) -> StoreResult<()> {
    match find(records, alias) {
        Some(i) => Err(StoreError::AliasConflict {
            alias: alias.to_string(),
            host: records[i].host().to_string(),
        }),
        None => Ok(()),
    }
}

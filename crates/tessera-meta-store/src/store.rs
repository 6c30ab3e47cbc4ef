//! Document store backed by redb.
//!
//! Every namespace is a table of `sequence -> JSON document`. The next
//! sequence number of each namespace lives in the `namespaces` table and is
//! bumped inside the same write transaction as the insert, so sequence
//! numbers are never reused.

use crate::cursor::MetaCursor;
use crate::document::Document;
use crate::query::{Filter, FindOptions};
use crate::tables;
use redb::{Database, ReadableTable, ReadableTableMetadata, WriteTransaction};
use std::path::Path;
use tracing::debug;

/// Error type for metadata store operations
#[derive(Debug, thiserror::Error)]
pub enum MetaStoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::DatabaseError),
    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("redb transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("document encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::TransactionError> for MetaStoreError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Transaction(Box::new(e))
    }
}

impl From<MetaStoreError> for tessera_common::Error {
    fn from(e: MetaStoreError) -> Self {
        match e {
            MetaStoreError::Io(io) => Self::Io(io),
            other => Self::MetaStore(other.to_string()),
        }
    }
}

pub type MetaStoreResult<T> = Result<T, MetaStoreError>;

/// A single mutation applied by [`MetaStore::apply`]
#[derive(Clone, Debug, PartialEq)]
pub enum Write {
    Insert { namespace: String, document: Document },
    Delete { namespace: String, filter: Filter },
}

/// Embedded metadata document store
pub struct MetaStore {
    db: Database,
}

impl MetaStore {
    /// Open (or create) the redb database at the given path.
    pub fn open(path: impl AsRef<Path>) -> MetaStoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Create a store that lives only as long as this value
    pub fn in_memory() -> MetaStoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> MetaStoreResult<Self> {
        // Create the registry eagerly so later read txns don't fail
        let write_txn = db.begin_write()?;
        {
            let _t = write_txn.open_table(tables::NAMESPACES)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    // ---- Writes ----

    /// Append a document to `namespace`, returning its sequence number
    pub fn insert(&self, namespace: &str, document: &Document) -> MetaStoreResult<u64> {
        let write_txn = self.db.begin_write()?;
        let seq = Self::insert_in(&write_txn, namespace, document)?;
        write_txn.commit()?;
        Ok(seq)
    }

    /// Append several documents in one transaction
    pub fn insert_many(&self, namespace: &str, documents: &[Document]) -> MetaStoreResult<Vec<u64>> {
        let write_txn = self.db.begin_write()?;
        let seqs = documents
            .iter()
            .map(|doc| Self::insert_in(&write_txn, namespace, doc))
            .collect::<MetaStoreResult<Vec<_>>>()?;
        write_txn.commit()?;
        Ok(seqs)
    }

    /// Remove every document of `namespace` matching `filter`
    pub fn delete(&self, namespace: &str, filter: &Filter) -> MetaStoreResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = Self::delete_in(&write_txn, namespace, filter)?;
        write_txn.commit()?;
        Ok(removed)
    }

    /// Apply all `writes` in order inside a single transaction. Either every
    /// write becomes visible or none does.
    pub fn apply(&self, writes: &[Write]) -> MetaStoreResult<()> {
        let write_txn = self.db.begin_write()?;
        for write in writes {
            match write {
                Write::Insert {
                    namespace,
                    document,
                } => {
                    Self::insert_in(&write_txn, namespace, document)?;
                }
                Write::Delete { namespace, filter } => {
                    Self::delete_in(&write_txn, namespace, filter)?;
                }
            }
        }
        write_txn.commit()?;
        debug!("Applied {} metadata writes", writes.len());
        Ok(())
    }

    /// Drop a namespace and all its documents. Returns false if it did not exist.
    pub fn drop_namespace(&self, namespace: &str) -> MetaStoreResult<bool> {
        let table_name = tables::document_table_name(namespace);
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut registry = write_txn.open_table(tables::NAMESPACES)?;
            registry.remove(namespace)?.is_some()
        };
        write_txn.delete_table(tables::documents(&table_name))?;
        write_txn.commit()?;
        Ok(existed)
    }

    // ---- Reads ----

    /// Open a cursor over `namespace`. A namespace that was never written
    /// yields an empty cursor.
    pub fn find(&self, namespace: &str, options: FindOptions) -> MetaStoreResult<MetaCursor> {
        if !options.flags.is_empty() {
            debug!(
                "Cursor flags {:#x} ignored by embedded store",
                options.flags.bits()
            );
        }
        let table_name = tables::document_table_name(namespace);
        let read_txn = self.db.begin_read()?;
        match read_txn.open_table(tables::documents(&table_name)) {
            Ok(table) => MetaCursor::open(namespace, &table, options),
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(MetaCursor::empty(namespace, options)),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of documents in `namespace`
    pub fn count(&self, namespace: &str) -> MetaStoreResult<u64> {
        let table_name = tables::document_table_name(namespace);
        let read_txn = self.db.begin_read()?;
        match read_txn.open_table(tables::documents(&table_name)) {
            Ok(table) => Ok(table.len()?),
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all namespaces that have been written to
    pub fn list_namespaces(&self) -> MetaStoreResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(tables::NAMESPACES)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            result.push(entry.0.value().to_string());
        }
        Ok(result)
    }

    // ---- Generic helpers ----

    fn insert_in(
        write_txn: &WriteTransaction,
        namespace: &str,
        document: &Document,
    ) -> MetaStoreResult<u64> {
        let bytes = document.to_bytes()?;
        let seq = {
            let mut registry = write_txn.open_table(tables::NAMESPACES)?;
            let seq = registry.get(namespace)?.map_or(0, |v| v.value());
            registry.insert(namespace, seq + 1)?;
            seq
        };
        let table_name = tables::document_table_name(namespace);
        let mut table = write_txn.open_table(tables::documents(&table_name))?;
        table.insert(seq, bytes.as_slice())?;
        Ok(seq)
    }

    fn delete_in(
        write_txn: &WriteTransaction,
        namespace: &str,
        filter: &Filter,
    ) -> MetaStoreResult<usize> {
        // Opening the table below would create it for a namespace never written
        if write_txn.open_table(tables::NAMESPACES)?.get(namespace)?.is_none() {
            return Ok(0);
        }
        let table_name = tables::document_table_name(namespace);
        let mut table = write_txn.open_table(tables::documents(&table_name))?;

        // Collect keys first, then delete
        let mut keys_to_delete = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            if Document::from_bytes(entry.1.value())?.matches(filter) {
                keys_to_delete.push(entry.0.value());
            }
        }
        for key in &keys_to_delete {
            table.remove(*key)?;
        }
        Ok(keys_to_delete.len())
    }
}

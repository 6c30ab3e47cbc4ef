//! Deferred metadata operations
//!
//! Batches whose persistency allows it are queued in memory and written to
//! the metadata store on the next flush. A batch that must be persisted
//! immediately first drains the queue, so operations always reach the store
//! in submission order.

use crate::collection::Collection;
use crate::pool::{MetaConnection, MetaPool};
use crate::store::collections_namespace;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tessera_common::{BackendIndex, Error, Result};
use tessera_meta_store::{Document, Filter, Write};
use tessera_semantics::{Atomicity, Semantics};
use tracing::{debug, warn};

/// Something that holds unwritten operations and can force them out
pub trait OperationCache: Send + Sync {
    /// Write every queued operation before returning. Succeeds without
    /// touching a backend when nothing is queued.
    fn flush(&self) -> Result<()>;
}

/// A single metadata mutation
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    CreateCollection { store: String, document: Document },
    DeleteCollection { store: String, name: String },
}

impl Operation {
    pub fn create_collection(collection: &Collection) -> Self {
        Self::CreateCollection {
            store: collection.store().name().to_string(),
            document: collection.to_document(),
        }
    }

    /// Namespace this operation writes to
    pub fn namespace(&self) -> String {
        match self {
            Self::CreateCollection { store, .. } | Self::DeleteCollection { store, .. } => {
                collections_namespace(store)
            }
        }
    }

    fn to_write(&self) -> Write {
        match self {
            Self::CreateCollection { document, .. } => Write::Insert {
                namespace: self.namespace(),
                document: document.clone(),
            },
            Self::DeleteCollection { name, .. } => Write::Delete {
                namespace: self.namespace(),
                filter: Filter::equals("name", name.as_str()),
            },
        }
    }
}

/// Ordered operations executed under one set of semantics
#[derive(Clone, Debug)]
pub struct Batch {
    semantics: Arc<Semantics>,
    operations: Vec<Operation>,
}

impl Batch {
    pub const fn new(semantics: Arc<Semantics>) -> Self {
        Self {
            semantics,
            operations: Vec::new(),
        }
    }

    pub fn push(&mut self, operation: Operation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub const fn semantics(&self) -> &Arc<Semantics> {
        &self.semantics
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Batch atomicity commits everything in one transaction; otherwise
    /// each operation commits on its own. On failure, returns how many
    /// leading operations were committed along with the error.
    fn execute(&self, connection: &MetaConnection) -> std::result::Result<(), (usize, Error)> {
        let writes: Vec<Write> = self.operations.iter().map(Operation::to_write).collect();
        match self.semantics.atomicity() {
            Atomicity::Batch => connection.apply(&writes).map_err(|e| (0, e)),
            Atomicity::Operation | Atomicity::None => {
                for (applied, write) in writes.iter().enumerate() {
                    connection
                        .apply(std::slice::from_ref(write))
                        .map_err(|e| (applied, e))?;
                }
                Ok(())
            }
        }
    }

    /// Drop the first `applied` operations, keeping the unwritten rest
    fn skip_applied(&mut self, applied: usize) {
        self.operations.drain(..applied.min(self.operations.len()));
    }
}

/// Operation queue configuration
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Queued operations that trigger an inline flush
    pub max_operations: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_operations: 1024,
        }
    }
}

#[derive(Default)]
struct Pending {
    batches: VecDeque<Batch>,
    operations: usize,
}

/// In-memory [`OperationCache`] writing through a metadata pool
pub struct OperationQueue {
    pool: Arc<MetaPool>,
    config: CacheConfig,
    pending: Mutex<Pending>,
    /// Serialises writers so drained batches reach the store in order
    flush_lock: Mutex<()>,
    flushes: AtomicU64,
}

impl OperationQueue {
    pub fn new(pool: Arc<MetaPool>, config: CacheConfig) -> Self {
        Self {
            pool,
            config,
            pending: Mutex::new(Pending::default()),
            flush_lock: Mutex::new(()),
            flushes: AtomicU64::new(0),
        }
    }

    /// Queue or execute `batch` according to its persistency
    pub fn submit(&self, batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        if batch.semantics().persistency().is_deferrable() {
            let queued = {
                let mut pending = self.pending.lock();
                pending.operations += batch.len();
                pending.batches.push_back(batch);
                pending.operations
            };
            if queued >= self.config.max_operations {
                debug!("Operation queue full ({queued} operations), flushing");
                return self.flush();
            }
            return Ok(());
        }

        let _serial = self.flush_lock.lock();
        self.drain(Some(batch))
    }

    /// Operations waiting for the next flush
    pub fn pending(&self) -> usize {
        self.pending.lock().operations
    }

    /// Number of `flush` calls so far
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Write all queued batches, followed by `immediate` if given, over one
    /// connection. Caller must hold `flush_lock`.
    fn drain(&self, immediate: Option<Batch>) -> Result<()> {
        let mut batches: Vec<Batch> = {
            let mut pending = self.pending.lock();
            pending.operations = 0;
            pending.batches.drain(..).collect()
        };
        let deferred = batches.len();
        batches.extend(immediate);

        if batches.is_empty() {
            return Ok(());
        }

        let connection = match self.pool.acquire(BackendIndex::METADATA) {
            Ok(connection) => connection,
            Err(e) => {
                batches.truncate(deferred);
                self.requeue(batches);
                return Err(e);
            }
        };

        let failure = batches.iter().enumerate().find_map(|(i, batch)| {
            batch
                .execute(&connection)
                .err()
                .map(|(applied, e)| (i, applied, e))
        });

        if let Some((failed, applied, e)) = failure {
            warn!(
                "Metadata flush failed at batch {} of {} after {applied} operations: {e}",
                failed + 1,
                batches.len()
            );
            // The immediate batch is reported to its caller, never queued
            batches.truncate(deferred);
            if failed < batches.len() {
                let mut unwritten = batches.split_off(failed);
                unwritten[0].skip_applied(applied);
                self.requeue(unwritten);
            }
            return Err(e);
        }

        debug!(
            "Flushed {deferred} deferred batches over connection {}",
            connection.id()
        );
        Ok(())
    }

    /// Put unwritten batches back at the head of the queue
    fn requeue(&self, batches: Vec<Batch>) {
        let mut pending = self.pending.lock();
        let mut restored: VecDeque<Batch> = batches.into();
        restored.append(&mut pending.batches);
        pending.operations = restored.iter().map(Batch::len).sum();
        pending.batches = restored;
    }
}

impl OperationCache for OperationQueue {
    fn flush(&self) -> Result<()> {
        let _serial = self.flush_lock.lock();
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.drain(None)
    }
}

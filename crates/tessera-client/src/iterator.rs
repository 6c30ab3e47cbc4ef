//! Enumerating the collections of a store
//!
//! Opening an iterator flushes the operation cache first, so every
//! collection created through that cache before the call is visible. The
//! iterator then holds one metadata connection and a reference on the store
//! until it is freed or dropped.

use crate::cache::OperationCache;
use crate::collection::Collection;
use crate::pool::{MetaConnector, MetaPool, PooledConnection};
use crate::store::Store;
use std::sync::Arc;
use tessera_common::{BackendIndex, Error, Result};
use tessera_meta_store::{FindOptions, MetaCursor};
use tracing::{debug, warn};

/// Forward-only iterator over the collections of one store
pub struct StoreIterator {
    // Field order is drop order: the cursor goes before its connection is
    // returned, and the store reference goes last.
    cursor: MetaCursor,
    connection: PooledConnection<MetaConnector>,
    store: Arc<Store>,
    failed: bool,
}

impl StoreIterator {
    /// Flush `cache`, take a metadata connection from `pool` and open a scan
    /// of the store's collection listing.
    pub fn new(store: &Arc<Store>, cache: &dyn OperationCache, pool: &Arc<MetaPool>) -> Result<Self> {
        cache.flush()?;

        let connection = pool.acquire(BackendIndex::METADATA)?;
        let namespace = store.collections_namespace();
        let cursor = connection.find(&namespace, FindOptions::default())?;
        debug!(
            "Iterating {namespace} over metadata connection {}",
            connection.id()
        );

        Ok(Self {
            cursor,
            connection,
            store: Arc::clone(store),
            failed: false,
        })
    }

    /// Move to the next collection.
    ///
    /// Returns false once the listing is exhausted. A cursor failure is
    /// logged and also ends the iteration; every later call returns false.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.advance()
    }

    /// The collection at the current position.
    ///
    /// Only valid directly after [`StoreIterator::next`] returned true.
    pub fn get(&self) -> Result<Collection> {
        let document = self.cursor.current().ok_or(Error::NoCurrentEntry)?;
        Collection::from_document(&self.store, document)
    }

    pub const fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Release the cursor, the connection and the store reference
    pub fn free(self) {}

    fn advance(&mut self) -> bool {
        if self.failed {
            return false;
        }
        match self.cursor.advance() {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    "Cursor on {} failed after {} entries: {e}",
                    self.cursor.namespace(),
                    self.cursor.returned()
                );
                self.failed = true;
                false
            }
        }
    }
}

impl Iterator for StoreIterator {
    type Item = Result<Collection>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().then(|| self.get())
    }
}

impl std::fmt::Debug for StoreIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreIterator")
            .field("store", &self.store.name())
            .field("cursor", &self.cursor)
            .field("connection", &self.connection)
            .field("failed", &self.failed)
            .finish()
    }
}

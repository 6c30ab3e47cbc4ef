//! Blocking connection pool
//!
//! Each backend keeps a list of idle connections and a count of open ones.
//! `acquire` reuses an idle connection, opens a new one while the backend is
//! under `max_per_backend`, and otherwise waits until a guard is dropped.
//! Dropping a [`PooledConnection`] returns its connection and never blocks
//! on anything but the backend's short critical section.

use parking_lot::{Condvar, Mutex};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tessera_common::{BackendIndex, Config, Error, Result};
use tessera_meta_store::{FindOptions, MetaCursor, MetaStore, Write};
use tracing::{debug, info, warn};

/// File name of the metadata database below the storage path
pub const METADATA_FILE: &str = "metadata.redb";

/// Opens connections to the backends of one kind
pub trait Connector: Send + Sync {
    type Connection: Send;

    /// Number of backends reachable through this connector
    fn backends(&self) -> usize;

    /// Open a new connection to backend `index`
    fn connect(&self, index: BackendIndex) -> Result<Self::Connection>;
}

/// Pool sizing
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Upper bound on open connections per backend
    pub max_per_backend: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_per_backend: 8 }
    }
}

/// Counters for observing pool traffic
#[derive(Debug, Default)]
pub struct PoolStats {
    acquired: AtomicU64,
    released: AtomicU64,
    opened: AtomicU64,
}

impl PoolStats {
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    /// Guards currently handed out
    pub fn in_use(&self) -> u64 {
        self.acquired().saturating_sub(self.released())
    }
}

struct Slot<T> {
    idle: Vec<T>,
    open: usize,
}

struct Backend<T> {
    slot: Mutex<Slot<T>>,
    available: Condvar,
}

impl<T> Backend<T> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                idle: Vec::new(),
                open: 0,
            }),
            available: Condvar::new(),
        }
    }
}

/// Pool of connections produced by a [`Connector`]
pub struct ConnectionPool<C: Connector> {
    connector: C,
    backends: Vec<Backend<C::Connection>>,
    max_per_backend: usize,
    stats: PoolStats,
}

impl<C: Connector> ConnectionPool<C> {
    pub fn new(connector: C, config: PoolConfig) -> Self {
        let backends = (0..connector.backends()).map(|_| Backend::new()).collect();
        Self {
            connector,
            backends,
            max_per_backend: config.max_per_backend.max(1),
            stats: PoolStats::default(),
        }
    }

    /// Take a connection to backend `index`, blocking while all of its
    /// connections are in use.
    pub fn acquire(self: &Arc<Self>, index: BackendIndex) -> Result<PooledConnection<C>> {
        let backend = self.backend(index)?;

        let connection = loop {
            let mut slot = backend.slot.lock();
            if let Some(connection) = slot.idle.pop() {
                break connection;
            }
            if slot.open < self.max_per_backend {
                slot.open += 1;
                drop(slot);
                break self.open(backend, index)?;
            }
            debug!(
                "All {} connections to backend {index} in use, waiting",
                slot.open
            );
            backend.available.wait(&mut slot);
        };

        self.stats.acquired.fetch_add(1, Ordering::Relaxed);
        Ok(PooledConnection {
            pool: Arc::clone(self),
            index,
            connection: Some(connection),
        })
    }

    pub fn backends(&self) -> usize {
        self.backends.len()
    }

    /// Idle connections currently parked for backend `index`
    pub fn idle(&self, index: BackendIndex) -> usize {
        self.backend(index)
            .map_or(0, |backend| backend.slot.lock().idle.len())
    }

    pub const fn stats(&self) -> &PoolStats {
        &self.stats
    }

    pub const fn connector(&self) -> &C {
        &self.connector
    }

    fn backend(&self, index: BackendIndex) -> Result<&Backend<C::Connection>> {
        self.backends
            .get(index.as_usize())
            .ok_or(Error::BackendNotFound(index))
    }

    fn open(&self, backend: &Backend<C::Connection>, index: BackendIndex) -> Result<C::Connection> {
        match self.connector.connect(index) {
            Ok(connection) => {
                self.stats.opened.fetch_add(1, Ordering::Relaxed);
                debug!("Opened connection to backend {index}");
                Ok(connection)
            }
            Err(e) => {
                // Give the reserved slot back so a waiter can try again
                backend.slot.lock().open -= 1;
                backend.available.notify_one();
                warn!("Failed to connect to backend {index}: {e}");
                Err(e)
            }
        }
    }

    fn release(&self, index: BackendIndex, connection: C::Connection) {
        if let Ok(backend) = self.backend(index) {
            backend.slot.lock().idle.push(connection);
            backend.available.notify_one();
        }
        self.stats.released.fetch_add(1, Ordering::Relaxed);
    }

    fn close(&self, index: BackendIndex) {
        if let Ok(backend) = self.backend(index) {
            let mut slot = backend.slot.lock();
            slot.open = slot.open.saturating_sub(1);
            drop(slot);
            backend.available.notify_one();
        }
        self.stats.released.fetch_add(1, Ordering::Relaxed);
    }
}

/// A connection checked out of a [`ConnectionPool`]; returned on drop
pub struct PooledConnection<C: Connector> {
    pool: Arc<ConnectionPool<C>>,
    index: BackendIndex,
    connection: Option<C::Connection>,
}

impl<C: Connector> PooledConnection<C> {
    pub const fn index(&self) -> BackendIndex {
        self.index
    }

    /// Close the connection instead of returning it to the pool
    pub fn discard(mut self) {
        if self.connection.take().is_some() {
            self.pool.close(self.index);
        }
    }
}

impl<C: Connector> Deref for PooledConnection<C> {
    type Target = C::Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("connection is present until the guard is dropped")
    }
}

impl<C: Connector> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("connection is present until the guard is dropped")
    }
}

impl<C: Connector> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(self.index, connection);
        }
    }
}

impl<C: Connector> std::fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

// ---- Metadata backend ----

/// Pool of metadata connections
pub type MetaPool = ConnectionPool<MetaConnector>;

/// Connector for the metadata servers.
///
/// Every configured metadata server addresses the same embedded store, so a
/// connection is a cheap handle; an empty server list still yields the one
/// local backend.
pub struct MetaConnector {
    store: Arc<MetaStore>,
    servers: Vec<String>,
    next_id: AtomicU64,
}

impl MetaConnector {
    pub fn new(store: Arc<MetaStore>, servers: Vec<String>) -> Self {
        Self {
            store,
            servers,
            next_id: AtomicU64::new(0),
        }
    }

    /// Open the metadata store selected by the storage section of `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = if config.storage.backend.is_persistent() {
            MetaStore::open(config.storage.path.join(METADATA_FILE))?
        } else {
            MetaStore::in_memory()?
        };
        info!(
            "Metadata store ready (backend={}, servers={})",
            config.storage.backend,
            config.servers.metadata.len()
        );
        Ok(Self::new(Arc::new(store), config.servers.metadata.clone()))
    }

    pub const fn store(&self) -> &Arc<MetaStore> {
        &self.store
    }
}

impl Connector for MetaConnector {
    type Connection = MetaConnection;

    fn backends(&self) -> usize {
        self.servers.len().max(1)
    }

    fn connect(&self, index: BackendIndex) -> Result<MetaConnection> {
        if index.as_usize() >= self.backends() {
            return Err(Error::BackendNotFound(index));
        }
        let server = self
            .servers
            .get(index.as_usize())
            .cloned()
            .unwrap_or_else(|| "local".to_string());
        Ok(MetaConnection {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            server,
            store: Arc::clone(&self.store),
        })
    }
}

/// Handle onto the metadata store for one server
pub struct MetaConnection {
    id: u64,
    server: String,
    store: Arc<MetaStore>,
}

impl MetaConnection {
    pub const fn id(&self) -> u64 {
        self.id
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn find(&self, namespace: &str, options: FindOptions) -> Result<MetaCursor> {
        Ok(self.store.find(namespace, options)?)
    }

    /// Apply writes atomically
    pub fn apply(&self, writes: &[Write]) -> Result<()> {
        Ok(self.store.apply(writes)?)
    }

    pub fn count(&self, namespace: &str) -> Result<u64> {
        Ok(self.store.count(namespace)?)
    }
}

impl std::fmt::Debug for MetaConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaConnection")
            .field("id", &self.id)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;
    use tessera_common::StorageBackend;

    /// Hands out sequence numbers; optionally fails the next connect
    struct Counter {
        backends: usize,
        fail_next: AtomicBool,
        next: AtomicU64,
    }

    impl Counter {
        fn new(backends: usize) -> Self {
            Self {
                backends,
                fail_next: AtomicBool::new(false),
                next: AtomicU64::new(0),
            }
        }
    }

    impl Connector for Counter {
        type Connection = u64;

        fn backends(&self) -> usize {
            self.backends
        }

        fn connect(&self, _index: BackendIndex) -> Result<u64> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(Error::ConnectionFailed("refused".into()));
            }
            Ok(self.next.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn pool(backends: usize, max_per_backend: usize) -> Arc<ConnectionPool<Counter>> {
        Arc::new(ConnectionPool::new(
            Counter::new(backends),
            PoolConfig { max_per_backend },
        ))
    }

    #[test]
    fn test_release_and_reuse() {
        let pool = pool(1, 4);
        let first = pool.acquire(BackendIndex::METADATA).unwrap();
        let id = *first;
        drop(first);
        assert_eq!(pool.idle(BackendIndex::METADATA), 1);

        let second = pool.acquire(BackendIndex::METADATA).unwrap();
        assert_eq!(*second, id);
        drop(second);

        let stats = pool.stats();
        assert_eq!(stats.opened(), 1);
        assert_eq!(stats.acquired(), 2);
        assert_eq!(stats.released(), 2);
        assert_eq!(stats.in_use(), 0);
    }

    #[test]
    fn test_unknown_backend() {
        let pool = pool(2, 1);
        let err = pool.acquire(BackendIndex::new(2)).unwrap_err();
        assert!(matches!(err, Error::BackendNotFound(i) if i.get() == 2));
        assert_eq!(pool.stats().acquired(), 0);
        assert!(pool.acquire(BackendIndex::new(1)).is_ok());
    }

    #[test]
    fn test_opens_up_to_cap() {
        let pool = pool(1, 2);
        let a = pool.acquire(BackendIndex::METADATA).unwrap();
        let b = pool.acquire(BackendIndex::METADATA).unwrap();
        assert_ne!(*a, *b);
        assert_eq!(pool.stats().opened(), 2);
        assert_eq!(pool.stats().in_use(), 2);
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let pool = pool(1, 1);
        let held = pool.acquire(BackendIndex::METADATA).unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || *pool.acquire(BackendIndex::METADATA).unwrap())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        let id = *held;
        drop(held);

        assert_eq!(waiter.join().unwrap(), id);
        assert_eq!(pool.stats().opened(), 1);
        assert_eq!(pool.stats().in_use(), 0);
    }

    #[test]
    fn test_failed_connect_frees_slot() {
        let pool = pool(1, 1);
        pool.connector().fail_next.store(true, Ordering::SeqCst);
        assert!(matches!(
            pool.acquire(BackendIndex::METADATA),
            Err(Error::ConnectionFailed(_))
        ));
        // The cap of one must not be used up by the failed attempt
        assert!(pool.acquire(BackendIndex::METADATA).is_ok());
        assert_eq!(pool.stats().opened(), 1);
    }

    #[test]
    fn test_discard_closes_connection() {
        let pool = pool(1, 1);
        let conn = pool.acquire(BackendIndex::METADATA).unwrap();
        conn.discard();
        assert_eq!(pool.idle(BackendIndex::METADATA), 0);
        assert_eq!(pool.stats().in_use(), 0);

        let conn = pool.acquire(BackendIndex::METADATA).unwrap();
        assert_eq!(*conn, 1);
    }

    #[test]
    fn test_meta_connector_backends() {
        let store = Arc::new(MetaStore::in_memory().unwrap());
        let local = MetaConnector::new(Arc::clone(&store), Vec::new());
        assert_eq!(local.backends(), 1);
        assert_eq!(local.connect(BackendIndex::METADATA).unwrap().server(), "local");

        let remote = MetaConnector::new(store, vec!["m1".into(), "m2".into()]);
        assert_eq!(remote.backends(), 2);
        assert_eq!(remote.connect(BackendIndex::new(1)).unwrap().server(), "m2");
        assert!(remote.connect(BackendIndex::new(2)).is_err());
    }

    #[test]
    fn test_meta_connector_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_lists(
            "d1",
            "m1",
            StorageBackend::Posix,
            dir.path().to_path_buf(),
        );
        let connector = MetaConnector::from_config(&config).unwrap();
        let conn = connector.connect(BackendIndex::METADATA).unwrap();
        assert_eq!(conn.count("s.collections").unwrap(), 0);
        assert!(dir.path().join(METADATA_FILE).exists());
    }

    #[test]
    fn test_null_backend_keeps_nothing_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_lists("d1", "m1", StorageBackend::Null, dir.path().to_path_buf());
        let connector = MetaConnector::from_config(&config).unwrap();
        let conn = connector.connect(BackendIndex::METADATA).unwrap();
        assert_eq!(conn.count("s.collections").unwrap(), 0);
        assert!(!dir.path().join(METADATA_FILE).exists());
    }
}

//! Client entry point bundling the metadata pool and operation queue

use crate::cache::{Batch, CacheConfig, OperationCache, OperationQueue};
use crate::iterator::StoreIterator;
use crate::pool::{MetaConnector, MetaPool, PoolConfig};
use crate::store::Store;
use std::path::Path;
use std::sync::Arc;
use tessera_common::{Config, Result};
use tessera_meta_store::MetaStore;
use tracing::{info, warn};

/// Tessera client
pub struct Client {
    config: Config,
    pool: Arc<MetaPool>,
    cache: OperationQueue,
}

impl Client {
    /// Connect using a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let connector = MetaConnector::from_config(&config)?;
        Ok(Self::with_connector(config, connector))
    }

    /// Connect using the configuration file at `path`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        Self::new(Config::load(path)?)
    }

    /// Client over an existing metadata store
    pub fn with_meta_store(config: Config, store: Arc<MetaStore>) -> Self {
        let connector = MetaConnector::new(store, config.servers.metadata.clone());
        Self::with_connector(config, connector)
    }

    fn with_connector(config: Config, connector: MetaConnector) -> Self {
        let pool = Arc::new(MetaPool::new(connector, PoolConfig::default()));
        let cache = OperationQueue::new(Arc::clone(&pool), CacheConfig::default());
        Self {
            config,
            pool,
            cache,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn pool(&self) -> &Arc<MetaPool> {
        &self.pool
    }

    pub const fn cache(&self) -> &OperationQueue {
        &self.cache
    }

    pub fn submit(&self, batch: Batch) -> Result<()> {
        self.cache.submit(batch)
    }

    pub fn flush(&self) -> Result<()> {
        self.cache.flush()
    }

    /// Iterate the collections of `store`, flushing queued operations first
    pub fn collections(&self, store: &Arc<Store>) -> Result<StoreIterator> {
        StoreIterator::new(store, &self.cache, &self.pool)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Err(e) = self.cache.flush() {
            warn!("Dropping {} queued operations: {e}", self.cache.pending());
        }
    }
}

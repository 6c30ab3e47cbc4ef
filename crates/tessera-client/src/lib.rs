//! Tessera Client - metadata access for stores and collections
//!
//! This crate ties the semantics model to the metadata backend: a blocking
//! connection pool, a deferred-operation cache and the store iterator that
//! flushes the cache before it reads.

pub mod cache;
pub mod client;
pub mod collection;
pub mod iterator;
pub mod pool;
pub mod store;

// Re-exports
pub use cache::{Batch, CacheConfig, Operation, OperationCache, OperationQueue};
pub use client::Client;
pub use collection::Collection;
pub use iterator::StoreIterator;
pub use pool::{
    ConnectionPool, Connector, MetaConnection, MetaConnector, MetaPool, PoolConfig, PoolStats,
    PooledConnection,
};
pub use store::Store;

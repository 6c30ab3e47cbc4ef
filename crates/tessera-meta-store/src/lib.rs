//! Tessera Metadata Store - embedded document store
//!
//! Metadata is kept as JSON documents grouped into namespaces (for example
//! `"<store>.collections"`). Each namespace is a redb table keyed by an
//! insertion sequence, so an unsorted scan returns documents in the order
//! they were written. Reads go through [`MetaCursor`], which applies filter,
//! skip, limit and projection lazily while it advances.

pub mod cursor;
pub mod document;
pub mod query;
pub mod store;
pub mod tables;

// Re-exports
pub use cursor::MetaCursor;
pub use document::Document;
pub use query::{CursorFlags, Filter, FindOptions};
pub use store::{MetaStore, MetaStoreError, MetaStoreResult, Write};

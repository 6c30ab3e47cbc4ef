//! Stores: named top-level namespaces holding collections

use crate::cache::{Batch, Operation};
use crate::collection::Collection;
use std::sync::Arc;
use tessera_semantics::Semantics;

/// Metadata namespace listing the collections of `store`
pub fn collections_namespace(store: &str) -> String {
    format!("{store}.collections")
}

/// A named store. Shared as `Arc<Store>`.
#[derive(Debug)]
pub struct Store {
    name: String,
    semantics: Arc<Semantics>,
}

impl Store {
    /// Open a store with the default semantics
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_semantics(name, Arc::new(Semantics::default()))
    }

    pub fn with_semantics(name: impl Into<String>, semantics: Arc<Semantics>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            semantics,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn semantics(&self) -> &Arc<Semantics> {
        &self.semantics
    }

    /// Namespace holding one document per member collection
    pub fn collections_namespace(&self) -> String {
        collections_namespace(&self.name)
    }

    /// Empty batch carrying this store's semantics
    pub fn batch(&self) -> Batch {
        Batch::new(Arc::clone(&self.semantics))
    }

    /// Batch creating a new collection called `name`
    pub fn create_collection(self: &Arc<Self>, name: &str) -> Batch {
        let mut batch = self.batch();
        batch.push(Operation::create_collection(&Collection::new(self, name)));
        batch
    }

    /// Batch removing every collection called `name`
    pub fn delete_collection(&self, name: &str) -> Batch {
        let mut batch = self.batch();
        batch.push(Operation::DeleteCollection {
            store: self.name.clone(),
            name: name.to_string(),
        });
        batch
    }
}

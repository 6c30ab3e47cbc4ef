//! Collections: named members of a store

use crate::store::Store;
use std::sync::Arc;
use tessera_common::{Error, Result};
use tessera_meta_store::Document;
use tessera_meta_store::document::ID_FIELD;
use uuid::Uuid;

const NAME_FIELD: &str = "name";
const STORE_FIELD: &str = "store";

/// A collection of a store, as listed in `<store>.collections`
#[derive(Clone, Debug)]
pub struct Collection {
    id: Uuid,
    name: String,
    store: Arc<Store>,
}

impl Collection {
    /// New collection with a random id
    pub fn new(store: &Arc<Store>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            store: Arc::clone(store),
        }
    }

    /// Decode a listing document of `store`
    pub fn from_document(store: &Arc<Store>, document: &Document) -> Result<Self> {
        let namespace = store.collections_namespace();

        let id = document
            .get_str(ID_FIELD)
            .ok_or_else(|| Error::malformed(&namespace, "missing _id"))?;
        let id = Uuid::parse_str(id)
            .map_err(|e| Error::malformed(&namespace, format!("invalid _id '{id}': {e}")))?;
        let name = document
            .get_str(NAME_FIELD)
            .ok_or_else(|| Error::malformed(&namespace, "missing name"))?;

        if let Some(owner) = document.get_str(STORE_FIELD)
            && owner != store.name()
        {
            return Err(Error::malformed(
                &namespace,
                format!("collection '{name}' belongs to store '{owner}'"),
            ));
        }

        Ok(Self {
            id,
            name: name.to_string(),
            store: Arc::clone(store),
        })
    }

    /// Listing document for this collection
    pub fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id.to_string())
            .with(NAME_FIELD, self.name.as_str())
            .with(STORE_FIELD, self.store.name())
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn store(&self) -> &Arc<Store> {
        &self.store
    }
}

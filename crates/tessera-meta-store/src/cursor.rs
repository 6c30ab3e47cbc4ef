//! Forward-only cursor over one namespace.
//!
//! The cursor reads from a redb snapshot taken when it was opened, so writes
//! committed afterwards are not observed. Filter, skip, limit and projection
//! are applied one document at a time as the cursor advances.

use crate::document::Document;
use crate::query::FindOptions;
use crate::store::MetaStoreResult;
use redb::{Range, ReadOnlyTable};

type DocumentTable = ReadOnlyTable<u64, &'static [u8]>;
type DocumentRange = Range<'static, u64, &'static [u8]>;

/// Cursor returned by [`crate::MetaStore::find`]
pub struct MetaCursor {
    namespace: String,
    /// `None` once exhausted or for a namespace that does not exist
    rows: Option<DocumentRange>,
    options: FindOptions,
    current: Option<Document>,
    skipped: u64,
    returned: u64,
}

impl MetaCursor {
    pub(crate) fn open(
        namespace: &str,
        table: &DocumentTable,
        options: FindOptions,
    ) -> MetaStoreResult<Self> {
        // The reference-counted range keeps the read transaction alive.
        let rows = table.range(0u64..)?;
        Ok(Self {
            namespace: namespace.to_string(),
            rows: Some(rows),
            options,
            current: None,
            skipped: 0,
            returned: 0,
        })
    }

    pub(crate) fn empty(namespace: &str, options: FindOptions) -> Self {
        Self {
            namespace: namespace.to_string(),
            rows: None,
            options,
            current: None,
            skipped: 0,
            returned: 0,
        }
    }

    /// Move to the next matching document.
    ///
    /// Returns `Ok(false)` once the namespace is exhausted or the limit is
    /// reached; every later call returns `Ok(false)` as well.
    pub fn advance(&mut self) -> MetaStoreResult<bool> {
        self.current = None;

        let limit = self.options.limit;
        if limit > 0 && self.returned >= limit {
            self.rows = None;
            return Ok(false);
        }

        let Some(rows) = self.rows.as_mut() else {
            return Ok(false);
        };

        for entry in rows.by_ref() {
            let entry = entry?;
            let document = Document::from_bytes(entry.1.value())?;

            if !document.matches(&self.options.filter) {
                continue;
            }
            if self.skipped < self.options.skip {
                self.skipped += 1;
                continue;
            }

            self.current = Some(match &self.options.projection {
                Some(fields) => document.project(fields),
                None => document,
            });
            self.returned += 1;
            return Ok(true);
        }

        self.rows = None;
        Ok(false)
    }

    /// Document at the current position, if the last `advance` returned true
    pub fn current(&self) -> Option<&Document> {
        self.current.as_ref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of documents produced so far
    pub const fn returned(&self) -> u64 {
        self.returned
    }

    /// Release the snapshot held by this cursor
    pub fn close(self) {}
}

impl std::fmt::Debug for MetaCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaCursor")
            .field("namespace", &self.namespace)
            .field("returned", &self.returned)
            .field("exhausted", &self.rows.is_none())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Document;
    use crate::query::{Filter, FindOptions};
    use crate::store::MetaStore;

    fn store_with(names: &[&str]) -> MetaStore {
        let store = MetaStore::in_memory().unwrap();
        for (i, name) in names.iter().enumerate() {
            let doc = Document::new()
                .with("name", *name)
                .with("even", i % 2 == 0);
            store.insert("ns", &doc).unwrap();
        }
        store
    }

    fn drain(store: &MetaStore, options: FindOptions) -> Vec<String> {
        let mut cursor = store.find("ns", options).unwrap();
        let mut out = Vec::new();
        while cursor.advance().unwrap() {
            out.push(cursor.current().unwrap().get_str("name").unwrap().to_string());
        }
        out
    }

    #[test]
    fn test_skip_and_limit() {
        let store = store_with(&["a", "b", "c", "d", "e"]);
        assert_eq!(
            drain(&store, FindOptions::scan().with_skip(1).with_limit(2)),
            vec!["b", "c"]
        );
        assert_eq!(drain(&store, FindOptions::scan().with_skip(10)), Vec::<String>::new());
    }

    #[test]
    fn test_filter_applies_before_skip() {
        let store = store_with(&["a", "b", "c", "d", "e"]);
        let options = FindOptions::scan()
            .with_filter(Filter::equals("even", true))
            .with_skip(1);
        assert_eq!(drain(&store, options), vec!["c", "e"]);
    }

    #[test]
    fn test_projection() {
        let store = store_with(&["a"]);
        let mut cursor = store
            .find("ns", FindOptions::scan().with_projection(&["even"]))
            .unwrap();
        assert!(cursor.advance().unwrap());
        let doc = cursor.current().unwrap();
        assert!(doc.contains_key("even"));
        assert!(!doc.contains_key("name"));
    }

    #[test]
    fn test_exhausted_stays_exhausted() {
        let store = store_with(&["a"]);
        let mut cursor = store.find("ns", FindOptions::scan()).unwrap();
        assert!(cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
        assert!(cursor.current().is_none());
        assert_eq!(cursor.returned(), 1);
    }

    #[test]
    fn test_snapshot_isolation() {
        let store = store_with(&["a"]);
        let mut cursor = store.find("ns", FindOptions::scan()).unwrap();
        store.insert("ns", &Document::new().with("name", "late")).unwrap();
        assert!(cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
        cursor.close();
        assert_eq!(drain(&store, FindOptions::scan()), vec!["a", "late"]);
    }
}

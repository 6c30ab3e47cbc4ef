//! Redb table definitions for the metadata document store.

use redb::TableDefinition;

// Key: namespace name, Value: next insertion sequence number
pub const NAMESPACES: TableDefinition<&str, u64> = TableDefinition::new("namespaces");

/// Prefix keeping document tables apart from internal tables
const DOCUMENT_TABLE_PREFIX: &str = "ns:";

/// Name of the redb table holding the documents of `namespace`
pub fn document_table_name(namespace: &str) -> String {
    format!("{DOCUMENT_TABLE_PREFIX}{namespace}")
}

// Key: insertion sequence, Value: JSON-encoded document
pub fn documents(table_name: &str) -> TableDefinition<'_, u64, &'static [u8]> {
    TableDefinition::new(table_name)
}

//! Registry of tables addressable by the CRUD scaffold.
//!
//! One lookup table replaces per-table handler code: each entry carries the
//! SQL name, the display label used in table dumps, and the primary-key
//! column used by delete/update. Derived from the schema descriptor so the
//! schema stays the single source of truth.

use std::collections::HashMap;

use crate::schema::SchemaDescriptor;

/// One addressable table.
#[derive(Debug, Clone)]
pub struct TableEntry {
    /// SQL identifier, as created in the datastore.
    pub table: String,
    /// Display label used as the JSON key in dumps.
    pub label: String,
    /// Primary-key column targeted by delete and update.
    pub key_column: String,
}

#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    entries: Vec<TableEntry>,
    index: HashMap<String, usize>,
}

impl TableRegistry {
    /// Builds the registry from the descriptor. Tables without a primary key
    /// are not addressable and are skipped.
    pub fn from_schema(schema: &SchemaDescriptor) -> Self {
        let mut registry = TableRegistry::default();
        for table in &schema.tables {
            let Some(key) = table
                .columns
                .iter()
                .find(|c| c.constraint == Some("PRIMARY KEY"))
            else {
                continue;
            };
            registry.insert(TableEntry {
                table: table.name.to_string(),
                label: table.label.to_string(),
                key_column: key.name.to_string(),
            });
        }
        registry
    }

    fn insert(&mut self, entry: TableEntry) {
        let position = self.entries.len();
        self.index.insert(entry.table.to_lowercase(), position);
        self.index.insert(entry.label.to_lowercase(), position);
        self.entries.push(entry);
    }

    /// Case-insensitive lookup by SQL name or display label.
    pub fn get(&self, name: &str) -> Option<&TableEntry> {
        self.index
            .get(&name.to_lowercase())
            .map(|&position| &self.entries[position])
    }

    /// Entries in schema order.
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

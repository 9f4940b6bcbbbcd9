use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::{catalog::{Catalog, TableDecl}, syntax::Name};

/// In-memory catalog keyed by normalized table name.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    tables: IndexMap<Name, Arc<TableDecl>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, table: TableDecl) -> Arc<TableDecl> {
        let key = table.name.normalized();
        debug!(table = %table.name, "register table");
        let table = Arc::new(table);
        self.tables.insert(key, Arc::clone(&table));
        table
    }

    pub fn with(mut self, table: TableDecl) -> Self {
        self.add(table);
        self
    }

    /// Loads table declarations from a JSON array.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tables: Vec<TableDecl> = serde_json::from_str(json)?;
        Ok(tables.into_iter().fold(Self::new(), MemoryCatalog::with))
    }

    pub fn list_tables(&self) -> Vec<Name> {
        self.tables.values().map(|table| table.name.clone()).collect()
    }
}

impl Catalog for MemoryCatalog {
    fn find_table(&self, name: &Name) -> Option<Arc<TableDecl>> {
        self.tables.get(&name.normalized()).map(Arc::clone)
    }
}

use serde::{Deserialize, Serialize};

/// A physical column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDecl {
    pub name: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Synthesized by the storage layer (row ids and the like); not part of
    /// the table's user-visible columns.
    #[serde(default)]
    pub system: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), nullable: true, system: false }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn system(name: impl Into<String>) -> Self {
        Self { name: name.into(), nullable: false, system: true }
    }
}

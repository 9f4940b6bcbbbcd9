use serde::{Deserialize, Serialize};

use crate::{catalog::ColumnDecl, syntax::Name};

/// Primary access path of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDecl {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDecl {
    pub name: Name,
    pub columns: Vec<ColumnDecl>,
    #[serde(default)]
    pub primary_index: Option<IndexDecl>,
}

impl TableDecl {
    /// A table without columns or primary index; fill it in with the
    /// builder methods below.
    pub fn new(name: &str) -> Self {
        Self { name: Name::from(name), columns: vec![], primary_index: None }
    }

    pub fn column(mut self, column: ColumnDecl) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(names.into_iter().map(ColumnDecl::new));
        self
    }

    /// Declares the primary index over the given key columns.
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_index = Some(IndexDecl {
            name: format!("{}_pk", self.name.last()),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// User-visible columns (system columns excluded).
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDecl> {
        self.columns.iter().filter(|column| !column.system)
    }
}

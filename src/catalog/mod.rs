pub mod column_decl;
pub use column_decl::*;

pub mod table_decl;
pub use table_decl::*;

pub mod memory_catalog;
pub use memory_catalog::*;

use std::sync::Arc;

use crate::syntax::Name;

/// Name-resolution service consulted by the analyzer.
pub trait Catalog {
    /// Given a table name as written in the statement, return its declaration
    /// if known.
    fn find_table(&self, name: &Name) -> Option<Arc<TableDecl>>;
}

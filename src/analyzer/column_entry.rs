use crate::{catalog::ColumnDecl, planner::Descriptor};

/// One column of a relation, visible or hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnEntry {
    /// Physical column this value was read from, if any.
    pub declaration: Option<ColumnDecl>,
    pub descriptor: Descriptor,
    /// Normalized lookup name; computed columns may have none.
    pub identifier: Option<String>,
    /// Takes part in `*` expansion and unqualified lookup.
    pub exported: bool,
}

impl ColumnEntry {
    pub fn new(descriptor: Descriptor, identifier: Option<String>) -> Self {
        Self { declaration: None, descriptor, identifier, exported: true }
    }

    pub fn declared(declaration: ColumnDecl, descriptor: Descriptor, identifier: String) -> Self {
        Self { declaration: Some(declaration), descriptor, identifier: Some(identifier), exported: true }
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

use indexmap::IndexMap;
use std::ops::Range;

use crate::{analyzer::ColumnEntry, planner::Descriptor};

/// The columns produced at one point of the operator graph, with the
/// name they can be referenced by.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    /// Correlation or table name, normalized.
    pub identifier: Option<String>,
    /// Primary index name, for base-table scans.
    pub primary_index: Option<String>,
    columns: Vec<ColumnEntry>,
    names: IndexMap<String, Vec<usize>>,
}

impl Relation {
    pub fn new(identifier: Option<String>) -> Self {
        Self { identifier, ..Self::default() }
    }

    pub fn from_columns(identifier: Option<String>, columns: Vec<ColumnEntry>) -> Self {
        let mut relation = Self::new(identifier);
        relation.columns = columns;
        relation.rebuild();
        relation
    }

    pub fn push(&mut self, column: ColumnEntry) -> usize {
        let position = self.columns.len();
        if let Some(name) = column.identifier() {
            self.names.entry(name.to_string()).or_default().push(position);
        }
        self.columns.push(column);
        position
    }

    pub fn columns(&self) -> &[ColumnEntry] {
        &self.columns
    }

    /// Mutable access that cannot change identifiers. Use [`Self::rename`]
    /// for those so the name index stays in step.
    pub fn column_mut(&mut self, position: usize) -> Option<ColumnMut<'_>> {
        self.columns.get_mut(position).map(ColumnMut)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Positions of every column named `name`, hidden ones included.
    pub fn find(&self, name: &str) -> &[usize] {
        self.names.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Positions of the exported columns named `name`.
    pub fn find_exported(&self, name: &str) -> Vec<usize> {
        self.find(name).iter().copied().filter(|&p| self.columns[p].exported).collect()
    }

    pub fn exported(&self) -> impl Iterator<Item = &ColumnEntry> {
        self.columns.iter().filter(|c| c.exported)
    }

    pub fn descriptors(&self) -> Vec<Descriptor> {
        self.columns.iter().map(|c| c.descriptor).collect()
    }

    pub fn rename(&mut self, position: usize, identifier: Option<String>) {
        if let Some(column) = self.columns.get_mut(position) {
            column.identifier = identifier;
            self.rebuild();
        }
    }

    /// Gives the first `names.len()` columns new identifiers, in order.
    pub fn rename_columns(&mut self, names: &[String]) {
        for (column, name) in self.columns.iter_mut().zip(names) {
            column.identifier = Some(name.clone());
        }
        self.rebuild();
    }

    /// Drops the columns in `range`. The name index is stale until
    /// [`Self::rebuild`] runs.
    pub fn erase(&mut self, range: Range<usize>) {
        let end = range.end.min(self.columns.len());
        let start = range.start.min(end);
        self.columns.drain(start..end);
    }

    pub fn rebuild(&mut self) {
        self.names.clear();
        for (position, column) in self.columns.iter().enumerate() {
            if let Some(name) = column.identifier() {
                self.names.entry(name.to_string()).or_default().push(position);
            }
        }
    }
}

/// Mutable view of one column that leaves its identifier alone.
pub struct ColumnMut<'r>(&'r mut ColumnEntry);

impl ColumnMut<'_> {
    pub fn hide(&mut self) {
        self.0.exported = false;
    }

    pub fn set_descriptor(&mut self, descriptor: Descriptor) {
        self.0.descriptor = descriptor;
    }
}

use std::ops::Range;

use crate::analyzer::Relation;

/// Relations visible at one nesting level, in FROM-list order.
///
/// The parent is carried for nested analysis but name resolution never
/// consults it: outer references are not supported.
#[derive(Debug, Default)]
pub struct Scope<'p> {
    relations: Vec<Relation>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    pub fn new(parent: Option<&'p Scope<'p>>) -> Self {
        Self { relations: Vec::new(), parent }
    }

    pub fn add(&mut self, relation: Relation) -> usize {
        self.relations.push(relation);
        self.relations.len() - 1
    }

    pub fn references(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relation_mut(&mut self, position: usize) -> Option<&mut Relation> {
        self.relations.get_mut(position)
    }

    pub fn parent(&self) -> Option<&'p Scope<'p>> {
        self.parent
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Marks the current end of the scope. Relations before the pivot are
    /// the left-hand side of a join, relations added afterwards the right.
    pub fn create_pivot(&self) -> usize {
        self.relations.len()
    }

    /// A scope with copies of the relations in `range` only, under the
    /// same parent.
    pub fn narrow(&self, range: Range<usize>) -> Scope<'p> {
        Scope { relations: self.range(range).map(|(_, r)| r.clone()).collect(), parent: self.parent }
    }

    /// `(position, relation)` pairs inside `range`.
    pub fn range(&self, range: Range<usize>) -> impl Iterator<Item = (usize, &Relation)> {
        let end = range.end.min(self.relations.len());
        let start = range.start.min(end);
        self.relations[start..end].iter().enumerate().map(move |(i, r)| (start + i, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_splits_left_and_right() {
        let mut scope = Scope::new(None);
        scope.add(Relation::new(Some("a".into())));
        let pivot = scope.create_pivot();
        scope.add(Relation::new(Some("b".into())));
        scope.add(Relation::new(Some("c".into())));

        let left: Vec<_> = scope.range(0..pivot).map(|(_, r)| r.identifier.clone()).collect();
        let right: Vec<_> = scope.range(pivot..scope.len()).map(|(i, _)| i).collect();
        assert_eq!(left, vec![Some("a".to_string())]);
        assert_eq!(right, vec![1, 2]);
    }

    #[test]
    fn narrow_keeps_only_the_range() {
        let mut scope = Scope::new(None);
        for name in ["a", "b", "c"] {
            scope.add(Relation::new(Some(name.into())));
        }
        let narrowed = scope.narrow(1..3);
        let names: Vec<_> = narrowed.references().iter().filter_map(|r| r.identifier.clone()).collect();
        assert_eq!(names, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(scope.len(), 3);
    }

    #[test]
    fn child_keeps_parent_link() {
        let mut outer = Scope::new(None);
        outer.add(Relation::new(Some("o".into())));
        let inner = Scope::new(Some(&outer));
        assert!(inner.is_empty());
        assert_eq!(inner.parent().map(Scope::len), Some(1));
    }
}

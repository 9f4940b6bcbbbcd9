use std::ops::Range;

use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnEntry, DiagnosticCode, Relation, Scope},
    syntax::{ColumnName, Region, normalize},
};

pub struct ColumnResolver;

impl ColumnResolver {
    /// Finds the one visible relation called `qualifier`.
    pub fn relation<'s>(
        ctx: &mut AnalysisContext,
        scope: &'s Scope,
        qualifier: &str,
        region: Region,
    ) -> Result<(usize, &'s Relation), AnalyzerError> {
        let name = normalize(qualifier);
        let mut matches = scope
            .references()
            .iter()
            .enumerate()
            .filter(|(_, relation)| relation.identifier.as_deref() == Some(name.as_str()));

        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found),
            (None, _) => Err(ctx.report(
                DiagnosticCode::RelationNotFound,
                format!("relation `{}` not found", qualifier),
                region,
            )),
            (Some(_), Some(_)) => Err(ctx.report(
                DiagnosticCode::RelationAmbiguous,
                format!("relation `{}` is ambiguous", qualifier),
                region,
            )),
        }
    }

    /// Resolves a column reference against the scope.
    ///
    /// A qualified reference sees every column of the named relation,
    /// hidden ones included. An unqualified one only sees exported columns,
    /// across all visible relations.
    pub fn resolve<'s>(
        ctx: &mut AnalysisContext,
        scope: &'s Scope,
        column: &ColumnName,
        region: Region,
    ) -> Result<&'s ColumnEntry, AnalyzerError> {
        let name = normalize(&column.name);
        match &column.qualifier {
            Some(qualifier) => {
                let (_, relation) = Self::relation(ctx, scope, qualifier, region)?;
                match relation.find(&name) {
                    [position] => Ok(&relation.columns()[*position]),
                    [] => Err(ctx.report(
                        DiagnosticCode::ColumnNotFound,
                        format!("column `{}` not found", column),
                        region,
                    )),
                    _ => Err(ctx.report(
                        DiagnosticCode::ColumnAmbiguous,
                        format!("column `{}` is ambiguous", column),
                        region,
                    )),
                }
            }
            None => {
                let (relation, position) = Self::find_in_range(ctx, scope, 0..scope.len(), &name, region)?;
                Ok(&scope.references()[relation].columns()[position])
            }
        }
    }

    /// Finds the single exported column called `name` among the relations
    /// in `range`. Returns `(relation, column)` positions.
    pub fn find_in_range(
        ctx: &mut AnalysisContext,
        scope: &Scope,
        range: Range<usize>,
        name: &str,
        region: Region,
    ) -> Result<(usize, usize), AnalyzerError> {
        let mut matches = scope
            .range(range)
            .flat_map(|(r, relation)| relation.find_exported(name).into_iter().map(move |p| (r, p)));

        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found),
            (None, _) => Err(ctx.report(
                DiagnosticCode::ColumnNotFound,
                format!("column `{}` not found", name),
                region,
            )),
            (Some(_), Some(_)) => Err(ctx.report(
                DiagnosticCode::ColumnAmbiguous,
                format!("column `{}` is ambiguous", name),
                region,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::MemoryCatalog, planner::DescriptorFactory};

    fn relation(ids: &mut DescriptorFactory, name: &str, columns: &[&str]) -> Relation {
        Relation::from_columns(
            Some(name.to_string()),
            columns.iter().map(|c| ColumnEntry::new(ids.fresh(), Some(c.to_string()))).collect(),
        )
    }

    #[test]
    fn unqualified_name_in_two_relations_is_ambiguous() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let mut scope = Scope::new(None);
        scope.add(relation(&mut ids, "a", &["x", "y"]));
        scope.add(relation(&mut ids, "b", &["x"]));

        let err = ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::new("x"), Region::default()).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ColumnAmbiguous);

        let ax = ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::qualified("a", "x"), Region::default()).unwrap();
        let bx = ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::qualified("B", "X"), Region::default()).unwrap();
        assert_eq!(ax.descriptor, scope.references()[0].columns()[0].descriptor);
        assert_eq!(bx.descriptor, scope.references()[1].columns()[0].descriptor);
    }

    #[test]
    fn missing_names_are_reported() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let mut scope = Scope::new(None);
        scope.add(relation(&mut ids, "a", &["x"]));

        let err = ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::new("z"), Region::default()).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ColumnNotFound);
        let err = ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::qualified("q", "x"), Region::default()).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::RelationNotFound);
        assert_eq!(ctx.errors().count(), 2);
    }

    #[test]
    fn same_relation_name_twice_is_ambiguous_when_qualified() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let mut scope = Scope::new(None);
        scope.add(relation(&mut ids, "t", &["x"]));
        scope.add(relation(&mut ids, "t", &["y"]));

        let err = ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::qualified("t", "x"), Region::default()).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::RelationAmbiguous);
        assert!(ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::new("y"), Region::default()).is_ok());
    }

    #[test]
    fn qualified_lookup_sees_hidden_columns() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let mut scope = Scope::new(None);
        scope.add(relation(&mut ids, "a", &["k"]));
        scope.add(relation(&mut ids, "b", &["k"]));
        if let Some(mut k) = scope.relation_mut(1).and_then(|r| r.column_mut(0)) {
            k.hide();
        }

        let k = ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::new("k"), Region::default()).unwrap();
        assert_eq!(k.descriptor, scope.references()[0].columns()[0].descriptor);
        assert!(ColumnResolver::resolve(&mut ctx, &scope, &ColumnName::qualified("b", "k"), Region::default()).is_ok());
    }
}

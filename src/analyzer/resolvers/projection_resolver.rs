use tracing::debug;

use crate::{
    analyzer::{AggregateProcessor, AnalysisContext, AnalyzerError, ColumnEntry, ColumnResolver, Relation, ScalarResolver, Scope, WildcardResolver},
    planner::{Expr, Operator, OperatorId, ProjectColumn},
    syntax::{Region, SelectElement, normalize},
};

/// The SELECT-list projection: the node, the relation it exposes and the
/// source region of each projected column.
#[derive(Debug, Clone)]
pub struct Projection {
    pub port: OperatorId,
    pub relation: Relation,
    pub regions: Vec<Region>,
}

pub struct ProjectionResolver;

impl ProjectionResolver {
    pub fn resolve(
        ctx: &mut AnalysisContext,
        scope: &Scope,
        elements: &[SelectElement],
        port: OperatorId,
        aggregates: &mut AggregateProcessor,
        region: Region,
    ) -> Result<Projection, AnalyzerError> {
        ctx.check_limit("SELECT elements", elements.len(), ctx.config.max_select_elements, region)?;

        let mut columns = Vec::with_capacity(elements.len());
        let mut relation = Relation::new(None);
        let mut regions = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                SelectElement::Expr { expr, alias } => {
                    let (bound, declaration, name) = match expr.as_column() {
                        Some(column) => {
                            let entry = ColumnResolver::resolve(ctx, scope, column, expr.region)?;
                            (Expr::Variable(entry.descriptor), entry.declaration.clone(), Some(normalize(&column.name)))
                        }
                        None => (ScalarResolver::resolve(ctx, scope, expr)?, None, None),
                    };
                    if bound.contains_aggregate() {
                        aggregates.activate();
                    }
                    let descriptor = ctx.fresh_descriptor();
                    columns.push(ProjectColumn { descriptor, expr: bound });
                    relation.push(ColumnEntry {
                        declaration,
                        descriptor,
                        identifier: alias.as_deref().map(normalize).or(name),
                        exported: true,
                    });
                    regions.push(expr.region);
                }
                SelectElement::Asterisk { qualifier, region } => {
                    for entry in WildcardResolver::expand(ctx, scope, qualifier.as_deref(), *region)? {
                        let descriptor = ctx.fresh_descriptor();
                        columns.push(ProjectColumn { descriptor, expr: Expr::Variable(entry.descriptor) });
                        relation.push(ColumnEntry { descriptor, ..entry.clone() });
                        regions.push(*region);
                    }
                }
            }
        }

        let port = ctx.graph.push(Operator::Project { columns }, [port]);
        debug!(columns = relation.len(), "SELECT list analyzed");
        Ok(Projection { port, relation, regions })
    }
}

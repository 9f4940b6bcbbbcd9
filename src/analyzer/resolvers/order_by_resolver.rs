use tracing::debug;

use crate::{
    analyzer::{AggregateProcessor, AnalysisContext, AnalyzerError, DiagnosticCode, Relation, ScalarResolver, Scope},
    planner::{Descriptor, Operator, OperatorId, ProjectColumn, SortSpec},
    syntax::{Region, SortKey, normalize},
};

/// Result of lowering ORDER BY.
#[derive(Debug, Clone)]
pub struct OrderByOutput {
    /// Sort-limit node; LIMIT fuses its count into it.
    pub port: OperatorId,
    /// Projection that materializes keys not already in the SELECT list.
    pub projection: Option<OperatorId>,
    pub regions: Vec<Region>,
}

pub struct OrderByResolver;

impl OrderByResolver {
    /// Lowers the sort keys into one limit-with-keys node.
    ///
    /// A bare unqualified name that matches a SELECT output sorts by that
    /// output. Any other key is resolved against the FROM scope and
    /// materialized as a fresh variable.
    pub fn resolve(
        ctx: &mut AnalysisContext,
        scope: &Scope,
        output: &Relation,
        keys: &[SortKey],
        port: OperatorId,
        aggregates: &mut AggregateProcessor,
    ) -> Result<OrderByOutput, AnalyzerError> {
        let span = keys.iter().map(|k| k.region).reduce(Region::merge).unwrap_or_default();
        ctx.check_limit("ORDER BY keys", keys.len(), ctx.config.max_sort_keys, span)?;

        let mut specs = Vec::with_capacity(keys.len());
        let mut columns = Vec::new();
        let mut regions = Vec::new();
        for key in keys {
            if let Some(collation) = &key.collation {
                return Err(ctx.report(
                    DiagnosticCode::UnsupportedFeature,
                    format!("COLLATE {} is not supported", collation),
                    key.region,
                ));
            }
            if key.nulls.is_some() {
                ctx.warn(DiagnosticCode::UnsupportedFeature, "explicit NULL ordering is ignored", key.region);
            }
            if key.expr.is_literal() {
                return Err(ctx.report(
                    DiagnosticCode::InvalidSortKey,
                    format!("cannot sort by literal {}", key.expr),
                    key.expr.region,
                ));
            }

            if let Some(descriptor) = Self::output_reference(ctx, output, key)? {
                specs.push(SortSpec { descriptor, direction: key.direction });
                continue;
            }
            let expr = ScalarResolver::resolve(ctx, scope, &key.expr)?;
            if expr.contains_aggregate() {
                aggregates.activate();
            }
            let descriptor = ctx.fresh_descriptor();
            columns.push(ProjectColumn { descriptor, expr });
            regions.push(key.expr.region);
            specs.push(SortSpec { descriptor, direction: key.direction });
        }

        let (port, projection) = if columns.is_empty() {
            (port, None)
        } else {
            let projection = ctx.graph.push(Operator::Project { columns }, [port]);
            (projection, Some(projection))
        };
        let port = ctx.graph.push(Operator::Limit { count: None, keys: specs }, [port]);
        debug!(keys = keys.len(), "ORDER BY analyzed");
        Ok(OrderByOutput { port, projection, regions })
    }

    fn output_reference(
        ctx: &mut AnalysisContext,
        output: &Relation,
        key: &SortKey,
    ) -> Result<Option<Descriptor>, AnalyzerError> {
        let Some(column) = key.expr.as_column().filter(|c| c.qualifier.is_none()) else {
            return Ok(None);
        };
        match output.find_exported(&normalize(&column.name)).as_slice() {
            [] => Ok(None),
            [position] => Ok(Some(output.columns()[*position].descriptor)),
            _ => Err(ctx.report(
                DiagnosticCode::ColumnAmbiguous,
                format!("ORDER BY `{}` matches more than one output column", column),
                key.expr.region,
            )),
        }
    }
}

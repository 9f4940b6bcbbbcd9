use tracing::debug;

use crate::{
    analyzer::{AggregateProcessor, AnalysisContext, AnalyzerError, ColumnResolver, DiagnosticCode, ScalarResolver, Scope},
    syntax::{Region, ScalarExpr, ScalarExprKind},
};

pub struct GroupByResolver;

impl GroupByResolver {
    /// Registers the GROUP BY keys. Each key must be a plain column
    /// reference; repeated keys collapse into one.
    pub fn resolve(
        ctx: &mut AnalysisContext,
        scope: &Scope,
        keys: &[ScalarExpr],
        aggregates: &mut AggregateProcessor,
    ) -> Result<(), AnalyzerError> {
        if keys.is_empty() {
            return Ok(());
        }
        let span = keys.iter().map(|k| k.region).reduce(Region::merge).unwrap_or_default();
        ctx.check_limit("GROUP BY keys", keys.len(), ctx.config.max_group_keys, span)?;

        for key in keys {
            match &key.kind {
                ScalarExprKind::Column(column) => {
                    let descriptor = ColumnResolver::resolve(ctx, scope, column, key.region)?.descriptor;
                    aggregates.add_group_key(descriptor);
                }
                ScalarExprKind::Function(call) if ScalarResolver::set_function(call).is_some() => {
                    return Err(ctx.report(
                        DiagnosticCode::UnsupportedFeature,
                        "aggregate functions are not allowed in GROUP BY",
                        key.region,
                    ));
                }
                _ => {
                    return Err(ctx.report(
                        DiagnosticCode::InvalidAggregationColumn,
                        format!("GROUP BY element `{}` must be a column reference", key),
                        key.region,
                    ));
                }
            }
        }
        debug!(keys = aggregates.keys().len(), "GROUP BY analyzed");
        Ok(())
    }
}

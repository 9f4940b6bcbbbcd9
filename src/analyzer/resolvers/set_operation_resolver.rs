use tracing::debug;

use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnEntry, DiagnosticCode, QueryAnalyzer, QueryOutput, Relation, Scope},
    planner::{Operator, UnionColumn},
    syntax::{QueryExpr, Region, SetOperator, SetQuantifier},
};

pub struct SetOperationResolver;

impl SetOperationResolver {
    /// Lowers `left UNION [ALL | DISTINCT] right`. Both operands must export
    /// the same number of columns; output names come from the left.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        ctx: &mut AnalysisContext,
        operator: SetOperator,
        quantifier: Option<SetQuantifier>,
        corresponding: Option<&[String]>,
        left: &QueryExpr,
        right: &QueryExpr,
        region: Region,
        parent: Option<&Scope>,
    ) -> Result<QueryOutput, AnalyzerError> {
        let name = match operator {
            SetOperator::Union => "UNION",
            SetOperator::Except => "EXCEPT",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::OuterUnion => "OUTER UNION",
        };
        if operator != SetOperator::Union {
            return Err(ctx.report(DiagnosticCode::UnsupportedFeature, format!("{} is not supported", name), region));
        }
        if corresponding.is_some() {
            return Err(ctx.report(DiagnosticCode::UnsupportedFeature, "CORRESPONDING is not supported", region));
        }

        let left = QueryAnalyzer::query_expr(ctx, left, parent)?;
        let right = QueryAnalyzer::query_expr(ctx, right, parent)?;
        let left_columns: Vec<&ColumnEntry> = left.relation.exported().collect();
        let right_columns: Vec<&ColumnEntry> = right.relation.exported().collect();
        if left_columns.len() != right_columns.len() {
            return Err(ctx.report(
                DiagnosticCode::InconsistentColumns,
                format!(
                    "{} operands have {} and {} columns",
                    name,
                    left_columns.len(),
                    right_columns.len()
                ),
                region,
            ));
        }

        let mut columns = Vec::with_capacity(left_columns.len());
        let mut relation = Relation::new(None);
        for (l, r) in left_columns.into_iter().zip(right_columns) {
            let output = ctx.fresh_descriptor();
            columns.push(UnionColumn { output, left: l.descriptor, right: r.descriptor });
            relation.push(ColumnEntry { declaration: None, descriptor: output, identifier: l.identifier.clone(), exported: true });
        }

        let quantifier = quantifier.unwrap_or(SetQuantifier::Distinct);
        let port = ctx.graph.push(Operator::Union { quantifier, columns }, [left.port, right.port]);
        debug!(%quantifier, columns = relation.len(), "set operation analyzed");
        Ok(QueryOutput { port, relation })
    }
}

use tracing::debug;

use crate::{
    analyzer::{
        AnalysisContext, AnalyzedQuery, AnalyzerError, QueryOutput, Scope, SelectResolver, SetOperationResolver,
        TableResolver, ValuesResolver,
    },
    planner::OperatorGraph,
    syntax::{QueryExpr, QueryExprKind},
};

/// Entry point of the analyzer: lowers a query expression into an
/// operator graph plus the relation it produces.
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    /// Analyzes one statement into a fresh graph. On failure the graph is
    /// discarded and the error is already among the context's diagnostics.
    pub fn analyze(ctx: &mut AnalysisContext, query: &QueryExpr) -> Result<AnalyzedQuery, AnalyzerError> {
        debug!(region = %query.region, "analyzing query expression");
        ctx.reset_depth();
        ctx.graph = OperatorGraph::new();

        match Self::query_expr(ctx, query, None) {
            Ok(output) => {
                let graph = std::mem::take(&mut ctx.graph);
                debug!(operators = graph.len(), columns = output.relation.len(), "analysis finished");
                Ok(AnalyzedQuery { graph, output: output.port, relation: output.relation })
            }
            Err(err) => {
                ctx.graph = OperatorGraph::new();
                debug!(code = %err.code, "analysis failed");
                Err(err)
            }
        }
    }

    /// Lowers a query expression into the context's graph. `parent` is the
    /// enclosing scope for nested analysis.
    pub fn query_expr(
        ctx: &mut AnalysisContext,
        query: &QueryExpr,
        parent: Option<&Scope>,
    ) -> Result<QueryOutput, AnalyzerError> {
        ctx.enter(query.region)?;
        let output = match &query.kind {
            QueryExprKind::Select(simple) => SelectResolver::resolve(ctx, simple, query.region, parent),
            QueryExprKind::Table(name) => TableResolver::scan(ctx, name, query.region),
            QueryExprKind::Values(rows) => ValuesResolver::resolve(ctx, rows, query.region, parent),
            QueryExprKind::Binary { operator, quantifier, corresponding, left, right } => SetOperationResolver::resolve(
                ctx,
                *operator,
                *quantifier,
                corresponding.as_deref(),
                left,
                right,
                query.region,
                parent,
            ),
        };
        ctx.leave();
        output
    }
}

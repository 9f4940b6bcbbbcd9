use tracing::debug;

use crate::{
    analyzer::{AnalysisContext, AnalyzerError, DiagnosticCode},
    planner::{Operator, OperatorId},
    syntax::{ScalarExpr, ScalarExprKind},
};

pub struct LimitResolver;

impl LimitResolver {
    /// The row count must be a non-negative integer literal. With a sort
    /// node from ORDER BY the count is fused into it (top-k); otherwise a
    /// plain limit node is added.
    pub fn resolve(
        ctx: &mut AnalysisContext,
        count: &ScalarExpr,
        port: OperatorId,
        sort: Option<OperatorId>,
    ) -> Result<OperatorId, AnalyzerError> {
        let value = match &count.kind {
            ScalarExprKind::Literal(literal) => literal.as_unsigned(),
            _ => None,
        };
        let Some(value) = value else {
            return Err(ctx.report(
                DiagnosticCode::InvalidUnsignedInteger,
                format!("LIMIT expects a non-negative integer literal, found {}", count),
                count.region,
            ));
        };

        if let Some(sort) = sort {
            if let Some(Operator::Limit { count, .. }) = ctx.graph.operator_mut(sort) {
                *count = Some(value);
                debug!(limit = value, "LIMIT fused into sort");
                return Ok(sort);
            }
        }
        debug!(limit = value, "LIMIT analyzed");
        Ok(ctx.graph.push(Operator::Limit { count: Some(value), keys: vec![] }, [port]))
    }
}

use std::ops::Range;

use tracing::debug;

use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnResolver, DiagnosticCode, QueryAnalyzer, Relation, ScalarResolver, Scope, TableResolver},
    planner::{Expr, JoinColumn, JoinOperatorKind, JoinSide, Operator, OperatorId},
    syntax::{ComparatorOp, Correlation, JoinKind, JoinSpec, Region, TableExpr, TableExprKind, normalize},
};

/// Lowers FROM-clause table expressions and registers the relations they
/// produce in the scope.
pub struct JoinResolver;

impl JoinResolver {
    /// Cross-joins the FROM items left to right. Without a FROM clause the
    /// query reads a single row with no columns.
    pub fn from_clause(
        ctx: &mut AnalysisContext,
        scope: &mut Scope,
        from: &[TableExpr],
    ) -> Result<OperatorId, AnalyzerError> {
        let mut port = None;
        for table in from {
            let next = Self::table_expr(ctx, scope, table)?;
            port = Some(match port {
                None => next,
                Some(previous) => ctx.graph.push(
                    Operator::Join { kind: JoinOperatorKind::Inner, condition: None, columns: vec![] },
                    [previous, next],
                ),
            });
        }
        Ok(match port {
            Some(port) => port,
            None => ctx.graph.add(Operator::Values { columns: vec![], rows: vec![vec![]] }),
        })
    }

    pub fn table_expr(ctx: &mut AnalysisContext, scope: &mut Scope, table: &TableExpr) -> Result<OperatorId, AnalyzerError> {
        ctx.enter(table.region)?;
        let port = Self::dispatch(ctx, scope, table);
        ctx.leave();
        port
    }

    fn dispatch(ctx: &mut AnalysisContext, scope: &mut Scope, table: &TableExpr) -> Result<OperatorId, AnalyzerError> {
        match &table.kind {
            TableExprKind::Table { name, correlation } => {
                let output = TableResolver::scan(ctx, name, table.region)?;
                let relation = Self::correlate(ctx, output.relation, correlation.as_ref())?;
                scope.add(relation);
                Ok(output.port)
            }
            TableExprKind::Subquery { lateral: true, .. } => Err(ctx.report(
                DiagnosticCode::UnsupportedFeature,
                "LATERAL derived tables are not supported",
                table.region,
            )),
            TableExprKind::Subquery { query, correlation, .. } => {
                // The derived table cannot see the relations of this scope.
                let output = QueryAnalyzer::query_expr(ctx, query, Some(&*scope))?;
                let relation = Self::correlate(ctx, output.relation, correlation.as_ref())?;
                scope.add(relation);
                Ok(output.port)
            }
            TableExprKind::Unnest { .. } => Err(ctx.report(
                DiagnosticCode::UnsupportedFeature,
                "UNNEST is not supported",
                table.region,
            )),
            TableExprKind::Join { kind, left, right, spec } => Self::join(ctx, scope, *kind, left, right, spec, table.region),
        }
    }

    /// Applies `AS name (c1, c2, ...)`. Fewer column names than columns
    /// truncates the relation; more is an error.
    pub fn correlate(
        ctx: &mut AnalysisContext,
        mut relation: Relation,
        correlation: Option<&Correlation>,
    ) -> Result<Relation, AnalyzerError> {
        let Some(correlation) = correlation else {
            return Ok(relation);
        };
        relation.identifier = Some(normalize(&correlation.name));
        if correlation.columns.is_empty() {
            return Ok(relation);
        }
        if correlation.columns.len() > relation.len() {
            return Err(ctx.report(
                DiagnosticCode::InconsistentColumns,
                format!(
                    "correlation `{}` names {} columns but the relation has {}",
                    correlation.name,
                    correlation.columns.len(),
                    relation.len()
                ),
                correlation.region,
            ));
        }
        let names: Vec<String> = correlation.columns.iter().map(|c| normalize(c)).collect();
        relation.erase(names.len()..relation.len());
        relation.rename_columns(&names);
        Ok(relation)
    }

    fn join(
        ctx: &mut AnalysisContext,
        scope: &mut Scope,
        kind: JoinKind,
        left: &TableExpr,
        right: &TableExpr,
        spec: &JoinSpec,
        region: Region,
    ) -> Result<OperatorId, AnalyzerError> {
        let (operator_kind, transpose) = match kind {
            JoinKind::Cross | JoinKind::Inner => (JoinOperatorKind::Inner, false),
            JoinKind::Left => (JoinOperatorKind::LeftOuter, false),
            JoinKind::Right => (JoinOperatorKind::LeftOuter, true),
            JoinKind::Full => (JoinOperatorKind::FullOuter, false),
            JoinKind::Union => (JoinOperatorKind::Union, false),
        };
        if operator_kind == JoinOperatorKind::Union && *spec != JoinSpec::None {
            return Err(ctx.report(
                DiagnosticCode::UnsupportedFeature,
                "UNION JOIN takes no join condition",
                region,
            ));
        }

        let start = scope.create_pivot();
        let left_port = Self::table_expr(ctx, scope, left)?;
        let pivot = scope.create_pivot();
        let right_port = Self::table_expr(ctx, scope, right)?;
        let end = scope.create_pivot();

        let condition = match spec {
            JoinSpec::None => None,
            JoinSpec::On(predicate) => {
                // ON sees the join's own operands, not earlier FROM items.
                let operands = scope.narrow(start..end);
                let bound = ScalarResolver::resolve(ctx, &operands, predicate)?;
                ScalarResolver::reject_aggregates(ctx, &bound, "JOIN conditions", predicate.region)?;
                Some(bound)
            }
            JoinSpec::Using(names) => Self::using(ctx, scope, start..pivot, pivot..end, names, region)?,
            JoinSpec::Natural => {
                let names = Self::common_names(scope, start..pivot, pivot..end);
                Self::using(ctx, scope, start..pivot, pivot..end, &names, region)?
            }
        };
        let columns = match operator_kind {
            JoinOperatorKind::Union => Self::union_columns(ctx, scope, start, pivot, end),
            _ => vec![],
        };

        let inputs = if transpose { [right_port, left_port] } else { [left_port, right_port] };
        let port = ctx.graph.push(Operator::Join { kind: operator_kind, condition, columns }, inputs);
        debug!(?kind, %port, "join analyzed");
        Ok(port)
    }

    /// Equates each named column across the two sides and hides the
    /// right-hand copy.
    fn using(
        ctx: &mut AnalysisContext,
        scope: &mut Scope,
        left: Range<usize>,
        right: Range<usize>,
        names: &[String],
        region: Region,
    ) -> Result<Option<Expr>, AnalyzerError> {
        let mut terms = Vec::with_capacity(names.len());
        for name in names {
            let name = normalize(name);
            let (lr, lp) = ColumnResolver::find_in_range(ctx, scope, left.clone(), &name, region)?;
            let (rr, rp) = ColumnResolver::find_in_range(ctx, scope, right.clone(), &name, region)?;
            let l = scope.references()[lr].columns()[lp].descriptor;
            let r = scope.references()[rr].columns()[rp].descriptor;
            terms.push(Expr::compare(ComparatorOp::Eq, Expr::Variable(l), Expr::Variable(r)));
            if let Some(mut column) = scope.relation_mut(rr).and_then(|relation| relation.column_mut(rp)) {
                column.hide();
            }
        }
        Ok(Expr::conjunction(terms))
    }

    /// Exported names present on both sides, in left-hand order.
    fn common_names(scope: &Scope, left: Range<usize>, right: Range<usize>) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (_, relation) in scope.range(left) {
            for name in relation.exported().filter_map(|c| c.identifier()) {
                let shared = scope.range(right.clone()).any(|(_, r)| !r.find_exported(name).is_empty());
                if shared && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Gives every column of both sides its own output column. The right
    /// side spans from `start` unless strict sides are configured, so
    /// left-hand relations are mapped a second time; the later mapping
    /// then owns the relation's descriptor.
    fn union_columns(
        ctx: &mut AnalysisContext,
        scope: &mut Scope,
        start: usize,
        pivot: usize,
        end: usize,
    ) -> Vec<JoinColumn> {
        let right_start = if ctx.config.union_join_strict_sides { pivot } else { start };
        let sides = [(JoinSide::Left, start..pivot), (JoinSide::Right, right_start..end)];

        let mut sources = Vec::new();
        for (side, range) in sides {
            for (r, relation) in scope.range(range) {
                for (p, column) in relation.columns().iter().enumerate() {
                    sources.push((side, r, p, column.descriptor));
                }
            }
        }

        let mut columns = Vec::with_capacity(sources.len());
        for (side, r, p, source) in sources {
            let output = ctx.fresh_descriptor();
            columns.push(JoinColumn { output, source, side });
            if let Some(mut column) = scope.relation_mut(r).and_then(|relation| relation.column_mut(p)) {
                column.set_descriptor(output);
            }
        }
        columns
    }
}

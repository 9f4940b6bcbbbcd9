use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnResolver, DiagnosticCode, Scope},
    planner::{AggregateCall, Expr, SetFunction},
    syntax::{FunctionArgs, FunctionCall, Region, ScalarExpr, ScalarExprKind, SetQuantifier},
};

pub struct ScalarResolver;

impl ScalarResolver {
    /// Lowers a scalar expression, replacing column references with the
    /// descriptors they resolve to. Aggregate calls are kept as
    /// [`Expr::Aggregate`] for the aggregate processor to extract.
    pub fn resolve(ctx: &mut AnalysisContext, scope: &Scope, expr: &ScalarExpr) -> Result<Expr, AnalyzerError> {
        ctx.enter_expression(expr.region)?;
        let bound = Self::bind(ctx, scope, expr);
        ctx.leave_expression();
        bound
    }

    fn bind(ctx: &mut AnalysisContext, scope: &Scope, expr: &ScalarExpr) -> Result<Expr, AnalyzerError> {
        let bound = match &expr.kind {
            ScalarExprKind::Literal(value) => Expr::Literal(value.clone()),
            ScalarExprKind::Column(column) => {
                Expr::Variable(ColumnResolver::resolve(ctx, scope, column, expr.region)?.descriptor)
            }
            ScalarExprKind::Cast { operand, ty } => Expr::Cast {
                operand: Box::new(Self::resolve(ctx, scope, operand)?),
                ty: ty.clone(),
            },
            ScalarExprKind::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: Box::new(Self::resolve(ctx, scope, operand)?),
            },
            ScalarExprKind::Binary { op, left, right } => {
                let left = Self::resolve(ctx, scope, left)?;
                let right = Self::resolve(ctx, scope, right)?;
                Expr::Binary { op: *op, left: Box::new(left), right: Box::new(right) }
            }
            ScalarExprKind::Compare { op, left, right } => {
                let left = Self::resolve(ctx, scope, left)?;
                let right = Self::resolve(ctx, scope, right)?;
                Expr::compare(*op, left, right)
            }
            ScalarExprKind::Like { operand, pattern, negated } => {
                let operand = Self::resolve(ctx, scope, operand)?;
                let pattern = Self::resolve(ctx, scope, pattern)?;
                Expr::Like { operand: Box::new(operand), pattern: Box::new(pattern), negated: *negated }
            }
            ScalarExprKind::Case { operand, whens, otherwise } => {
                let operand = match operand {
                    Some(operand) => Some(Box::new(Self::resolve(ctx, scope, operand)?)),
                    None => None,
                };
                let mut arms = Vec::with_capacity(whens.len());
                for (when, then) in whens {
                    let when = Self::resolve(ctx, scope, when)?;
                    let then = Self::resolve(ctx, scope, then)?;
                    arms.push((when, then));
                }
                let otherwise = match otherwise {
                    Some(otherwise) => Some(Box::new(Self::resolve(ctx, scope, otherwise)?)),
                    None => None,
                };
                Expr::Case { operand, whens: arms, otherwise }
            }
            ScalarExprKind::Coalesce(operands) => Expr::Coalesce(Self::resolve_all(ctx, scope, operands)?),
            ScalarExprKind::Function(call) => Self::function(ctx, scope, call, expr.region)?,
        };
        Ok(bound)
    }

    fn resolve_all(ctx: &mut AnalysisContext, scope: &Scope, exprs: &[ScalarExpr]) -> Result<Vec<Expr>, AnalyzerError> {
        exprs.iter().map(|expr| Self::resolve(ctx, scope, expr)).collect()
    }

    fn function(
        ctx: &mut AnalysisContext,
        scope: &Scope,
        call: &FunctionCall,
        region: Region,
    ) -> Result<Expr, AnalyzerError> {
        let quantifier = call.quantifier.unwrap_or(SetQuantifier::All);
        match (Self::set_function(call), &call.args) {
            (Some(SetFunction::Count), FunctionArgs::Asterisk) => Ok(Expr::Aggregate(AggregateCall {
                function: SetFunction::CountAsterisk,
                quantifier,
                args: vec![],
            })),
            (_, FunctionArgs::Asterisk) => Err(ctx.report(
                DiagnosticCode::UnsupportedFeature,
                format!("`{}(*)` is not supported", call.name),
                region,
            )),
            (Some(function), FunctionArgs::List(args)) => Ok(Expr::Aggregate(AggregateCall {
                function,
                quantifier,
                args: Self::resolve_all(ctx, scope, args)?,
            })),
            (None, FunctionArgs::List(_)) if call.quantifier.is_some() => Err(ctx.report(
                DiagnosticCode::UnsupportedFeature,
                format!("set quantifier on non-aggregate function `{}`", call.name),
                region,
            )),
            (None, FunctionArgs::List(args)) => Ok(Expr::Call {
                function: call.name.normalized(),
                args: Self::resolve_all(ctx, scope, args)?,
            }),
        }
    }

    /// The set function a call names, if any. Only unqualified names count.
    pub fn set_function(call: &FunctionCall) -> Option<SetFunction> {
        match call.name.segments.as_slice() {
            [name] => SetFunction::from_name(name),
            _ => None,
        }
    }

    /// Fails with `unsupported_feature` when `expr` contains an aggregate
    /// call. `clause` names where the expression appeared.
    pub fn reject_aggregates(
        ctx: &mut AnalysisContext,
        expr: &Expr,
        clause: &str,
        region: Region,
    ) -> Result<(), AnalyzerError> {
        if expr.contains_aggregate() {
            return Err(ctx.report(
                DiagnosticCode::UnsupportedFeature,
                format!("aggregate functions are not allowed in {}", clause),
                region,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analyzer::{ColumnEntry, Relation},
        catalog::MemoryCatalog,
        planner::DescriptorFactory,
        syntax::{BinaryOp, ComparatorOp, Name},
    };

    fn scope_with(ids: &mut DescriptorFactory, columns: &[&str]) -> Scope<'static> {
        let mut scope = Scope::new(None);
        scope.add(Relation::from_columns(
            Some("t".into()),
            columns.iter().map(|c| ColumnEntry::new(ids.fresh(), Some(c.to_string()))).collect(),
        ));
        scope
    }

    #[test]
    fn columns_become_variables() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let scope = scope_with(&mut ids, &["a", "b"]);
        let a = scope.references()[0].columns()[0].descriptor;

        let expr = ScalarExpr::binary(BinaryOp::Add, ScalarExpr::column("A"), ScalarExpr::int(1));
        let bound = ScalarResolver::resolve(&mut ctx, &scope, &expr).unwrap();
        assert_eq!(bound.free_variables(), vec![a]);
    }

    #[test]
    fn aggregate_names_become_set_functions() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let scope = scope_with(&mut ids, &["a"]);

        let bound = ScalarResolver::resolve(&mut ctx, &scope, &ScalarExpr::call_distinct("Sum", vec![ScalarExpr::column("a")])).unwrap();
        match bound {
            Expr::Aggregate(call) => {
                assert_eq!(call.function, SetFunction::Sum);
                assert_eq!(call.quantifier, SetQuantifier::Distinct);
                assert_eq!(call.args.len(), 1);
            }
            other => panic!("expected aggregate, got {other:?}"),
        }

        let count = ScalarResolver::resolve(&mut ctx, &scope, &ScalarExpr::count_all()).unwrap();
        assert!(matches!(count, Expr::Aggregate(AggregateCall { function: SetFunction::CountAsterisk, .. })));

        let upper = ScalarResolver::resolve(&mut ctx, &scope, &ScalarExpr::call("UPPER", vec![ScalarExpr::column("a")])).unwrap();
        assert!(matches!(upper, Expr::Call { ref function, .. } if *function == Name::simple("upper")));
    }

    #[test]
    fn asterisk_outside_count_is_unsupported() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let scope = Scope::new(None);
        let expr = ScalarExpr::new(ScalarExprKind::Function(FunctionCall {
            name: Name::simple("sum"),
            quantifier: None,
            args: FunctionArgs::Asterisk,
        }));

        let err = ScalarResolver::resolve(&mut ctx, &scope, &expr).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::UnsupportedFeature);
    }

    #[test]
    fn deep_expressions_hit_the_nesting_limit() {
        let catalog = MemoryCatalog::new();
        let config = crate::analyzer::AnalyzerConfig { max_expression_depth: 3, ..Default::default() };
        let mut ctx = AnalysisContext::with_config(&catalog, config);
        let scope = Scope::new(None);

        let mut expr = ScalarExpr::int(0);
        for _ in 0..5 {
            expr = ScalarExpr::binary(BinaryOp::Add, expr, ScalarExpr::int(1));
        }
        let err = ScalarResolver::resolve(&mut ctx, &scope, &expr).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ExceedNumberOfElements);
    }

    #[test]
    fn long_or_chain_is_not_deep_nesting() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let scope = scope_with(&mut ids, &["a"]);
        assert!(ctx.config.max_nesting_depth < 300);

        let term = || ScalarExpr::compare(ComparatorOp::Eq, ScalarExpr::column("a"), ScalarExpr::int(1));
        let mut expr = term();
        for _ in 1..300 {
            expr = ScalarExpr::binary(BinaryOp::Or, expr, term());
        }
        let bound = ScalarResolver::resolve(&mut ctx, &scope, &expr).unwrap();
        assert_eq!(bound.free_variables().len(), 1);
    }
}

use tracing::{debug, trace};

use crate::{
    analyzer::{AnalysisContext, AnalyzerError, DiagnosticCode},
    planner::{AggregateCall, AggregateEntry, Descriptor, Expr, Operator, OperatorId, ProjectColumn},
    syntax::Region,
};

/// Outcome of visiting one expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    Unchanged,
    /// The parent must put this expression where the visited node was.
    Replace(Expr),
}

/// Extracts aggregate calls out of one query block.
///
/// Aggregate calls are replaced by variables that an aggregate operator
/// computes. Non-trivial arguments are first hoisted into an argument
/// projection so the aggregate operator only ever reads plain variables.
/// Both staging operators are created on first use and spliced into the
/// graph by [`AggregateProcessor::install`], which also resets the
/// processor.
#[derive(Debug, Default)]
pub struct AggregateProcessor {
    active: bool,
    keys: Vec<Descriptor>,
    aggregated: Vec<Descriptor>,
    arguments: Option<OperatorId>,
    aggregate: Option<OperatorId>,
}

impl AggregateProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self) {
        if !self.active {
            trace!("aggregate mode on");
            self.active = true;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn add_group_key(&mut self, key: Descriptor) {
        self.activate();
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn keys(&self) -> &[Descriptor] {
        &self.keys
    }

    pub fn is_grouping(&self, descriptor: Descriptor) -> bool {
        self.keys.contains(&descriptor)
    }

    pub fn is_aggregated(&self, descriptor: Descriptor) -> bool {
        self.aggregated.contains(&descriptor)
    }

    /// Extracts every aggregate call in `expr` and checks that the
    /// remaining variables are grouping keys or aggregate results.
    ///
    /// Bound expressions carry no source regions, so every diagnostic
    /// raised here points at `region`, the whole clause element `expr` was
    /// bound from, not at the offending sub-expression.
    pub fn process(&mut self, ctx: &mut AnalysisContext, expr: &mut Expr, region: Region) -> Result<(), AnalyzerError> {
        self.activate();
        self.splice(ctx, expr, 0, &mut Vec::new(), region)
    }

    fn splice(
        &mut self,
        ctx: &mut AnalysisContext,
        slot: &mut Expr,
        depth: usize,
        locals: &mut Vec<Descriptor>,
        region: Region,
    ) -> Result<(), AnalyzerError> {
        if let Rewrite::Replace(replacement) = self.walk(ctx, slot, depth, locals, region)? {
            *slot = replacement;
        }
        Ok(())
    }

    /// `depth` counts the aggregate calls enclosing `expr`.
    fn walk(
        &mut self,
        ctx: &mut AnalysisContext,
        expr: &mut Expr,
        depth: usize,
        locals: &mut Vec<Descriptor>,
        region: Region,
    ) -> Result<Rewrite, AnalyzerError> {
        match expr {
            Expr::Variable(descriptor) => {
                self.check_variable(ctx, *descriptor, depth, locals, region)?;
                Ok(Rewrite::Unchanged)
            }
            Expr::Aggregate(call) if depth > 0 => Err(ctx.report(
                DiagnosticCode::UnsupportedFeature,
                format!("aggregate function `{}` nested inside another aggregate", call.function),
                region,
            )),
            Expr::Aggregate(call) => {
                for arg in call.args.iter_mut() {
                    self.splice(ctx, arg, depth + 1, locals, region)?;
                }
                let result = self.consume(ctx, call);
                Ok(Rewrite::Replace(Expr::Variable(result)))
            }
            Expr::Let { bindings, body } => {
                let mark = locals.len();
                for (local, value) in bindings.iter_mut() {
                    self.splice(ctx, value, depth, locals, region)?;
                    locals.push(*local);
                }
                self.splice(ctx, body, depth, locals, region)?;
                locals.truncate(mark);
                Ok(Rewrite::Unchanged)
            }
            _ => {
                for child in expr.children_mut() {
                    self.splice(ctx, child, depth, locals, region)?;
                }
                Ok(Rewrite::Unchanged)
            }
        }
    }

    fn check_variable(
        &self,
        ctx: &mut AnalysisContext,
        descriptor: Descriptor,
        depth: usize,
        locals: &[Descriptor],
        region: Region,
    ) -> Result<(), AnalyzerError> {
        if locals.contains(&descriptor) {
            return Ok(());
        }
        if depth == 0 && !self.is_grouping(descriptor) && !self.is_aggregated(descriptor) {
            return Err(ctx.report(
                DiagnosticCode::InvalidAggregationColumn,
                format!("column {} must appear in GROUP BY or be used in an aggregate function", descriptor),
                region,
            ));
        }
        if depth > 0 && self.is_aggregated(descriptor) {
            return Err(ctx.report(
                DiagnosticCode::InvalidAggregationColumn,
                format!("aggregated value {} used inside an aggregate function", descriptor),
                region,
            ));
        }
        Ok(())
    }

    /// Stages `call` in the aggregate operator and returns the variable
    /// holding its result. Equal calls share one entry.
    fn consume(&mut self, ctx: &mut AnalysisContext, call: &mut AggregateCall) -> Descriptor {
        let args: Vec<Descriptor> = std::mem::take(&mut call.args)
            .into_iter()
            .map(|arg| self.hoist(ctx, arg))
            .collect();

        let aggregate = self.aggregate_operator(ctx);
        let existing = match ctx.graph.operator(aggregate) {
            Some(Operator::Aggregate { entries, .. }) => entries
                .iter()
                .find(|entry| entry.matches(call.function, call.quantifier, &args))
                .map(|entry| entry.result),
            _ => None,
        };
        if let Some(result) = existing {
            trace!(%result, function = %call.function, "aggregate reused");
            return result;
        }

        let result = ctx.fresh_descriptor();
        if let Some(Operator::Aggregate { entries, .. }) = ctx.graph.operator_mut(aggregate) {
            entries.push(AggregateEntry { function: call.function, quantifier: call.quantifier, args, result });
        }
        self.aggregated.push(result);
        trace!(%result, function = %call.function, "aggregate staged");
        result
    }

    /// Returns a variable carrying `arg`, adding it to the argument
    /// projection unless it already is a variable or an equal expression
    /// was hoisted before.
    fn hoist(&mut self, ctx: &mut AnalysisContext, arg: Expr) -> Descriptor {
        if let Expr::Variable(descriptor) = arg {
            return descriptor;
        }
        let arguments = self.arguments_operator(ctx);
        if let Some(Operator::Project { columns }) = ctx.graph.operator(arguments) {
            if let Some(column) = columns.iter().find(|column| column.expr == arg) {
                return column.descriptor;
            }
        }
        let descriptor = ctx.fresh_descriptor();
        if let Some(Operator::Project { columns }) = ctx.graph.operator_mut(arguments) {
            columns.push(ProjectColumn { descriptor, expr: arg });
        }
        trace!(%descriptor, "aggregate argument hoisted");
        descriptor
    }

    fn arguments_operator(&mut self, ctx: &mut AnalysisContext) -> OperatorId {
        *self.arguments.get_or_insert_with(|| ctx.graph.add(Operator::Project { columns: vec![] }))
    }

    fn aggregate_operator(&mut self, ctx: &mut AnalysisContext) -> OperatorId {
        *self
            .aggregate
            .get_or_insert_with(|| ctx.graph.add(Operator::Aggregate { keys: vec![], entries: vec![] }))
    }

    /// Splices the staging operators in right after `port` and resets the
    /// processor. Returns the node that now produces the grouped rows, or
    /// `port` itself when aggregate mode was never entered.
    pub fn install(&mut self, ctx: &mut AnalysisContext, port: OperatorId) -> OperatorId {
        if !self.active {
            return port;
        }
        let aggregate = self.aggregate_operator(ctx);
        if let Some(Operator::Aggregate { keys, .. }) = ctx.graph.operator_mut(aggregate) {
            *keys = self.keys.clone();
        }
        let entry = match self.arguments {
            Some(arguments) => {
                ctx.graph.connect(arguments, aggregate);
                arguments
            }
            None => aggregate,
        };
        ctx.graph.splice_after(port, entry, aggregate);
        debug!(keys = self.keys.len(), aggregates = self.aggregated.len(), "aggregate staging installed");

        *self = Self::default();
        aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::MemoryCatalog,
        planner::{DescriptorFactory, SetFunction},
        syntax::{BinaryOp, Literal, SetQuantifier},
    };

    fn sum(arg: Expr) -> Expr {
        Expr::Aggregate(AggregateCall { function: SetFunction::Sum, quantifier: SetQuantifier::All, args: vec![arg] })
    }

    fn aggregate_entries(ctx: &AnalysisContext, id: OperatorId) -> Vec<AggregateEntry> {
        match ctx.graph.operator(id) {
            Some(Operator::Aggregate { entries, .. }) => entries.clone(),
            other => panic!("expected aggregate operator, got {other:?}"),
        }
    }

    #[test]
    fn equal_calls_share_one_entry() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let (k, x) = (ids.fresh(), ids.fresh());
        let input = ctx.graph.add(Operator::Values { columns: vec![k, x], rows: vec![] });

        let mut processor = AggregateProcessor::new();
        processor.add_group_key(k);
        let mut first = sum(Expr::Variable(x));
        let mut second = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(sum(Expr::Variable(x))),
            right: Box::new(Expr::Variable(k)),
        };
        processor.process(&mut ctx, &mut first, Region::default()).unwrap();
        processor.process(&mut ctx, &mut second, Region::default()).unwrap();

        let result = first.as_variable().expect("call replaced by a variable");
        assert!(processor.is_aggregated(result));
        assert_eq!(second.free_variables(), vec![result, k]);

        let aggregate = processor.install(&mut ctx, input);
        assert_eq!(aggregate_entries(&ctx, aggregate).len(), 1);
        assert_eq!(ctx.graph.output_descriptors(aggregate), vec![k, result]);
        assert!(!processor.is_active());
    }

    #[test]
    fn non_trivial_arguments_are_hoisted_once() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let x = ids.fresh();
        let input = ctx.graph.add(Operator::Values { columns: vec![x], rows: vec![] });
        let doubled = || Expr::Binary {
            op: BinaryOp::Multiply,
            left: Box::new(Expr::Variable(x)),
            right: Box::new(Expr::Literal(Literal::Int(2))),
        };

        let mut processor = AggregateProcessor::new();
        let mut a = sum(doubled());
        let mut b = Expr::Aggregate(AggregateCall {
            function: SetFunction::Max,
            quantifier: SetQuantifier::All,
            args: vec![doubled()],
        });
        processor.process(&mut ctx, &mut a, Region::default()).unwrap();
        processor.process(&mut ctx, &mut b, Region::default()).unwrap();
        let aggregate = processor.install(&mut ctx, input);

        let entries = aggregate_entries(&ctx, aggregate);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].args, entries[1].args);

        let arguments = ctx.graph.inputs(aggregate)[0];
        assert!(matches!(ctx.graph.operator(arguments), Some(Operator::Project { columns }) if columns.len() == 1));
        assert_eq!(ctx.graph.inputs(arguments), &[input]);
        assert_eq!(ctx.graph.validate(aggregate), Ok(()));
    }

    #[test]
    fn ungrouped_column_is_rejected() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let (k, x) = (ids.fresh(), ids.fresh());

        let mut processor = AggregateProcessor::new();
        processor.add_group_key(k);
        let err = processor.process(&mut ctx, &mut Expr::Variable(x), Region::default()).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::InvalidAggregationColumn);
    }

    #[test]
    fn nested_aggregate_is_unsupported() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let x = ids.fresh();

        let mut processor = AggregateProcessor::new();
        let mut nested = sum(sum(Expr::Variable(x)));
        let err = processor.process(&mut ctx, &mut nested, Region::default()).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::UnsupportedFeature);
    }

    #[test]
    fn aggregate_result_inside_aggregate_is_rejected() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let mut ids = DescriptorFactory::new();
        let x = ids.fresh();

        let mut processor = AggregateProcessor::new();
        let mut first = sum(Expr::Variable(x));
        processor.process(&mut ctx, &mut first, Region::default()).unwrap();
        let result = first.as_variable().unwrap();

        let mut reuse = sum(Expr::Variable(result));
        let err = processor.process(&mut ctx, &mut reuse, Region::default()).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::InvalidAggregationColumn);
    }

    #[test]
    fn install_without_activity_is_a_no_op() {
        let catalog = MemoryCatalog::new();
        let mut ctx = AnalysisContext::new(&catalog);
        let input = ctx.graph.add(Operator::Values { columns: vec![], rows: vec![vec![]] });
        let mut processor = AggregateProcessor::new();
        assert_eq!(processor.install(&mut ctx, input), input);
        assert_eq!(ctx.graph.len(), 1);
    }
}

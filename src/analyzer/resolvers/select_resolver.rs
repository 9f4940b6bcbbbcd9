use tracing::debug;

use crate::{
    analyzer::{
        AggregateProcessor, AnalysisContext, AnalyzerError, DiagnosticCode, GroupByResolver, JoinResolver,
        LimitResolver, OrderByResolver, ProjectionResolver, QueryOutput, ScalarResolver, Scope,
    },
    planner::{Operator, OperatorId},
    syntax::{Region, SimpleQuery},
};

pub struct SelectResolver;

impl SelectResolver {
    /// Lowers one query block:
    /// FROM, WHERE, GROUP BY, HAVING, SELECT, DISTINCT, ORDER BY, LIMIT,
    /// then splices in the aggregate staging if any clause needed it.
    pub fn resolve(
        ctx: &mut AnalysisContext,
        query: &SimpleQuery,
        region: Region,
        parent: Option<&Scope>,
    ) -> Result<QueryOutput, AnalyzerError> {
        let mut scope = Scope::new(parent);
        let mut port = JoinResolver::from_clause(ctx, &mut scope, &query.from)?;
        debug!(relations = scope.len(), "FROM analyzed");

        if let Some(criteria) = &query.criteria {
            let predicate = ScalarResolver::resolve(ctx, &scope, criteria)?;
            ScalarResolver::reject_aggregates(ctx, &predicate, "WHERE", criteria.region)?;
            port = ctx.graph.push(Operator::Filter { predicate }, [port]);
            debug!("WHERE analyzed");
        }
        let pre_aggregation = port;

        let mut aggregates = AggregateProcessor::new();
        GroupByResolver::resolve(ctx, &scope, &query.group_by, &mut aggregates)?;

        // Extracted right away, but the staging operators it feeds are only
        // spliced in below it at install time.
        let mut having = None;
        if let Some(predicate) = &query.having {
            aggregates.activate();
            let mut bound = ScalarResolver::resolve(ctx, &scope, predicate)?;
            aggregates.process(ctx, &mut bound, predicate.region)?;
            port = ctx.graph.push(Operator::Filter { predicate: bound }, [port]);
            having = Some(port);
            debug!("HAVING analyzed");
        }

        let projection = ProjectionResolver::resolve(ctx, &scope, &query.projection, port, &mut aggregates, region)?;
        port = projection.port;

        if query.distinct {
            port = ctx.graph.push(Operator::Distinct { keys: projection.relation.descriptors() }, [port]);
        }

        let mut ordering = None;
        if !query.order_by.is_empty() {
            let order_by = OrderByResolver::resolve(
                ctx,
                &scope,
                &projection.relation,
                &query.order_by,
                port,
                &mut aggregates,
            )?;
            port = order_by.port;
            ordering = Some(order_by);
        }

        if let Some(limit) = &query.limit {
            let sort = ordering.as_ref().map(|o| o.port);
            port = LimitResolver::resolve(ctx, limit, port, sort)?;
        }

        if aggregates.is_active() {
            Self::extract(ctx, &mut aggregates, Some(projection.port), &projection.regions)?;
            let (order_projection, order_regions) = match &ordering {
                Some(o) => (o.projection, o.regions.as_slice()),
                None => (None, &[][..]),
            };
            Self::extract(ctx, &mut aggregates, order_projection, order_regions)?;
            aggregates.install(ctx, pre_aggregation);
            Self::revalidate(ctx, &[having, Some(projection.port), order_projection], region)?;
        }

        Ok(QueryOutput { port, relation: projection.relation })
    }

    /// Runs aggregate extraction over the columns of a projection node.
    fn extract(
        ctx: &mut AnalysisContext,
        aggregates: &mut AggregateProcessor,
        project: Option<OperatorId>,
        regions: &[Region],
    ) -> Result<(), AnalyzerError> {
        let Some(project) = project else {
            return Ok(());
        };
        let mut columns = match ctx.graph.operator_mut(project) {
            Some(Operator::Project { columns }) => std::mem::take(columns),
            _ => return Ok(()),
        };
        for (i, column) in columns.iter_mut().enumerate() {
            let region = regions.get(i).copied().unwrap_or_default();
            aggregates.process(ctx, &mut column.expr, region)?;
        }
        if let Some(Operator::Project { columns: slot }) = ctx.graph.operator_mut(project) {
            *slot = columns;
        }
        Ok(())
    }

    /// After aggregation only grouping keys and aggregate results flow on;
    /// every consumer must still find what it reads.
    fn revalidate(ctx: &mut AnalysisContext, nodes: &[Option<OperatorId>], region: Region) -> Result<(), AnalyzerError> {
        for node in nodes.iter().flatten() {
            if let Err(missing) = ctx.graph.validate(*node) {
                return Err(ctx.report(
                    DiagnosticCode::InvalidAggregationColumn,
                    format!("{} is not available after aggregation", missing),
                    region,
                ));
            }
        }
        Ok(())
    }
}

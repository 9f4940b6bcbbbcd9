use tracing::debug;

use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnEntry, DiagnosticCode, QueryOutput, Relation, ScalarResolver, Scope},
    planner::{Descriptor, Expr, Operator},
    syntax::{Literal, Region, RowValue},
};

pub struct ValuesResolver;

impl ValuesResolver {
    /// Lowers `VALUES (...), (...)`. The output is as wide as the widest
    /// row; shorter rows are padded with NULL.
    pub fn resolve(
        ctx: &mut AnalysisContext,
        rows: &[RowValue],
        region: Region,
        parent: Option<&Scope>,
    ) -> Result<QueryOutput, AnalyzerError> {
        ctx.check_limit("VALUES rows", rows.len(), ctx.config.max_values_rows, region)?;

        // Row expressions see no relations.
        let scope = Scope::new(parent);
        let mut bound_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let RowValue::Row { elements, region } = row else {
                return Err(ctx.report(
                    DiagnosticCode::UnsupportedFeature,
                    "only row constructors are supported in VALUES",
                    row.region(),
                ));
            };
            ctx.check_limit("row columns", elements.len(), ctx.config.max_row_columns, *region)?;
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                let value = ScalarResolver::resolve(ctx, &scope, element)?;
                ScalarResolver::reject_aggregates(ctx, &value, "VALUES", element.region)?;
                values.push(value);
            }
            bound_rows.push(values);
        }

        let width = bound_rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut bound_rows {
            row.resize(width, Expr::Literal(Literal::Null));
        }
        let columns: Vec<Descriptor> = (0..width).map(|_| ctx.fresh_descriptor()).collect();
        let relation = Relation::from_columns(None, columns.iter().map(|d| ColumnEntry::new(*d, None)).collect());

        let port = ctx.graph.add(Operator::Values { columns, rows: bound_rows });
        debug!(rows = rows.len(), width, "VALUES analyzed");
        Ok(QueryOutput { port, relation })
    }
}

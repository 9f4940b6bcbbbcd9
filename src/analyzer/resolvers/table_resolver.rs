use tracing::trace;

use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnEntry, DiagnosticCode, QueryOutput, Relation},
    planner::{Operator, ScanColumn},
    syntax::{Name, Region, normalize},
};

pub struct TableResolver;

impl TableResolver {
    /// Lowers a base table into a scan over its primary index. System
    /// columns are left out unless the configuration asks for them.
    pub fn scan(ctx: &mut AnalysisContext, name: &Name, region: Region) -> Result<QueryOutput, AnalyzerError> {
        let table = ctx
            .catalog
            .find_table(name)
            .ok_or_else(|| ctx.report(DiagnosticCode::TableNotFound, format!("table `{}` not found", name), region))?;
        let Some(index) = table.primary_index.as_ref() else {
            return Err(ctx.report(
                DiagnosticCode::PrimaryIndexNotFound,
                format!("table `{}` has no primary index", table.name),
                region,
            ));
        };

        let include_system = ctx.config.include_system_columns;
        let mut relation = Relation::new(Some(normalize(table.name.last())));
        relation.primary_index = Some(index.name.clone());
        let mut columns = Vec::with_capacity(table.columns.len());
        for decl in table.columns.iter().filter(|c| include_system || !c.system) {
            let descriptor = ctx.fresh_descriptor();
            columns.push(ScanColumn { descriptor, column: decl.name.clone() });
            relation.push(ColumnEntry::declared(decl.clone(), descriptor, normalize(&decl.name)));
        }

        let port = ctx.graph.add(Operator::Scan { table: table.name.clone(), index: index.name.clone(), columns });
        trace!(table = %table.name, columns = relation.len(), "scan");
        Ok(QueryOutput { port, relation })
    }
}

use serde_json::Value;

use crate::{
    analyzer::Relation,
    planner::{Operator, OperatorGraph, OperatorId},
};

/// Result of analyzing one statement.
#[derive(Debug, Clone)]
pub struct AnalyzedQuery {
    pub graph: OperatorGraph,
    pub output: OperatorId,
    pub relation: Relation,
}

impl AnalyzedQuery {
    /// Identifiers of the exported output columns, in order.
    pub fn column_names(&self) -> Vec<Option<&str>> {
        self.relation.exported().map(|c| c.identifier()).collect()
    }

    /// Operators reachable from the output whose kind is `name`.
    pub fn operators(&self, name: &str) -> Vec<&Operator> {
        self.graph
            .reachable(self.output)
            .into_iter()
            .filter_map(|id| self.graph.operator(id))
            .filter(|op| op.name() == name)
            .collect()
    }

    pub fn root(&self) -> Option<&Operator> {
        self.graph.operator(self.output)
    }

    pub fn explain(&self) -> Value {
        self.graph.explain(self.output)
    }
}

use crate::{analyzer::Relation, planner::OperatorId};

/// What lowering one query or table expression hands back: the node
/// whose output carries the rows, and the columns it exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub port: OperatorId,
    pub relation: Relation,
}

use serde::Serialize;

use crate::{
    planner::{AggregateEntry, Descriptor, Expr},
    syntax::{Name, SetQuantifier, SortDirection},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanColumn {
    pub descriptor: Descriptor,
    /// Declared column name in the table.
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectColumn {
    pub descriptor: Descriptor,
    pub expr: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinSide {
    Left,
    Right,
}

/// Output column of a union join, copied from one side and null on the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JoinColumn {
    pub output: Descriptor,
    pub source: Descriptor,
    pub side: JoinSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOperatorKind {
    Inner,
    LeftOuter,
    FullOuter,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub descriptor: Descriptor,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnionColumn {
    pub output: Descriptor,
    pub left: Descriptor,
    pub right: Descriptor,
}

/// A node of the relational operator graph. Inputs live on the graph node,
/// not here, so operators can be rewired without touching their payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operator {
    /// Full scan of a base table through its primary index.
    Scan {
        table: Name,
        index: String,
        columns: Vec<ScanColumn>,
    },

    /// Literal rows. A query without FROM reads one row of zero columns.
    Values {
        columns: Vec<Descriptor>,
        rows: Vec<Vec<Expr>>,
    },

    Filter {
        predicate: Expr,
    },

    /// Passes every input column through and appends `columns`.
    Project {
        columns: Vec<ProjectColumn>,
    },

    /// Two inputs, left then right. `columns` is only used by union joins;
    /// the other kinds output the left columns followed by the right.
    Join {
        /// Serialized as `join_kind`; `kind` is the operator tag.
        #[serde(rename = "join_kind")]
        kind: JoinOperatorKind,
        condition: Option<Expr>,
        columns: Vec<JoinColumn>,
    },

    Distinct {
        keys: Vec<Descriptor>,
    },

    /// Row limit, sorted by `keys` first when there are any (top-k).
    Limit {
        count: Option<u64>,
        keys: Vec<SortSpec>,
    },

    Union {
        quantifier: SetQuantifier,
        columns: Vec<UnionColumn>,
    },

    /// One row per group of `keys`, with one column per entry.
    Aggregate {
        keys: Vec<Descriptor>,
        entries: Vec<AggregateEntry>,
    },
}

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Scan { .. } => "scan",
            Operator::Values { .. } => "values",
            Operator::Filter { .. } => "filter",
            Operator::Project { .. } => "project",
            Operator::Join { .. } => "join",
            Operator::Distinct { .. } => "distinct",
            Operator::Limit { .. } => "limit",
            Operator::Union { .. } => "union",
            Operator::Aggregate { .. } => "aggregate",
        }
    }

    /// Descriptors this operator reads from its inputs.
    pub fn referenced(&self) -> Vec<Descriptor> {
        let mut out = Vec::new();
        let mut push = |d: Descriptor| {
            if !out.contains(&d) {
                out.push(d);
            }
        };
        match self {
            Operator::Scan { .. } | Operator::Values { .. } => {}
            Operator::Filter { predicate } => predicate.free_variables().into_iter().for_each(&mut push),
            Operator::Project { columns } => columns
                .iter()
                .flat_map(|c| c.expr.free_variables())
                .for_each(&mut push),
            Operator::Join { condition, columns, .. } => {
                condition.iter().flat_map(Expr::free_variables).for_each(&mut push);
                columns.iter().map(|c| c.source).for_each(&mut push);
            }
            Operator::Distinct { keys } => keys.iter().copied().for_each(&mut push),
            Operator::Limit { keys, .. } => keys.iter().map(|k| k.descriptor).for_each(&mut push),
            Operator::Union { columns, .. } => columns
                .iter()
                .flat_map(|c| [c.left, c.right])
                .for_each(&mut push),
            Operator::Aggregate { keys, entries } => {
                keys.iter().copied().for_each(&mut push);
                entries.iter().flat_map(|e| e.args.iter().copied()).for_each(&mut push);
            }
        }
        out
    }
}

use serde::Serialize;

use crate::syntax::{Region, ScalarExpr};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    First,
    Last,
}

/// One `ORDER BY` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: ScalarExpr,
    pub direction: SortDirection,
    pub collation: Option<String>,
    pub nulls: Option<NullOrdering>,
    pub region: Region,
}

impl SortKey {
    pub fn asc(expr: ScalarExpr) -> Self {
        let region = expr.region;
        Self { expr, direction: SortDirection::Ascending, collation: None, nulls: None, region }
    }

    pub fn desc(expr: ScalarExpr) -> Self {
        Self { direction: SortDirection::Descending, ..Self::asc(expr) }
    }

    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn nulls(mut self, nulls: NullOrdering) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

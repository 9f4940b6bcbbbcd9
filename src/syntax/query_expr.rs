use crate::syntax::{Name, Region, ScalarExpr, SetQuantifier, SimpleQuery};

/// A query expression: the unit the analyzer lowers into an operator graph.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpr {
    pub kind: QueryExprKind,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryExprKind {
    Select(Box<SimpleQuery>),
    /// `TABLE t`
    Table(Name),
    /// `VALUES (...), (...)`
    Values(Vec<RowValue>),
    Binary {
        operator: SetOperator,
        quantifier: Option<SetQuantifier>,
        corresponding: Option<Vec<String>>,
        left: Box<QueryExpr>,
        right: Box<QueryExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Except,
    Intersect,
    OuterUnion,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// `(e1, e2, ...)`
    Row { elements: Vec<ScalarExpr>, region: Region },
    /// Any other row value expression, e.g. a bare scalar.
    Expr(ScalarExpr),
}

impl RowValue {
    pub fn row(elements: Vec<ScalarExpr>) -> Self {
        RowValue::Row { elements, region: Region::default() }
    }

    pub fn region(&self) -> Region {
        match self {
            RowValue::Row { region, .. } => *region,
            RowValue::Expr(expr) => expr.region,
        }
    }
}

impl QueryExpr {
    pub fn new(kind: QueryExprKind) -> Self {
        Self { kind, region: Region::default() }
    }

    pub fn at(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn table(name: &str) -> Self {
        Self::new(QueryExprKind::Table(Name::from(name)))
    }

    pub fn values(rows: Vec<RowValue>) -> Self {
        Self::new(QueryExprKind::Values(rows))
    }

    pub fn set_operation(
        operator: SetOperator,
        quantifier: Option<SetQuantifier>,
        left: QueryExpr,
        right: QueryExpr,
    ) -> Self {
        let region = left.region.merge(right.region);
        Self::new(QueryExprKind::Binary {
            operator,
            quantifier,
            corresponding: None,
            left: Box::new(left),
            right: Box::new(right),
        })
        .at(region)
    }

    pub fn union(left: QueryExpr, right: QueryExpr) -> Self {
        Self::set_operation(SetOperator::Union, None, left, right)
    }

    pub fn union_all(left: QueryExpr, right: QueryExpr) -> Self {
        Self::set_operation(SetOperator::Union, Some(SetQuantifier::All), left, right)
    }
}

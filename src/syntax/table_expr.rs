use crate::syntax::{Name, QueryExpr, Region, ScalarExpr};

/// One item of a `FROM` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct TableExpr {
    pub kind: TableExprKind,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableExprKind {
    Table { name: Name, correlation: Option<Correlation> },
    Join { kind: JoinKind, left: Box<TableExpr>, right: Box<TableExpr>, spec: JoinSpec },
    Subquery { query: Box<QueryExpr>, lateral: bool, correlation: Option<Correlation> },
    Unnest { expr: ScalarExpr, correlation: Option<Correlation> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Cross,
    Inner,
    Left,
    Right,
    Full,
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinSpec {
    None,
    On(ScalarExpr),
    Using(Vec<String>),
    Natural,
}

/// `AS name (c1, c2, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub name: String,
    pub columns: Vec<String>,
    pub region: Region,
}

impl Correlation {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), columns: vec![], region: Region::default() }
    }

    pub fn with_columns<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            region: Region::default(),
        }
    }
}

impl TableExpr {
    pub fn new(kind: TableExprKind) -> Self {
        Self { kind, region: Region::default() }
    }

    pub fn at(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn table(name: &str) -> Self {
        Self::new(TableExprKind::Table { name: Name::from(name), correlation: None })
    }

    /// `name AS alias`
    pub fn aliased(name: &str, alias: &str) -> Self {
        Self::new(TableExprKind::Table { name: Name::from(name), correlation: Some(Correlation::new(alias)) })
    }

    pub fn correlated(name: &str, correlation: Correlation) -> Self {
        Self::new(TableExprKind::Table { name: Name::from(name), correlation: Some(correlation) })
    }

    pub fn join(kind: JoinKind, left: TableExpr, right: TableExpr, spec: JoinSpec) -> Self {
        let region = left.region.merge(right.region);
        Self::new(TableExprKind::Join { kind, left: Box::new(left), right: Box::new(right), spec }).at(region)
    }

    pub fn cross(left: TableExpr, right: TableExpr) -> Self {
        Self::join(JoinKind::Cross, left, right, JoinSpec::None)
    }

    pub fn using<I, S>(kind: JoinKind, left: TableExpr, right: TableExpr, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::join(kind, left, right, JoinSpec::Using(columns.into_iter().map(Into::into).collect()))
    }

    pub fn subquery(query: QueryExpr, correlation: Option<Correlation>) -> Self {
        Self::new(TableExprKind::Subquery { query: Box::new(query), lateral: false, correlation })
    }
}

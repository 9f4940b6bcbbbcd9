use crate::syntax::{QueryExpr, QueryExprKind, Region, ScalarExpr, SortKey, TableExpr};

/// `SELECT ... FROM ... WHERE ... GROUP BY ... HAVING ... ORDER BY ... LIMIT ...`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleQuery {
    pub distinct: bool,
    pub projection: Vec<SelectElement>,
    pub from: Vec<TableExpr>,
    pub criteria: Option<ScalarExpr>,
    pub group_by: Vec<ScalarExpr>,
    pub having: Option<ScalarExpr>,
    pub order_by: Vec<SortKey>,
    pub limit: Option<ScalarExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectElement {
    Expr { expr: ScalarExpr, alias: Option<String> },
    Asterisk { qualifier: Option<String>, region: Region },
}

impl SelectElement {
    pub fn region(&self) -> Region {
        match self {
            SelectElement::Expr { expr, .. } => expr.region,
            SelectElement::Asterisk { region, .. } => *region,
        }
    }
}

impl SimpleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, expr: ScalarExpr) -> Self {
        self.projection.push(SelectElement::Expr { expr, alias: None });
        self
    }

    pub fn column_as(mut self, expr: ScalarExpr, alias: &str) -> Self {
        self.projection.push(SelectElement::Expr { expr, alias: Some(alias.to_string()) });
        self
    }

    pub fn asterisk(mut self) -> Self {
        self.projection.push(SelectElement::Asterisk { qualifier: None, region: Region::default() });
        self
    }

    pub fn asterisk_of(mut self, qualifier: &str) -> Self {
        self.projection.push(SelectElement::Asterisk {
            qualifier: Some(qualifier.to_string()),
            region: Region::default(),
        });
        self
    }

    pub fn from(mut self, table: TableExpr) -> Self {
        self.from.push(table);
        self
    }

    pub fn filter(mut self, criteria: ScalarExpr) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn group_by(mut self, key: ScalarExpr) -> Self {
        self.group_by.push(key);
        self
    }

    pub fn having(mut self, predicate: ScalarExpr) -> Self {
        self.having = Some(predicate);
        self
    }

    pub fn order_by(mut self, key: SortKey) -> Self {
        self.order_by.push(key);
        self
    }

    pub fn limit(mut self, count: ScalarExpr) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn into_query(self) -> QueryExpr {
        QueryExpr::new(QueryExprKind::Select(Box::new(self)))
    }
}

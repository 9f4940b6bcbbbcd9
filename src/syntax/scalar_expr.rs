use ordered_float::NotNan;
use std::fmt;

use crate::syntax::{BinaryOp, ColumnName, ComparatorOp, Literal, Name, Region, SetQuantifier, UnaryOp};

/// A scalar expression as written in the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarExpr {
    pub kind: ScalarExprKind,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExprKind {
    Literal(Literal),
    Column(ColumnName),
    Cast { operand: Box<ScalarExpr>, ty: String },
    Unary { op: UnaryOp, operand: Box<ScalarExpr> },
    Binary { op: BinaryOp, left: Box<ScalarExpr>, right: Box<ScalarExpr> },
    Compare { op: ComparatorOp, left: Box<ScalarExpr>, right: Box<ScalarExpr> },
    Like { operand: Box<ScalarExpr>, pattern: Box<ScalarExpr>, negated: bool },
    Case {
        operand: Option<Box<ScalarExpr>>,
        whens: Vec<(ScalarExpr, ScalarExpr)>,
        otherwise: Option<Box<ScalarExpr>>,
    },
    Coalesce(Vec<ScalarExpr>),
    Function(FunctionCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: Name,
    pub quantifier: Option<SetQuantifier>,
    pub args: FunctionArgs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArgs {
    /// `f(*)`, only meaningful for `COUNT`.
    Asterisk,
    List(Vec<ScalarExpr>),
}

impl ScalarExpr {
    pub fn new(kind: ScalarExprKind) -> Self {
        Self { kind, region: Region::default() }
    }

    pub fn at(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn literal(value: Literal) -> Self {
        Self::new(ScalarExprKind::Literal(value))
    }

    pub fn int(value: i64) -> Self {
        Self::literal(Literal::Int(value))
    }

    pub fn float(value: f64) -> Self {
        match NotNan::new(value) {
            Ok(value) => Self::literal(Literal::Float(value)),
            Err(_) => Self::null(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Self::literal(Literal::Bool(value))
    }

    pub fn null() -> Self {
        Self::literal(Literal::Null)
    }

    /// Column reference; `"t.a"` is taken as qualifier `t`, column `a`.
    pub fn column(name: &str) -> Self {
        Self::new(ScalarExprKind::Column(ColumnName::from(name)))
    }

    pub fn cast(operand: ScalarExpr, ty: impl Into<String>) -> Self {
        Self::new(ScalarExprKind::Cast { operand: Box::new(operand), ty: ty.into() })
    }

    pub fn unary(op: UnaryOp, operand: ScalarExpr) -> Self {
        Self::new(ScalarExprKind::Unary { op, operand: Box::new(operand) })
    }

    pub fn binary(op: BinaryOp, left: ScalarExpr, right: ScalarExpr) -> Self {
        Self::new(ScalarExprKind::Binary { op, left: Box::new(left), right: Box::new(right) })
    }

    pub fn compare(op: ComparatorOp, left: ScalarExpr, right: ScalarExpr) -> Self {
        Self::new(ScalarExprKind::Compare { op, left: Box::new(left), right: Box::new(right) })
    }

    pub fn eq(left: ScalarExpr, right: ScalarExpr) -> Self {
        Self::compare(ComparatorOp::Eq, left, right)
    }

    pub fn and(left: ScalarExpr, right: ScalarExpr) -> Self {
        Self::binary(BinaryOp::And, left, right)
    }

    pub fn like(operand: ScalarExpr, pattern: ScalarExpr, negated: bool) -> Self {
        Self::new(ScalarExprKind::Like { operand: Box::new(operand), pattern: Box::new(pattern), negated })
    }

    pub fn coalesce(operands: Vec<ScalarExpr>) -> Self {
        Self::new(ScalarExprKind::Coalesce(operands))
    }

    pub fn case(whens: Vec<(ScalarExpr, ScalarExpr)>, otherwise: Option<ScalarExpr>) -> Self {
        Self::new(ScalarExprKind::Case { operand: None, whens, otherwise: otherwise.map(Box::new) })
    }

    pub fn call(name: &str, args: Vec<ScalarExpr>) -> Self {
        Self::new(ScalarExprKind::Function(FunctionCall {
            name: Name::from(name),
            quantifier: None,
            args: FunctionArgs::List(args),
        }))
    }

    pub fn call_distinct(name: &str, args: Vec<ScalarExpr>) -> Self {
        Self::new(ScalarExprKind::Function(FunctionCall {
            name: Name::from(name),
            quantifier: Some(SetQuantifier::Distinct),
            args: FunctionArgs::List(args),
        }))
    }

    /// `COUNT(*)`
    pub fn count_all() -> Self {
        Self::new(ScalarExprKind::Function(FunctionCall {
            name: Name::simple("count"),
            quantifier: None,
            args: FunctionArgs::Asterisk,
        }))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ScalarExprKind::Literal(_))
    }

    pub fn as_column(&self) -> Option<&ColumnName> {
        match &self.kind {
            ScalarExprKind::Column(column) => Some(column),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ScalarExprKind::Literal(value) => write!(f, "{}", value),
            ScalarExprKind::Column(column) => write!(f, "{}", column),
            ScalarExprKind::Cast { operand, ty } => write!(f, "CAST({} AS {})", operand, ty),
            ScalarExprKind::Unary { op: op @ (UnaryOp::IsNull | UnaryOp::IsNotNull), operand } => {
                write!(f, "{} {}", operand, op)
            }
            ScalarExprKind::Unary { op, operand } => write!(f, "{} {}", op, operand),
            ScalarExprKind::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ScalarExprKind::Compare { op, left, right } => write!(f, "{} {} {}", left, op, right),
            ScalarExprKind::Like { operand, pattern, negated } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{} {}LIKE {}", operand, not, pattern)
            }
            ScalarExprKind::Case { operand, whens, otherwise } => {
                write!(f, "CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {}", operand)?;
                }
                for (when, then) in whens {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(otherwise) = otherwise {
                    write!(f, " ELSE {}", otherwise)?;
                }
                write!(f, " END")
            }
            ScalarExprKind::Coalesce(operands) => {
                let operands = operands.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                write!(f, "COALESCE({})", operands)
            }
            ScalarExprKind::Function(call) => {
                write!(f, "{}(", call.name)?;
                if let Some(quantifier) = call.quantifier {
                    write!(f, "{} ", quantifier)?;
                }
                match &call.args {
                    FunctionArgs::Asterisk => write!(f, "*")?,
                    FunctionArgs::List(args) => {
                        let args = args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                        write!(f, "{}", args)?;
                    }
                }
                write!(f, ")")
            }
        }
    }
}

use serde::Serialize;
use std::fmt;

use crate::{
    planner::{Descriptor, Expr},
    syntax::{SetQuantifier, normalize},
};

/// Set functions the analyzer knows how to stage into an aggregate operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetFunction {
    Count,
    /// `COUNT(*)`, which takes no arguments.
    CountAsterisk,
    Sum,
    Avg,
    Min,
    Max,
    Every,
    Any,
}

impl SetFunction {
    /// Resolves a function name to a set function. `SOME` is an alias of `ANY`.
    pub fn from_name(name: &str) -> Option<SetFunction> {
        match normalize(name).as_str() {
            "count" => Some(SetFunction::Count),
            "sum" => Some(SetFunction::Sum),
            "avg" => Some(SetFunction::Avg),
            "min" => Some(SetFunction::Min),
            "max" => Some(SetFunction::Max),
            "every" => Some(SetFunction::Every),
            "any" | "some" => Some(SetFunction::Any),
            _ => None,
        }
    }
}

impl fmt::Display for SetFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetFunction::Count => write!(f, "count"),
            SetFunction::CountAsterisk => write!(f, "count(*)"),
            SetFunction::Sum => write!(f, "sum"),
            SetFunction::Avg => write!(f, "avg"),
            SetFunction::Min => write!(f, "min"),
            SetFunction::Max => write!(f, "max"),
            SetFunction::Every => write!(f, "every"),
            SetFunction::Any => write!(f, "any"),
        }
    }
}

/// An aggregate call still embedded in a bound expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateCall {
    pub function: SetFunction,
    pub quantifier: SetQuantifier,
    pub args: Vec<Expr>,
}

/// One column computed by an aggregate operator: the function applied to
/// plain variables, written to `result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateEntry {
    pub function: SetFunction,
    pub quantifier: SetQuantifier,
    pub args: Vec<Descriptor>,
    pub result: Descriptor,
}

impl AggregateEntry {
    /// True when this entry computes the same value as the given call shape.
    pub fn matches(&self, function: SetFunction, quantifier: SetQuantifier, args: &[Descriptor]) -> bool {
        self.function == function && self.quantifier == quantifier && self.args == args
    }
}

impl fmt::Display for AggregateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.function == SetFunction::CountAsterisk {
            return write!(f, "{} := count(*)", self.result);
        }
        let args = self.args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        match self.quantifier {
            SetQuantifier::Distinct => write!(f, "{} := {}(DISTINCT {})", self.result, self.function, args),
            SetQuantifier::All => write!(f, "{} := {}({})", self.result, self.function, args),
        }
    }
}

use serde::Serialize;

use crate::{
    planner::{AggregateCall, Descriptor},
    syntax::{BinaryOp, ComparatorOp, Literal, Name, UnaryOp},
};

/// A scalar expression after name resolution: every column reference has
/// been replaced by the descriptor of the value it reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Variable(Descriptor),
    Literal(Literal),
    Cast { operand: Box<Expr>, ty: String },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Compare { op: ComparatorOp, left: Box<Expr>, right: Box<Expr> },
    Like { operand: Box<Expr>, pattern: Box<Expr>, negated: bool },
    Case { operand: Option<Box<Expr>>, whens: Vec<(Expr, Expr)>, otherwise: Option<Box<Expr>> },
    Coalesce(Vec<Expr>),
    /// Local bindings visible only inside `body`.
    Let { bindings: Vec<(Descriptor, Expr)>, body: Box<Expr> },
    Call { function: Name, args: Vec<Expr> },
    Aggregate(AggregateCall),
}

impl Expr {
    pub fn compare(op: ComparatorOp, left: Expr, right: Expr) -> Expr {
        Expr::Compare { op, left: Box::new(left), right: Box::new(right) }
    }

    /// Folds the terms into a left-deep `AND` chain.
    pub fn conjunction(terms: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        terms.into_iter().reduce(|left, right| Expr::Binary {
            op: BinaryOp::And,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn as_variable(&self) -> Option<Descriptor> {
        match self {
            Expr::Variable(descriptor) => Some(*descriptor),
            _ => None,
        }
    }

    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expr::Aggregate(_) => true,
            Expr::Let { bindings, body } => {
                bindings.iter().any(|(_, value)| value.contains_aggregate()) || body.contains_aggregate()
            }
            _ => self.children().into_iter().any(Expr::contains_aggregate),
        }
    }

    /// Immediate sub-expressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Variable(_) | Expr::Literal(_) => vec![],
            Expr::Cast { operand, .. } | Expr::Unary { operand, .. } => vec![&**operand],
            Expr::Binary { left, right, .. } | Expr::Compare { left, right, .. } => vec![&**left, &**right],
            Expr::Like { operand, pattern, .. } => vec![&**operand, &**pattern],
            Expr::Case { operand, whens, otherwise } => operand
                .iter()
                .map(|e| &**e)
                .chain(whens.iter().flat_map(|(when, then)| [when, then]))
                .chain(otherwise.iter().map(|e| &**e))
                .collect(),
            Expr::Coalesce(operands) => operands.iter().collect(),
            Expr::Let { bindings, body } => bindings
                .iter()
                .map(|(_, value)| value)
                .chain(std::iter::once(&**body))
                .collect(),
            Expr::Call { args, .. } => args.iter().collect(),
            Expr::Aggregate(call) => call.args.iter().collect(),
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Variable(_) | Expr::Literal(_) => vec![],
            Expr::Cast { operand, .. } | Expr::Unary { operand, .. } => vec![&mut **operand],
            Expr::Binary { left, right, .. } | Expr::Compare { left, right, .. } => vec![&mut **left, &mut **right],
            Expr::Like { operand, pattern, .. } => vec![&mut **operand, &mut **pattern],
            Expr::Case { operand, whens, otherwise } => operand
                .iter_mut()
                .map(|e| &mut **e)
                .chain(whens.iter_mut().flat_map(|(when, then)| [when, then]))
                .chain(otherwise.iter_mut().map(|e| &mut **e))
                .collect(),
            Expr::Coalesce(operands) => operands.iter_mut().collect(),
            Expr::Let { bindings, body } => bindings
                .iter_mut()
                .map(|(_, value)| value)
                .chain(std::iter::once(&mut **body))
                .collect(),
            Expr::Call { args, .. } => args.iter_mut().collect(),
            Expr::Aggregate(call) => call.args.iter_mut().collect(),
        }
    }

    /// Descriptors read by this expression that are not bound by an
    /// enclosing `Let`, in first-use order without duplicates.
    pub fn free_variables(&self) -> Vec<Descriptor> {
        let mut out = Vec::new();
        self.collect_free_variables(&mut Vec::new(), &mut out);
        out
    }

    fn collect_free_variables(&self, bound: &mut Vec<Descriptor>, out: &mut Vec<Descriptor>) {
        match self {
            Expr::Variable(descriptor) => {
                if !bound.contains(descriptor) && !out.contains(descriptor) {
                    out.push(*descriptor);
                }
            }
            Expr::Let { bindings, body } => {
                let mark = bound.len();
                for (local, value) in bindings {
                    value.collect_free_variables(bound, out);
                    bound.push(*local);
                }
                body.collect_free_variables(bound, out);
                bound.truncate(mark);
            }
            _ => {
                for child in self.children() {
                    child.collect_free_variables(bound, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{planner::{DescriptorFactory, SetFunction}, syntax::SetQuantifier};

    #[test]
    fn free_variables_skip_let_locals() {
        let mut ids = DescriptorFactory::new();
        let (a, b, local) = (ids.fresh(), ids.fresh(), ids.fresh());

        let expr = Expr::Let {
            bindings: vec![(local, Expr::Variable(a))],
            body: Box::new(Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expr::Variable(local)),
                right: Box::new(Expr::Variable(b)),
            }),
        };
        assert_eq!(expr.free_variables(), vec![a, b]);
    }

    #[test]
    fn contains_aggregate_looks_through_scalar_calls() {
        let mut ids = DescriptorFactory::new();
        let x = ids.fresh();
        let sum = Expr::Aggregate(AggregateCall {
            function: SetFunction::Sum,
            quantifier: SetQuantifier::All,
            args: vec![Expr::Variable(x)],
        });
        let wrapped = Expr::Call { function: Name::simple("abs"), args: vec![sum] };
        assert!(wrapped.contains_aggregate());
        assert!(!Expr::Variable(x).contains_aggregate());
    }

    #[test]
    fn conjunction_builds_left_deep_and() {
        let mut ids = DescriptorFactory::new();
        let terms: Vec<_> = (0..3).map(|_| Expr::Variable(ids.fresh())).collect();
        let expected = terms.clone();
        match Expr::conjunction(terms) {
            Some(Expr::Binary { op: BinaryOp::And, left, right }) => {
                assert_eq!(*right, expected[2]);
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::And, .. }));
            }
            other => panic!("expected AND chain, got {other:?}"),
        }
        assert!(Expr::conjunction(vec![]).is_none());
    }
}

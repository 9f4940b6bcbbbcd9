use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

use crate::planner::{Descriptor, JoinOperatorKind, Operator};

/// Stable index of a node in an [`OperatorGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OperatorId(usize);

impl OperatorId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub operator: Operator,
    /// Upstream nodes, in port order.
    pub inputs: Vec<OperatorId>,
}

/// Arena of relational operators. Nodes are never removed; a node that is
/// no longer reachable from the output simply drops out of the plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorGraph {
    nodes: Vec<Node>,
}

impl OperatorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, operator: Operator) -> OperatorId {
        let id = OperatorId(self.nodes.len());
        tracing::trace!(%id, operator = operator.name(), "operator added");
        self.nodes.push(Node { operator, inputs: Vec::new() });
        id
    }

    /// Adds `operator` and wires `inputs` into it, in order.
    pub fn push(&mut self, operator: Operator, inputs: impl IntoIterator<Item = OperatorId>) -> OperatorId {
        let id = self.add(operator);
        for input in inputs {
            self.connect(input, id);
        }
        id
    }

    /// Makes `from` the next input of `to`.
    pub fn connect(&mut self, from: OperatorId, to: OperatorId) {
        if let Some(node) = self.nodes.get_mut(to.0) {
            node.inputs.push(from);
        }
    }

    pub fn node(&self, id: OperatorId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn operator(&self, id: OperatorId) -> Option<&Operator> {
        self.node(id).map(|n| &n.operator)
    }

    pub fn operator_mut(&mut self, id: OperatorId) -> Option<&mut Operator> {
        self.nodes.get_mut(id.0).map(|n| &mut n.operator)
    }

    pub fn inputs(&self, id: OperatorId) -> &[OperatorId] {
        self.node(id).map(|n| n.inputs.as_slice()).unwrap_or_default()
    }

    /// Nodes that read from `id`.
    pub fn consumers(&self, id: OperatorId) -> Vec<OperatorId> {
        self.nodes()
            .filter(|(_, node)| node.inputs.contains(&id))
            .map(|(consumer, _)| consumer)
            .collect()
    }

    /// Points every input of `consumer` that read from `old` at `new`.
    pub fn redirect(&mut self, consumer: OperatorId, old: OperatorId, new: OperatorId) -> bool {
        let Some(node) = self.nodes.get_mut(consumer.0) else {
            return false;
        };
        let mut changed = false;
        for input in node.inputs.iter_mut().filter(|input| **input == old) {
            *input = new;
            changed = true;
        }
        changed
    }

    /// Inserts the chain `entry ..= exit` right after `port`: `entry` reads
    /// from `port` and every former consumer of `port` now reads from `exit`.
    pub fn splice_after(&mut self, port: OperatorId, entry: OperatorId, exit: OperatorId) {
        for consumer in self.consumers(port) {
            if consumer != entry {
                self.redirect(consumer, port, exit);
            }
        }
        if !self.inputs(entry).contains(&port) {
            self.connect(port, entry);
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = (OperatorId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (OperatorId(i), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes reachable from `root` walking inputs, `root` first.
    pub fn reachable(&self, root: OperatorId) -> Vec<OperatorId> {
        let mut seen = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if seen.contains(&id) || self.node(id).is_none() {
                continue;
            }
            seen.push(id);
            stack.extend(self.inputs(id).iter().rev());
        }
        seen
    }

    /// Descriptors of the columns `id` produces, in stream order.
    pub fn output_descriptors(&self, id: OperatorId) -> Vec<Descriptor> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let input = |port: usize| {
            node.inputs.get(port).map(|i| self.output_descriptors(*i)).unwrap_or_default()
        };
        match &node.operator {
            Operator::Scan { columns, .. } => columns.iter().map(|c| c.descriptor).collect(),
            Operator::Values { columns, .. } => columns.clone(),
            Operator::Filter { .. } | Operator::Distinct { .. } | Operator::Limit { .. } => input(0),
            Operator::Project { columns } => {
                let mut out = input(0);
                out.extend(columns.iter().map(|c| c.descriptor));
                out
            }
            Operator::Join { kind: JoinOperatorKind::Union, columns, .. } => {
                columns.iter().map(|c| c.output).collect()
            }
            Operator::Join { .. } => {
                let mut out = input(0);
                out.extend(input(1));
                out
            }
            Operator::Union { columns, .. } => columns.iter().map(|c| c.output).collect(),
            Operator::Aggregate { keys, entries } => {
                keys.iter().copied().chain(entries.iter().map(|e| e.result)).collect()
            }
        }
    }

    /// Checks that every descriptor `id` reads is produced by one of its
    /// inputs. Returns the first dangling descriptor.
    pub fn validate(&self, id: OperatorId) -> Result<(), Descriptor> {
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        let available: Vec<Descriptor> = node
            .inputs
            .iter()
            .flat_map(|input| self.output_descriptors(*input))
            .collect();
        match node.operator.referenced().into_iter().find(|d| !available.contains(d)) {
            Some(missing) => Err(missing),
            None => Ok(()),
        }
    }

    /// JSON dump of the plan rooted at `root`, for EXPLAIN-style output.
    pub fn explain(&self, root: OperatorId) -> Value {
        let Some(node) = self.node(root) else {
            return Value::Null;
        };
        let inputs: Vec<Value> = node.inputs.iter().map(|input| self.explain(*input)).collect();
        let mut value = serde_json::to_value(&node.operator).unwrap_or_default();
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), json!(root.0));
            map.insert("inputs".to_string(), Value::Array(inputs));
        }
        value
    }
}

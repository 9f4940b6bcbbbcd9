pub mod descriptor;
pub use descriptor::*;

pub mod expr;
pub use expr::*;

pub mod aggregate_call;
pub use aggregate_call::*;

pub mod logical_plan;
pub use logical_plan::*;

pub mod operator_graph;
pub use operator_graph::*;

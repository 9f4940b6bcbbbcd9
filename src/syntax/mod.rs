pub mod region;
pub use region::*;

pub mod name;
pub use name::*;

pub mod literal;
pub use literal::*;

pub mod operators;
pub use operators::*;

pub mod scalar_expr;
pub use scalar_expr::*;

pub mod sort_key;
pub use sort_key::*;

pub mod table_expr;
pub use table_expr::*;

pub mod simple_query;
pub use simple_query::*;

pub mod query_expr;
pub use query_expr::*;

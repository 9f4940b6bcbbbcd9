pub mod analyzer_error;
pub use analyzer_error::*;

pub mod diagnostic;
pub use diagnostic::*;

pub mod analyzer_config;
pub use analyzer_config::*;

pub mod analysis_context;
pub use analysis_context::*;

pub mod column_entry;
pub use column_entry::*;

pub mod relation;
pub use relation::*;

pub mod scope;
pub use scope::*;

pub mod query_output;
pub use query_output::*;

pub mod analyzed_query;
pub use analyzed_query::*;

pub mod resolvers;
pub use resolvers::*;

pub mod query_analyzer;
pub use query_analyzer::*;

pub mod syntax;

pub mod catalog;
pub use catalog::{Catalog, ColumnDecl, IndexDecl, MemoryCatalog, TableDecl};

pub mod planner;
pub use planner::{Operator, OperatorGraph, OperatorId};

pub mod analyzer;
pub use analyzer::{AnalysisContext, AnalyzedQuery, AnalyzerConfig, AnalyzerError, Diagnostic, DiagnosticCode};

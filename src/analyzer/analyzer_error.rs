use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::syntax::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    UnsupportedFeature,
    TableNotFound,
    RelationNotFound,
    RelationAmbiguous,
    ColumnNotFound,
    ColumnAmbiguous,
    PrimaryIndexNotFound,
    InconsistentColumns,
    InvalidAggregationColumn,
    ExceedNumberOfElements,
    InvalidUnsignedInteger,
    InvalidSortKey,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::UnsupportedFeature => "unsupported_feature",
            DiagnosticCode::TableNotFound => "table_not_found",
            DiagnosticCode::RelationNotFound => "relation_not_found",
            DiagnosticCode::RelationAmbiguous => "relation_ambiguous",
            DiagnosticCode::ColumnNotFound => "column_not_found",
            DiagnosticCode::ColumnAmbiguous => "column_ambiguous",
            DiagnosticCode::PrimaryIndexNotFound => "primary_index_not_found",
            DiagnosticCode::InconsistentColumns => "inconsistent_columns",
            DiagnosticCode::InvalidAggregationColumn => "invalid_aggregation_column",
            DiagnosticCode::ExceedNumberOfElements => "exceed_number_of_elements",
            DiagnosticCode::InvalidUnsignedInteger => "invalid_unsigned_integer",
            DiagnosticCode::InvalidSortKey => "invalid_sort_key",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first unrecoverable problem found while analyzing a statement.
/// By the time a caller sees it, the same problem is already recorded in
/// the context's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message} at {region}")]
pub struct AnalyzerError {
    pub code: DiagnosticCode,
    pub message: String,
    pub region: Region,
}

impl AnalyzerError {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, region: Region) -> Self {
        Self { code, message: message.into(), region }
    }
}

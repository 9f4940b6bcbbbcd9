use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

/// Limits and switches applied while analyzing a statement.
///
/// Every `max_*` limit is inclusive: a clause with exactly that many
/// elements is accepted, one more is reported as `exceed_number_of_elements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Elements of one SELECT list, counted as written (`*` is one element).
    pub max_select_elements: usize,
    /// Rows of one VALUES constructor.
    pub max_values_rows: usize,
    /// Columns of one row constructor.
    pub max_row_columns: usize,
    pub max_group_keys: usize,
    pub max_sort_keys: usize,
    /// Bound on nested query and table expressions (subqueries, derived
    /// tables, join trees).
    pub max_nesting_depth: usize,
    /// Bound on scalar expression depth. A left-deep `a OR b OR ...` chain
    /// is as deep as it has terms, so this is kept well above
    /// `max_nesting_depth`.
    pub max_expression_depth: usize,
    /// Keep system columns in table scans.
    pub include_system_columns: bool,
    /// Map only relations right of the pivot onto the right side of a
    /// UNION JOIN. Off by default, which maps every relation visible since
    /// the join started.
    pub union_join_strict_sides: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_select_elements: 4096,
            max_values_rows: 10_000,
            max_row_columns: 4096,
            max_group_keys: 256,
            max_sort_keys: 256,
            max_nesting_depth: 256,
            max_expression_depth: 1024,
            include_system_columns: false,
            union_join_strict_sides: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read analyzer config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid analyzer config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_json(&text)?)
    }
}

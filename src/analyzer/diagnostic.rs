use serde::Serialize;
use std::fmt;

use crate::{analyzer::{AnalyzerError, DiagnosticCode}, syntax::Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    /// Recorded, but analysis carries on.
    Warning,
}

/// One entry of the diagnostics channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub region: Region,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&Diagnostic> for AnalyzerError {
    fn from(diagnostic: &Diagnostic) -> Self {
        AnalyzerError::new(diagnostic.code, diagnostic.message.clone(), diagnostic.region)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}] {} at {}", severity, self.code, self.message, self.region)
    }
}

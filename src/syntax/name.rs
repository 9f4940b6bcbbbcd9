use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalizes an SQL identifier for lookup. Unquoted identifiers are
/// case-insensitive, so every stored and searched name goes through here.
pub fn normalize(identifier: &str) -> String {
    identifier.to_ascii_lowercase()
}

/// A possibly qualified name of a catalog object (`schema.table`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub segments: Vec<String>,
}

impl Name {
    pub fn simple(name: impl Into<String>) -> Self {
        Self { segments: vec![name.into()] }
    }

    pub fn qualified<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { segments: segments.into_iter().map(Into::into).collect() }
    }

    /// The last segment, i.e. the unqualified object name.
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn normalized(&self) -> Name {
        Name { segments: self.segments.iter().map(|s| normalize(s)).collect() }
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::qualified(value.split('.'))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A column reference as written: `name` or `qualifier.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnName {
    pub qualifier: Option<String>,
    pub name: String,
}

impl ColumnName {
    pub fn new(name: impl Into<String>) -> Self {
        Self { qualifier: None, name: name.into() }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self { qualifier: Some(qualifier.into()), name: name.into() }
    }
}

impl From<&str> for ColumnName {
    fn from(value: &str) -> Self {
        match value.split_once('.') {
            Some((qualifier, name)) => ColumnName::qualified(qualifier, name),
            None => ColumnName::new(value),
        }
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}.{}", qualifier, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

//! SQL text with its bound parameters.

use std::fmt;

use rusqlite::types::Value;
use rusqlite::ParamsFromIter;

/// SQL text using anonymous `?` placeholders plus the values bound to them,
/// in textual order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlFragment {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn push_sql(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append one `?` placeholder bound to `value`.
    pub fn push_param(&mut self, value: impl Into<Value>) -> &mut Self {
        self.sql.push('?');
        self.params.push(value.into());
        self
    }

    /// Append `(?, ?, ...)` bound to `values`.
    pub fn push_list<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.sql.push('(');
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_param(v);
        }
        self.sql.push(')');
        self
    }

    pub fn append(&mut self, other: SqlFragment) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
        self
    }

    pub fn bind(&self) -> ParamsFromIter<std::slice::Iter<'_, Value>> {
        rusqlite::params_from_iter(self.params.iter())
    }
}

/// A table the corpus queries may read ngrams from: the base `ngrams` table
/// or a session subset. Identifiers are checked on construction because
/// they are the only part of a query spliced in as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub const NGRAMS: &'static str = "ngrams";

    pub fn ngrams() -> Self {
        Self(Self::NGRAMS.to_string())
    }

    /// `None` unless `name` is a plain `[A-Za-z_][A-Za-z0-9_]*` identifier.
    pub fn new(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        (head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'))
            .then(|| Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_reject_injection() {
        assert!(TableName::new("subset_ab12").is_some());
        assert!(TableName::new("ngrams; DROP TABLE ngrams").is_none());
        assert!(TableName::new("1abc").is_none());
        assert!(TableName::new("").is_none());
    }

    #[test]
    fn list_binds_each_value() {
        let mut f = SqlFragment::new("x IN ");
        f.push_list(["a".to_string(), "b".to_string()]);
        assert_eq!(f.sql, "x IN (?, ?)");
        assert_eq!(f.params.len(), 2);
    }
}

pub mod admin;
pub mod certificate;
pub mod project;

pub use admin::Admin;
pub use certificate::{Certificate, CertificateStatus, NewCertificate};
pub use project::{NewProject, Project};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Submitted form fields, already flattened to text.
pub type Fields = HashMap<String, String>;

/// Store-assigned identifier: an integer rowid for SQLite, a document id for
/// Appwrite. Serialized bare so the public JSON matches the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

/// Rejected input, with one message per offending field.
#[derive(Debug, Clone, Default, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn field(mut self, field: &str, error: impl Into<String>) -> Self {
        self.field_errors.insert(field.to_string(), error.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// `Ok(value)` when no field error was recorded.
    pub fn or_ok<T>(self, value: T) -> Result<T, ValidationError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Trimmed field value; blank values count as absent.
pub(crate) fn optional(fields: &Fields, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a stored timestamp. Accepts RFC 3339 and SQLite's
/// `CURRENT_TIMESTAMP` form; unreadable values fall back to the epoch.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return DateTime::<Utc>::default();
    };

    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").map(|t| t.and_utc()))
        .unwrap_or_else(|_| {
            tracing::warn!("Unreadable created_at '{}', using epoch", text);
            DateTime::<Utc>::default()
        })
}

/// Timestamp format written by the stores.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_parse_in_both_forms() {
        let at = parse_timestamp(Some("2024-03-01T10:20:30.123456Z"));
        assert_eq!(format_timestamp(at), "2024-03-01T10:20:30.123456Z");

        let legacy = parse_timestamp(Some("2024-03-01 10:20:30"));
        assert_eq!(legacy.to_rfc3339(), "2024-03-01T10:20:30+00:00");

        assert_eq!(parse_timestamp(Some("yesterday")).timestamp(), 0);
        assert_eq!(parse_timestamp(None).timestamp(), 0);
    }

    #[test]
    fn record_id_serializes_bare() {
        assert_eq!(serde_json::to_string(&RecordId::Int(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&RecordId::Text("abc".into())).unwrap(), "\"abc\"");
    }

    #[test]
    fn record_id_displays_raw_value() {
        assert_eq!(RecordId::Text("65f0c1".into()).to_string(), "65f0c1");
        assert_eq!(RecordId::Int(3).to_string(), "3");
    }

    #[test]
    fn blank_fields_are_absent() {
        let mut fields = Fields::new();
        fields.insert("a".into(), "  ".into());
        fields.insert("b".into(), " x ".into());
        assert_eq!(optional(&fields, "a"), None);
        assert_eq!(optional(&fields, "b"), Some("x".to_string()));
        assert_eq!(optional(&fields, "c"), None);
    }
}

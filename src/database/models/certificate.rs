use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{optional, Fields, RecordId, ValidationError};

pub const DEFAULT_PROGRESS: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    Upcoming,
    Planned,
    Completed,
}

impl CertificateStatus {
    pub const ALL: [CertificateStatus; 4] = [
        CertificateStatus::InProgress,
        CertificateStatus::Upcoming,
        CertificateStatus::Planned,
        CertificateStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::InProgress => "In Progress",
            CertificateStatus::Upcoming => "Upcoming",
            CertificateStatus::Planned => "Planned",
            CertificateStatus::Completed => "Completed",
        }
    }
}

impl Default for CertificateStatus {
    fn default() -> Self {
        CertificateStatus::Completed
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                format!("status must be one of: {}", allowed.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: RecordId,
    pub title: String,
    pub issuer: Option<String>,
    pub issue_date: Option<String>,
    pub credential_url: Option<String>,
    pub image_url: Option<String>,
    pub status: CertificateStatus,
    pub progress_percent: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCertificate {
    pub title: String,
    pub issuer: Option<String>,
    pub issue_date: Option<String>,
    pub credential_url: Option<String>,
    pub image_url: Option<String>,
    pub status: CertificateStatus,
    pub progress_percent: i64,
}

impl NewCertificate {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new("Invalid certificate");

        let title = optional(fields, "title").unwrap_or_default();
        if title.is_empty() {
            errors = errors.field("title", "This field is required");
        }

        let status = match optional(fields, "status") {
            None => CertificateStatus::default(),
            Some(raw) => match raw.parse::<CertificateStatus>() {
                Ok(status) => status,
                Err(msg) => {
                    errors = errors.field("status", msg);
                    CertificateStatus::default()
                }
            },
        };

        let progress_percent = match optional(fields, "progress_percent") {
            None => DEFAULT_PROGRESS,
            Some(raw) => match raw.parse::<i64>() {
                Ok(value) if (0..=100).contains(&value) => value,
                Ok(_) => {
                    errors = errors.field("progress_percent", "progress_percent must be between 0 and 100");
                    DEFAULT_PROGRESS
                }
                Err(_) => {
                    errors = errors.field("progress_percent", "progress_percent must be an integer");
                    DEFAULT_PROGRESS
                }
            },
        };

        errors.or_ok(Self {
            title,
            issuer: optional(fields, "issuer"),
            issue_date: optional(fields, "issue_date"),
            credential_url: optional(fields, "credential_url"),
            image_url: None,
            status,
            progress_percent,
        })
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn status_serializes_with_display_names() {
        assert_eq!(
            serde_json::to_string(&CertificateStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!("in progress".parse::<CertificateStatus>().unwrap(), CertificateStatus::InProgress);
        assert!("Abandoned".parse::<CertificateStatus>().is_err());
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let cert = NewCertificate::from_fields(&fields(&[("title", "AWS SAA"), ("progress_percent", "")])).unwrap();
        assert_eq!(cert.status, CertificateStatus::Completed);
        assert_eq!(cert.progress_percent, 100);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = NewCertificate::from_fields(&fields(&[("title", "x"), ("status", "Dropped")])).unwrap_err();
        assert!(err.field_errors["status"].contains("In Progress"));
    }

    #[test]
    fn progress_must_be_in_range() {
        let err = NewCertificate::from_fields(&fields(&[("title", "x"), ("progress_percent", "150")])).unwrap_err();
        assert!(err.field_errors.contains_key("progress_percent"));

        let err = NewCertificate::from_fields(&fields(&[("title", "x"), ("progress_percent", "half")])).unwrap_err();
        assert!(err.field_errors.contains_key("progress_percent"));

        let ok = NewCertificate::from_fields(&fields(&[
            ("title", "x"),
            ("status", "In Progress"),
            ("progress_percent", "40"),
        ]))
        .unwrap();
        assert_eq!(ok.status, CertificateStatus::InProgress);
        assert_eq!(ok.progress_percent, 40);
    }

    #[test]
    fn every_problem_is_reported() {
        let err = NewCertificate::from_fields(&fields(&[("status", "nope"), ("progress_percent", "-1")])).unwrap_err();
        assert_eq!(err.field_errors.len(), 3);
    }
}

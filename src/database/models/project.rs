use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{optional, Fields, RecordId, ValidationError};
use crate::database::tags::{parse_tag_text, TagFormat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub title: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub tech_stack: Vec<String>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub repo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating or replacing a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub tech_stack: Vec<String>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub repo_url: Option<String>,
}

impl NewProject {
    /// Build from submitted form fields. `image_url` is left empty; the
    /// handler fills it once the upload (if any) has been stored. Tags must
    /// be storable in `tag_format`.
    pub fn from_fields(fields: &Fields, tag_format: TagFormat) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new("Invalid project");

        let title = optional(fields, "title").unwrap_or_default();
        if title.is_empty() {
            errors = errors.field("title", "This field is required");
        }

        let tech_stack = match fields.get("tech_stack").map(|text| parse_tags(text, tag_format)) {
            Some(Ok(tags)) => tags,
            Some(Err(msg)) => {
                errors = errors.field("tech_stack", msg);
                Vec::new()
            }
            None => Vec::new(),
        };

        errors.or_ok(Self {
            title,
            short_description: optional(fields, "short_description"),
            full_description: optional(fields, "full_description"),
            tech_stack,
            image_url: None,
            demo_url: optional(fields, "demo_url"),
            repo_url: optional(fields, "repo_url"),
        })
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

fn parse_tags(text: &str, tag_format: TagFormat) -> Result<Vec<String>, String> {
    let tags = parse_tag_text(text)?;
    tag_format.check(&tags)?;
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_full_project() {
        let input = NewProject::from_fields(
            &fields(&[
                ("title", " Portfolio "),
                ("short_description", "My site"),
                ("tech_stack", r#"["Rust","Axum"]"#),
                ("demo_url", "https://example.com"),
                ("repo_url", ""),
            ]),
            TagFormat::Json,
        )
        .unwrap();

        assert_eq!(input.title, "Portfolio");
        assert_eq!(input.short_description.as_deref(), Some("My site"));
        assert_eq!(input.tech_stack, vec!["Rust".to_string(), "Axum".to_string()]);
        assert_eq!(input.demo_url.as_deref(), Some("https://example.com"));
        assert_eq!(input.repo_url, None);
        assert_eq!(input.image_url, None);
    }

    #[test]
    fn title_is_required() {
        let err = NewProject::from_fields(&fields(&[("title", "   ")]), TagFormat::Json).unwrap_err();
        assert!(err.field_errors.contains_key("title"));
    }

    #[test]
    fn malformed_tag_array_is_rejected() {
        let submitted = fields(&[("title", "x"), ("tech_stack", "[1,")]);
        let err = NewProject::from_fields(&submitted, TagFormat::Json).unwrap_err();
        assert!(err.field_errors.contains_key("tech_stack"));
        assert!(!err.field_errors.contains_key("title"));
    }

    #[test]
    fn comma_tags_need_json_storage() {
        let submitted = fields(&[("title", "x"), ("tech_stack", r#"["C, C++","Rust"]"#)]);

        let err = NewProject::from_fields(&submitted, TagFormat::Csv).unwrap_err();
        assert!(err.field_errors["tech_stack"].contains("C, C++"));

        let input = NewProject::from_fields(&submitted, TagFormat::Json).unwrap();
        assert_eq!(input.tech_stack, vec!["C, C++".to_string(), "Rust".to_string()]);
    }
}

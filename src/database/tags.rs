//! Serialization of `tech_stack` tag lists.
//!
//! Tags are persisted as a single text column (SQLite) or string attribute
//! (Appwrite). The on-disk format is chosen by configuration; both formats
//! keep the submitted order.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagFormat {
    /// `["rust","axum"]`
    Json,
    /// `rust,axum`
    Csv,
}

impl TagFormat {
    pub fn encode(&self, tags: &[String]) -> String {
        match self {
            TagFormat::Json => serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string()),
            TagFormat::Csv => tags.join(","),
        }
    }

    /// Check that every tag survives `encode` then `decode` unchanged.
    /// Comma-separated storage cannot hold a tag that contains a comma.
    pub fn check(&self, tags: &[String]) -> Result<(), String> {
        match self {
            TagFormat::Json => Ok(()),
            TagFormat::Csv => match tags.iter().find(|t| t.contains(',')) {
                Some(tag) => Err(format!("tag '{}' contains a comma, which comma-separated storage cannot keep", tag)),
                None => Ok(()),
            },
        }
    }

    /// Decode a stored value. Rows written by another format are still read:
    /// anything that parses as a JSON array is taken as JSON.
    pub fn decode(&self, stored: Option<&str>) -> Vec<String> {
        match stored.map(str::trim) {
            None | Some("") => Vec::new(),
            Some(text) => parse_tag_text(text).unwrap_or_else(|_| split_csv(text)),
        }
    }
}

impl FromStr for TagFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(TagFormat::Json),
            "csv" | "comma" => Ok(TagFormat::Csv),
            other => Err(format!("unknown tag format: {}", other)),
        }
    }
}

/// Parse submitted tag text. A value starting with `[` must be a JSON array
/// of strings; anything else is comma-separated. Blank entries are dropped.
pub fn parse_tag_text(text: &str) -> Result<Vec<String>, String> {
    let text = text.trim();
    if text.starts_with('[') {
        let tags: Vec<String> = serde_json::from_str(text)
            .map_err(|e| format!("tech_stack must be a JSON array of strings: {}", e))?;
        Ok(tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect())
    } else {
        Ok(split_csv(text))
    }
}

fn split_csv(text: &str) -> Vec<String> {
    text.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn json_format_keeps_order() {
        let input = tags(&["Rust", "Axum", "SQLite"]);
        let stored = TagFormat::Json.encode(&input);
        assert_eq!(stored, r#"["Rust","Axum","SQLite"]"#);
        assert_eq!(TagFormat::Json.decode(Some(&stored)), input);
    }

    #[test]
    fn csv_format_keeps_order() {
        let input = tags(&["zeta", "alpha", "mid"]);
        let stored = TagFormat::Csv.encode(&input);
        assert_eq!(stored, "zeta,alpha,mid");
        assert_eq!(TagFormat::Csv.decode(Some(&stored)), input);
    }

    #[test]
    fn csv_rejects_tags_with_commas() {
        let input = tags(&["C, C++", "Rust"]);
        assert!(TagFormat::Csv.check(&input).unwrap_err().contains("C, C++"));
        assert!(TagFormat::Json.check(&input).is_ok());
        assert_eq!(TagFormat::Json.decode(Some(&TagFormat::Json.encode(&input))), input);
        assert!(TagFormat::Csv.check(&tags(&["C++", "Rust"])).is_ok());
    }

    #[test]
    fn decode_reads_either_format() {
        assert_eq!(TagFormat::Csv.decode(Some(r#"["a","b"]"#)), tags(&["a", "b"]));
        assert_eq!(TagFormat::Json.decode(Some("a, b")), tags(&["a", "b"]));
        assert!(TagFormat::Json.decode(None).is_empty());
        assert!(TagFormat::Json.decode(Some("  ")).is_empty());
    }

    #[test]
    fn submitted_text_parsing() {
        assert_eq!(parse_tag_text(r#"["Rust", " Go ", ""]"#).unwrap(), tags(&["Rust", "Go"]));
        assert_eq!(parse_tag_text("Rust, Go,,").unwrap(), tags(&["Rust", "Go"]));
        assert!(parse_tag_text("").unwrap().is_empty());
        assert!(parse_tag_text("[1, 2]").is_err());
    }
}

// Appwrite 1.5+ JSON query strings, sent as repeated `queries[]` parameters.

use serde_json::{json, Value};

/// Placeholder id that asks Appwrite to generate one.
pub const UNIQUE_ID: &str = "unique()";

/// Appwrite caps a single list page; the portfolio never holds more items
/// than this.
pub const PAGE_LIMIT: u32 = 100;

pub fn order_desc(attribute: &str) -> String {
    json!({ "method": "orderDesc", "attribute": attribute }).to_string()
}

pub fn order_asc(attribute: &str) -> String {
    json!({ "method": "orderAsc", "attribute": attribute }).to_string()
}

pub fn equal(attribute: &str, value: impl Into<Value>) -> String {
    json!({ "method": "equal", "attribute": attribute, "values": [value.into()] }).to_string()
}

pub fn limit(count: u32) -> String {
    json!({ "method": "limit", "values": [count] }).to_string()
}

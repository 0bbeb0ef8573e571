//! Pure field mapping from raw records to column values.
//!
//! A raw record is an untyped JSON object; any key may be absent or of an
//! unexpected type. The mapper never fails: missing or mistyped string
//! fields become the `"na"` placeholder, numeric fields become zero, and
//! list fields become an empty sequence. Primary-key columns are therefore
//! always non-null by construction. Records whose key fields all fall back
//! to the placeholder collide under the same key; that is accepted, not an
//! error.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Placeholder stored for missing or unparseable string fields.
pub const NOT_AVAILABLE: &str = "na";

/// Bind values for one `items` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub asin: String,
    pub title: String,
    pub image_url: String,
    pub categories: Vec<String>,
    pub description: String,
}

/// Bind values for one review row, shared by both review tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub reviewer_id: String,
    pub time: DateTime<Utc>,
    pub asin: String,
    pub reviewer_name: String,
    pub rating: f32,
    pub summary: String,
    pub review_text: String,
}

/// Map a raw record to an `items` row.
pub fn map_item(record: &Value) -> ItemRow {
    ItemRow {
        asin: string_or_na(record, "asin"),
        title: string_or_na(record, "title"),
        image_url: string_or_na(record, "imUrl"),
        categories: string_list(record, "categories"),
        description: string_or_na(record, "description"),
    }
}

/// Map a raw record to a review row.
///
/// The canonical review layout is the seven fields below; auxiliary source
/// fields such as `helpful` votes are not stored.
pub fn map_review(record: &Value) -> ReviewRow {
    let unix_time = record
        .get("unixReviewTime")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    ReviewRow {
        reviewer_id: string_or_na(record, "reviewerID"),
        // Seconds precision; out-of-range values fall back to epoch 0.
        time: DateTime::from_timestamp(unix_time, 0).unwrap_or_default(),
        asin: string_or_na(record, "asin"),
        reviewer_name: string_or_na(record, "reviewerName"),
        rating: record.get("overall").and_then(Value::as_f64).unwrap_or(0.0) as f32,
        summary: string_or_na(record, "summary"),
        review_text: string_or_na(record, "reviewText"),
    }
}

fn string_or_na(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Read a JSON array of scalars, preserving source order. Absent keys,
/// non-arrays, and arrays containing non-scalar elements all map to an
/// empty sequence.
fn string_list(record: &Value, key: &str) -> Vec<String> {
    let Some(Value::Array(elements)) = record.get(key) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Value::String(s) => out.push(s.clone()),
            Value::Number(n) => out.push(n.to_string()),
            Value::Bool(b) => out.push(b.to_string()),
            _ => return Vec::new(),
        }
    }

    out
}

//! Write targets for the loader.
//!
//! Each `TargetSchema` variant owns one table: its upsert statement and the
//! mapping from a raw record to that statement's bind values. A review record
//! is written twice, once per review variant, so it can be looked up by
//! either reviewer or item.

use crate::ingest::mapper::{ItemRow, ReviewRow, map_item, map_review};
use serde_json::Value;

/// Upsert for the `items` table. A repeated ASIN overwrites the prior row.
pub const INSERT_ITEM: &str = r#"INSERT INTO items (asin, title, image_url, categories, description)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (asin) DO UPDATE SET
    title = EXCLUDED.title,
    image_url = EXCLUDED.image_url,
    categories = EXCLUDED.categories,
    description = EXCLUDED.description"#;

/// Upsert for the `user_reviews` table (partitioned by reviewer).
pub const INSERT_USER_REVIEW: &str = r#"INSERT INTO user_reviews (reviewer_id, time, asin, reviewer_name, rating, summary, review_text)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (reviewer_id, time, asin) DO UPDATE SET
    reviewer_name = EXCLUDED.reviewer_name,
    rating = EXCLUDED.rating,
    summary = EXCLUDED.summary,
    review_text = EXCLUDED.review_text"#;

/// Upsert for the `item_reviews` table (partitioned by item).
pub const INSERT_ITEM_REVIEW: &str = r#"INSERT INTO item_reviews (reviewer_id, time, asin, reviewer_name, rating, summary, review_text)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (asin, time, reviewer_id) DO UPDATE SET
    reviewer_name = EXCLUDED.reviewer_name,
    rating = EXCLUDED.rating,
    summary = EXCLUDED.summary,
    review_text = EXCLUDED.review_text"#;

/// Identifies which table and column layout a record maps to.
///
/// `UserReview` and `ItemReview` read the same source record but write to
/// independently keyed tables. Adding a schema means adding a variant here
/// together with its statement and mapping; nothing else dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSchema {
    Item,
    UserReview,
    ItemReview,
}

impl TargetSchema {
    /// Name of the backing table, also used as the progress-counter label.
    pub fn table(self) -> &'static str {
        match self {
            TargetSchema::Item => "items",
            TargetSchema::UserReview => "user_reviews",
            TargetSchema::ItemReview => "item_reviews",
        }
    }

    /// The reusable parameterized upsert for this table. sqlx prepares each
    /// statement once per connection and caches it across all units.
    pub fn insert_sql(self) -> &'static str {
        match self {
            TargetSchema::Item => INSERT_ITEM,
            TargetSchema::UserReview => INSERT_USER_REVIEW,
            TargetSchema::ItemReview => INSERT_ITEM_REVIEW,
        }
    }

    /// Map a parsed record to this schema's bind values. Pure; missing or
    /// mistyped fields become placeholder values, never an error.
    pub fn map(self, record: &Value) -> MappedRow {
        match self {
            TargetSchema::Item => MappedRow::Item(map_item(record)),
            TargetSchema::UserReview | TargetSchema::ItemReview => {
                MappedRow::Review(map_review(record))
            }
        }
    }
}

/// Column values for one write, in bind order. Produced once per unit and
/// consumed immediately by the executing statement.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedRow {
    Item(ItemRow),
    Review(ReviewRow),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn review_variants_share_one_source_record() {
        let record = json!({"asin": "B1", "reviewerID": "R1"});

        let user = TargetSchema::UserReview.map(&record);
        let item = TargetSchema::ItemReview.map(&record);

        assert_eq!(user, item);
    }

    #[test]
    fn table_names_match_store_layout() {
        assert_eq!(TargetSchema::Item.table(), "items");
        assert_eq!(TargetSchema::UserReview.table(), "user_reviews");
        assert_eq!(TargetSchema::ItemReview.table(), "item_reviews");
    }
}

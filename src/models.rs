use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One catalog item as stored in the `items` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub asin: String,
    pub title: String,
    pub image_url: String,
    pub categories: Vec<String>,
    pub description: String,
}

/// One review row. The same logical review is stored twice, in
/// `user_reviews` (keyed by reviewer) and `item_reviews` (keyed by item);
/// both share this shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub time: DateTime<Utc>,
    pub asin: String,
    pub reviewer_id: String,
    pub reviewer_name: String,
    pub rating: f32,
    pub summary: String,
    pub review_text: String,
}

//! Point lookups and per-key review scans.

use crate::models::{Item, Review};
use crate::store::format::{format_item, format_review};
use sqlx::PgPool;

/// Returned by `item_display` when no row matches the requested key.
pub const NOT_EXISTS: &str = "not exists";

const QUERY_ITEM: &str =
    "SELECT asin, title, image_url, categories, description FROM items WHERE asin = $1";

// Review scans return rows in the table's natural clustering order:
// newest first, secondary key ascending.
const QUERY_USER_REVIEWS: &str = r#"SELECT time, asin, reviewer_id, reviewer_name, rating, summary, review_text
FROM user_reviews WHERE reviewer_id = $1
ORDER BY time DESC, asin ASC"#;

const QUERY_ITEM_REVIEWS: &str = r#"SELECT time, asin, reviewer_id, reviewer_name, rating, summary, review_text
FROM item_reviews WHERE asin = $1
ORDER BY time DESC, reviewer_id ASC"#;

/// Fetch one item by primary key.
pub async fn get_item(pool: &PgPool, asin: &str) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>(QUERY_ITEM)
        .bind(asin)
        .fetch_optional(pool)
        .await
}

/// Fetch one item and render it for display, or the literal `not exists`.
pub async fn item_display(pool: &PgPool, asin: &str) -> Result<String, sqlx::Error> {
    let item = get_item(pool, asin).await?;

    Ok(match item {
        Some(item) => format_item(&item),
        None => NOT_EXISTS.to_string(),
    })
}

/// All reviews written by one reviewer, rendered in clustering order.
pub async fn reviews_by_reviewer(
    pool: &PgPool,
    reviewer_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query_as::<_, Review>(QUERY_USER_REVIEWS)
        .bind(reviewer_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(format_review).collect())
}

/// All reviews of one item, rendered in clustering order.
pub async fn reviews_by_item(pool: &PgPool, asin: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query_as::<_, Review>(QUERY_ITEM_REVIEWS)
        .bind(asin)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(format_review).collect())
}

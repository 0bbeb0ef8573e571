//! Display rendering for the read path.
//!
//! The output shapes here are a compatibility surface: callers parse these
//! strings, so field order, labels, and separators must not change.

use crate::models::{Item, Review};
use std::collections::BTreeSet;

/// Render an item as a labeled multi-line block.
///
/// Categories are rendered as a deduplicated, sorted set regardless of the
/// order they were stored in.
pub fn format_item(item: &Item) -> String {
    let categories: BTreeSet<&str> = item.categories.iter().map(String::as_str).collect();
    let categories: Vec<&str> = categories.into_iter().collect();

    format!(
        "asin: {}\ntitle: {}\nimage: {}\ncategories: [{}]\ndescription: {}\n",
        item.asin,
        item.title,
        item.image_url,
        categories.join(", "),
        item.description
    )
}

/// Render a review as a single comma-separated line.
///
/// The timestamp prints at seconds precision in UTC; the rating prints as a
/// truncated integer.
pub fn format_review(review: &Review) -> String {
    format!(
        "time: {}, asin: {}, reviewerID: {}, reviewerName: {}, rating: {}, summary: {}, reviewText: {}\n",
        review.time.format("%Y-%m-%dT%H:%M:%SZ"),
        review.asin,
        review.reviewer_id,
        review.reviewer_name,
        review.rating as i32,
        review.summary,
        review.review_text
    )
}

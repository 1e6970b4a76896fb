/**
 * Item Recommendations
 *
 * Recommends active items from the categories the caller viewed most
 * recently. Categories are taken from the caller's ten latest
 * `recentViews` markers (at most five distinct ones); a caller with no
 * history gets the most popular active items of other users.
 */

use serde_json::Value;

use super::search::by_popularity;
use crate::backend::store::{query_as, Direction, DocumentStore, Filter, Query, StoreError};
use crate::shared::collections::{self, user_sub};
use crate::shared::{Item, ItemStatus, RecentView};

const RECENT_VIEWS_CONSIDERED: usize = 10;
const MAX_CATEGORIES: usize = 5;
const CANDIDATE_LIMIT: usize = 20;
const MAX_RECOMMENDATIONS: usize = 10;

/// Distinct categories in view order, most recent first
pub fn preferred_categories(views: &[RecentView]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for category in views.iter().filter_map(|v| v.category.as_deref()) {
        if categories.len() == MAX_CATEGORIES {
            break;
        }
        if !categories.iter().any(|c| c == category) {
            categories.push(category.to_string());
        }
    }
    categories
}

/// Compute recommendations for `uid`
///
/// # Arguments
///
/// * `store` - Document store
/// * `uid` - Caller; their own items are never recommended
/// * `current_item` - Item being viewed, excluded from the result
pub async fn recommend(
    store: &dyn DocumentStore,
    uid: &str,
    current_item: Option<&str>,
) -> Result<Vec<Item>, StoreError> {
    let recent = Query::collection(user_sub(uid, collections::RECENT_VIEWS))
        .order_by("timestamp", Direction::Descending)
        .limit(RECENT_VIEWS_CONSIDERED);
    let views: Vec<RecentView> = query_as(store, &recent).await?;
    let categories = preferred_categories(&views);

    let mut candidates = Query::collection(collections::ITEMS)
        .where_eq("status", ItemStatus::Active.as_str())
        .filter(Filter::NotEqual("ownerId".into(), Value::from(uid)))
        .limit(CANDIDATE_LIMIT);
    if !categories.is_empty() {
        candidates = candidates.filter(Filter::In(
            "category".into(),
            categories.into_iter().map(Value::from).collect(),
        ));
    }

    let mut items: Vec<Item> = query_as(store, &candidates).await?;
    if let Some(current) = current_item {
        items.retain(|item| item.id != current);
    }
    items.sort_by(by_popularity);
    items.truncate(MAX_RECOMMENDATIONS);

    tracing::debug!(%uid, count = items.len(), "Computed recommendations");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(item: &str, category: Option<&str>) -> RecentView {
        RecentView {
            item_id: item.into(),
            category: category.map(str::to_string),
            timestamp: None,
        }
    }

    #[test]
    fn test_preferred_categories_are_distinct_and_capped() {
        let views = vec![
            view("1", Some("books")),
            view("2", Some("books")),
            view("3", None),
            view("4", Some("toys")),
            view("5", Some("music")),
            view("6", Some("garden")),
            view("7", Some("sports")),
            view("8", Some("tools")),
        ];
        assert_eq!(
            preferred_categories(&views),
            vec!["books", "toys", "music", "garden", "sports"]
        );
        assert!(preferred_categories(&[]).is_empty());
    }
}

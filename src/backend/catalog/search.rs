/**
 * Item Search and Ranking
 *
 * Pure scoring functions used by `searchItems` and the recommendation
 * engine. Nothing here touches the store.
 *
 * # Keyword Relevance
 *
 * The query is lowercased and split on whitespace; words of two characters or
 * fewer are ignored. Each remaining keyword contributes once per field it is
 * a substring of:
 *
 * | Field       | Weight |
 * |-------------|--------|
 * | title       | 3      |
 * | description | 2      |
 * | category    | 2      |
 * | any tag     | 1      |
 *
 * Items with zero relevance are dropped.
 *
 * # Popularity
 *
 * `views * 0.1 + likes * 0.5 + offers * 0.3` plus the condition bonus
 * (new 10, like-new 8, good 5). Search results that survive the keyword pass
 * are ordered by popularity, with relevance breaking ties.
 */

use std::cmp::Ordering;

use crate::shared::Item;

/// Fields `searchItems` may sort by before ranking
pub const SORTABLE_FIELDS: [&str; 6] = ["createdAt", "price", "views", "likes", "offers", "title"];

pub fn is_sortable(field: &str) -> bool {
    SORTABLE_FIELDS.contains(&field)
}

/// Split a free-text query into lowercase keywords longer than two characters
pub fn keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Weighted keyword relevance of an item
pub fn relevance(item: &Item, keywords: &[String]) -> u32 {
    let title = item.title.to_lowercase();
    let description = item.description.to_lowercase();
    let category = item.category.to_lowercase();
    let tags: Vec<String> = item.tags.iter().map(|t| t.to_lowercase()).collect();

    keywords
        .iter()
        .map(|keyword| {
            let keyword = keyword.as_str();
            let mut score = 0;
            if title.contains(keyword) {
                score += 3;
            }
            if description.contains(keyword) {
                score += 2;
            }
            if category.contains(keyword) {
                score += 2;
            }
            if tags.iter().any(|tag| tag.contains(keyword)) {
                score += 1;
            }
            score
        })
        .sum()
}

/// Popularity score from engagement counters and condition
pub fn popularity(item: &Item) -> f64 {
    item.views as f64 * 0.1
        + item.likes as f64 * 0.5
        + item.offers as f64 * 0.3
        + item.condition.bonus()
}

/// Order by popularity, highest first
pub fn by_popularity(a: &Item, b: &Item) -> Ordering {
    popularity(b).partial_cmp(&popularity(a)).unwrap_or(Ordering::Equal)
}

/// Apply the keyword pass and rank the survivors
///
/// The sort is stable, so items that tie on both scores keep the order they
/// arrived in (the requested `sortBy` order).
pub fn rank(items: Vec<Item>, query: &str) -> Vec<Item> {
    let keywords = keywords(query);
    let mut scored: Vec<(u32, Item)> = items
        .into_iter()
        .map(|item| (relevance(&item, &keywords), item))
        .filter(|(score, _)| *score > 0)
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        by_popularity(a, b).then_with(|| score_b.cmp(score_a))
    });

    scored.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ItemCondition;
    use proptest::prelude::*;

    fn item(id: &str, title: &str) -> Item {
        Item {
            id: id.into(),
            owner_id: "owner".into(),
            title: title.into(),
            category: "misc".into(),
            price: 1500.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_keywords_skip_short_words() {
        assert_eq!(keywords("A red BIKE to go"), vec!["red", "bike"]);
        assert!(keywords("an of").is_empty());
    }

    #[test]
    fn test_relevance_weights() {
        let mut bike = item("i1", "Mountain Bike");
        bike.description = "A sturdy bike".into();
        bike.category = "bikes".into();
        bike.tags = vec!["Bike".into(), "outdoor".into()];
        assert_eq!(relevance(&bike, &keywords("bike")), 3 + 2 + 2 + 1);
        assert_eq!(relevance(&bike, &keywords("outdoor")), 1);
        assert_eq!(relevance(&bike, &keywords("guitar")), 0);
    }

    #[test]
    fn test_popularity_formula() {
        let mut listed = item("i1", "Lamp");
        listed.views = 10;
        listed.likes = 2;
        listed.offers = 5;
        listed.condition = ItemCondition::LikeNew;
        let expected = 1.0 + 1.0 + 1.5 + 8.0;
        assert!((popularity(&listed) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rank_drops_irrelevant_items() {
        let ranked = rank(vec![item("a", "Guitar"), item("b", "Bike")], "bike");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "b");
    }

    #[test]
    fn test_title_match_outranks_tag_match() {
        let titled = item("t", "Vintage Camera");
        let mut tagged = item("g", "Old Device");
        tagged.tags = vec!["camera".into()];

        let ranked = rank(vec![tagged, titled], "camera");
        let ids: Vec<_> = ranked.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["t", "g"]);
    }

    #[test]
    fn test_popularity_dominates_relevance() {
        let titled = item("t", "Camera");
        let mut popular = item("p", "Old Device");
        popular.tags = vec!["camera".into()];
        popular.likes = 40;

        let ranked = rank(vec![titled, popular], "camera");
        assert_eq!(ranked[0].id, "p");
    }

    #[test]
    fn test_sortable_fields() {
        assert!(is_sortable("createdAt"));
        assert!(is_sortable("title"));
        assert!(!is_sortable("ownerId"));
    }

    proptest! {
        #[test]
        fn prop_rank_output_is_sorted_and_relevant(
            counters in prop::collection::vec((0u64..500, 0u64..100, 0u64..50, any::<bool>()), 0..20)
        ) {
            let items: Vec<Item> = counters
                .iter()
                .enumerate()
                .map(|(i, (views, likes, offers, matches))| {
                    let mut it = item(&format!("i{i}"), if *matches { "red bike" } else { "lamp" });
                    it.views = *views;
                    it.likes = *likes;
                    it.offers = *offers;
                    it
                })
                .collect();
            let expected = counters.iter().filter(|c| c.3).count();

            let ranked = rank(items, "bike");
            prop_assert_eq!(ranked.len(), expected);
            for pair in ranked.windows(2) {
                prop_assert!(popularity(&pair[0]) >= popularity(&pair[1]));
            }
        }

        #[test]
        fn prop_relevance_is_monotonic_in_keywords(title in "[a-z ]{0,30}", extra in "[a-z]{3,8}") {
            let it = item("x", &title);
            let base = keywords(&title);
            let mut more = base.clone();
            more.push(extra);
            prop_assert!(relevance(&it, &more) >= relevance(&it, &base));
        }
    }
}

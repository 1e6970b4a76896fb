/**
 * Aggregate Statistics and Activity Feed
 *
 * Nothing here is cached or denormalized: every request counts the
 * underlying collections again.
 *
 * - **Swaps** - accepted swaps where the user is either party
 * - **Views** - `profile_view` analytics events for the user
 * - **Likes** - likes on any of the user's items
 * - **Rating** - mean of every review targeting the user
 */

use std::cmp::Reverse;

use axum::{extract::State, Json};

use super::types::{Activity, ActivityKind, UserStats};
use crate::backend::error::ApiResult;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{get_as, query_as, Direction, Query};
use crate::shared::collections;
use crate::shared::{AnalyticsEvent, AnalyticsKind, Like, Review, Swap, SwapStatus, UserProfile};

/// Size of the merged activity feed
pub const ACTIVITY_LIMIT: usize = 10;
const LIKES_IN_FEED: usize = 5;
const VIEWS_IN_FEED: usize = 5;

/// Mean rating, or 0 without reviews
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    sum / reviews.len() as f64
}

fn swap_activity(swap: Swap) -> Activity {
    let verb = match swap.status {
        SwapStatus::Accepted => "Completed swap",
        SwapStatus::Pending => "Pending swap",
        SwapStatus::Declined => "Declined swap",
    };
    Activity {
        description: format!("{verb}: {} ↔ {}", swap.item_offered_title, swap.item_requested_title),
        id: swap.id,
        kind: ActivityKind::Swap,
        timestamp: swap.created_at,
    }
}

fn like_activity(like: Like) -> Activity {
    Activity {
        description: format!("Received like on {}", like.item_title),
        id: like.id,
        kind: ActivityKind::Like,
        timestamp: like.created_at,
    }
}

fn view_activity(event: AnalyticsEvent) -> Activity {
    let viewer = event.viewer_name.as_deref().unwrap_or("Anonymous");
    Activity {
        description: format!("Profile viewed by {viewer}"),
        id: event.id,
        kind: ActivityKind::View,
        timestamp: event.timestamp,
    }
}

/// Merge activity sources newest first, keeping at most `ACTIVITY_LIMIT`
///
/// Entries without a timestamp sort last.
pub fn merge_activity(swaps: Vec<Swap>, likes: Vec<Like>, views: Vec<AnalyticsEvent>) -> Vec<Activity> {
    let mut feed: Vec<Activity> = swaps
        .into_iter()
        .map(swap_activity)
        .chain(likes.into_iter().map(like_activity))
        .chain(views.into_iter().map(view_activity))
        .collect();
    feed.sort_by_key(|activity| Reverse(activity.timestamp));
    feed.truncate(ACTIVITY_LIMIT);
    feed
}

fn profile_views(uid: &str) -> Query {
    Query::collection(collections::ANALYTICS)
        .where_eq("userId", uid)
        .where_eq("type", AnalyticsKind::ProfileView.as_str())
}

/// Counters for the caller's profile page
pub async fn get_user_stats(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<UserStats>> {
    let store = app_state.store.as_ref();
    let uid = user.uid.as_str();
    let accepted_as = |field: &str| {
        Query::collection(collections::SWAPS)
            .where_eq(field, uid)
            .where_eq("status", SwapStatus::Accepted.as_str())
    };

    let items = Query::collection(collections::ITEMS).where_eq("ownerId", uid);
    let offered = accepted_as("offeredByUserId");
    let received = accepted_as("requestedFromUserId");
    let views = profile_views(uid);
    let likes = Query::collection(collections::LIKES).where_eq("targetUserId", uid);
    let reviews = Query::collection(collections::REVIEWS).where_eq("targetUserId", uid);

    let (total_items, swaps_offered, swaps_received, total_views, total_likes, reviews, profile) =
        futures_util::try_join!(
            store.count(&items),
            store.count(&offered),
            store.count(&received),
            store.count(&views),
            store.count(&likes),
            query_as::<Review>(store, &reviews),
            get_as::<UserProfile>(store, collections::USERS, uid),
        )?;

    let (member_since, last_active) = match profile {
        Some(profile) => (profile.created_at.or(profile.last_active), profile.last_active),
        None => (None, None),
    };

    Ok(Json(UserStats {
        total_items,
        total_swaps: swaps_offered + swaps_received,
        total_views,
        total_likes,
        rating: average_rating(&reviews),
        total_reviews: reviews.len(),
        member_since,
        last_active,
    }))
}

/// Recent swaps, likes received and profile views, newest first
pub async fn get_user_activity(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Activity>>> {
    let store = app_state.store.as_ref();
    let uid = user.uid.as_str();
    let swaps_as = |field: &str| {
        Query::collection(collections::SWAPS)
            .where_eq(field, uid)
            .order_by("createdAt", Direction::Descending)
            .limit(ACTIVITY_LIMIT)
    };

    let offered = swaps_as("offeredByUserId");
    let received = swaps_as("requestedFromUserId");
    let likes = Query::collection(collections::LIKES)
        .where_eq("targetUserId", uid)
        .order_by("createdAt", Direction::Descending)
        .limit(LIKES_IN_FEED);
    let views = profile_views(uid)
        .order_by("timestamp", Direction::Descending)
        .limit(VIEWS_IN_FEED);

    let (mut swaps, received, likes, views) = futures_util::try_join!(
        query_as::<Swap>(store, &offered),
        query_as::<Swap>(store, &received),
        query_as::<Like>(store, &likes),
        query_as::<AnalyticsEvent>(store, &views),
    )?;
    swaps.extend(received);

    Ok(Json(merge_activity(swaps, likes, views)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn review(rating: u8) -> Review {
        Review {
            reviewer_id: "r".into(),
            target_user_id: "t".into(),
            rating,
            ..Default::default()
        }
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[review(5), review(4), review(3)]), 4.0);
    }

    #[test]
    fn test_activity_merges_newest_first() {
        let at = |minute: u32| Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap());
        let swap = Swap {
            id: "s1".into(),
            item_offered_title: "Bike".into(),
            item_requested_title: "Guitar".into(),
            status: SwapStatus::Accepted,
            created_at: at(1),
            ..Default::default()
        };
        let like = Like {
            id: "l1".into(),
            item_title: "Bike".into(),
            created_at: at(3),
            ..Default::default()
        };
        let mut view = AnalyticsEvent::new(AnalyticsKind::ProfileView);
        view.id = "v1".into();
        view.timestamp = at(2);
        let mut undated = AnalyticsEvent::new(AnalyticsKind::ProfileView);
        undated.id = "v2".into();
        undated.viewer_name = Some("Asha".into());

        let feed = merge_activity(vec![swap], vec![like], vec![view, undated]);
        let ids: Vec<&str> = feed.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "v1", "s1", "v2"]);
        assert_eq!(feed[2].description, "Completed swap: Bike ↔ Guitar");
        assert_eq!(feed[1].description, "Profile viewed by Anonymous");
        assert_eq!(feed[3].description, "Profile viewed by Asha");
    }

    #[test]
    fn test_activity_is_capped() {
        let likes = (0..15)
            .map(|i| Like {
                id: format!("l{i}"),
                ..Default::default()
            })
            .collect();
        assert_eq!(merge_activity(vec![], likes, vec![]).len(), ACTIVITY_LIMIT);
    }
}

//! Reviews
//!
//! Users rate each other from 1 to 5. The target's `rating` and
//! `totalRatings` are updated in the same batch as the review, guarded on the
//! review count read beforehand so concurrent reviews cannot lose an update.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::types::{SubmitReviewRequest, UserQuery};
use crate::backend::error::{ApiError, ApiResult, StoreResultExt};
use crate::backend::extract::{required, Params, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{get_as, new_document_id, query_as, Direction, Patch, Query, WriteBatch};
use crate::shared::collections;
use crate::shared::{Review, Swap, UserProfile};

const RATINGS_LIMIT: usize = 10;

/// Check a rating before it is stored
pub fn check_review(reviewer: &str, target: &str, rating: i64) -> Result<u8, ApiError> {
    if reviewer == target {
        return Err(ApiError::validation("SELF_REVIEW", "You cannot review yourself"));
    }
    match u8::try_from(rating) {
        Ok(rating @ 1..=5) => Ok(rating),
        _ => Err(ApiError::validation("INVALID_RATING", "Rating must be between 1 and 5")),
    }
}

/// Running mean after adding one rating
pub fn updated_rating(current: f64, count: u64, added: u8) -> f64 {
    (current * count as f64 + f64::from(added)) / (count + 1) as f64
}

/// Latest reviews of a user (the caller by default)
pub async fn get_user_ratings(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(query): Params<UserQuery>,
) -> ApiResult<Json<Vec<Review>>> {
    let target = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(user.uid);
    let query = Query::collection(collections::REVIEWS)
        .where_eq("targetUserId", target)
        .order_by("createdAt", Direction::Descending)
        .limit(RATINGS_LIMIT);
    Ok(Json(query_as(app_state.store.as_ref(), &query).await?))
}

/// Rate another user, optionally in the context of a swap with them
///
/// # Errors
///
/// * `400 INVALID_RATING` - Rating outside 1..=5
/// * `400 SELF_REVIEW` - The caller rated themselves
/// * `404 USER_NOT_FOUND` - The target has no profile
/// * `403 NOT_AUTHORIZED` - The swap does not involve both users
pub async fn submit_review(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<SubmitReviewRequest>,
) -> ApiResult<Json<Value>> {
    let target_id = required(request.target_user_id, "MISSING_FIELDS", "targetUserId is required")?;
    let rating = request
        .rating
        .ok_or_else(|| ApiError::validation("INVALID_RATING", "Rating must be between 1 and 5"))?;
    let rating = check_review(&user.uid, &target_id, rating)?;
    let store = app_state.store.as_ref();

    let target = get_as::<UserProfile>(store, collections::USERS, &target_id)
        .await?
        .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))?;

    if let Some(swap_id) = request.swap_id.as_deref() {
        let swap = get_as::<Swap>(store, collections::SWAPS, swap_id)
            .await?
            .ok_or_else(|| ApiError::not_found("SWAP_NOT_FOUND", "Swap not found"))?;
        if !swap.involves(&user.uid) || !swap.involves(&target_id) {
            return Err(ApiError::forbidden(
                "NOT_AUTHORIZED",
                "This swap is not between you and the reviewed user",
            ));
        }
    }

    let review = Review {
        reviewer_id: user.uid.clone(),
        target_user_id: target_id.clone(),
        rating,
        comment: request.comment.unwrap_or_default(),
        swap_id: request.swap_id,
        ..Default::default()
    };
    let review_id = new_document_id();

    let mut batch = WriteBatch::new();
    batch
        .require(collections::USERS, target_id.clone(), "totalRatings", target.total_ratings)
        .create(
            collections::REVIEWS,
            review_id.clone(),
            Patch::from_document(&review)?.server_timestamp("createdAt"),
        )
        .update(
            collections::USERS,
            target_id.clone(),
            Patch::new()
                .set("rating", updated_rating(target.rating, target.total_ratings, rating))
                .increment("totalRatings", 1),
        );
    store
        .commit(batch)
        .await
        .or_invalid_state("CONFLICT", "Another review was submitted at the same time, please retry")?;

    tracing::info!(%review_id, reviewer = %user.uid, target = %target_id, rating, "Review submitted");

    Ok(Json(json!({ "success": true, "reviewId": review_id })))
}

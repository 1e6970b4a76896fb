/**
 * Profile HTTP Handlers
 *
 * # Profile Lifecycle
 *
 * The first `createUserProfile` call writes the full document with
 * reputation defaults (`rating` 0, `trustScore` 100, `verificationStatus`
 * pending). Later calls only refresh contact fields, so reputation earned
 * through reviews and swaps is never reset.
 *
 * `deleteAccount` removes the profile, the user's items and cart in one
 * batch. Swaps, orders and deliveries that reference the user stay in place
 * as history for the other party.
 */

use axum::{extract::State, Json};
use futures_util::TryFutureExt;
use serde_json::{json, Value};

use super::types::{
    CreateProfileRequest, NotificationSettingsRequest, ProfileDetails, ProfileWriteResponse,
    SettingsRequest, UserQuery,
};
use crate::backend::auth::Identity;
use crate::backend::error::{ApiError, ApiResult, StoreResultExt};
use crate::backend::extract::{Params, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{
    get_as, new_document_id, query_json, Direction, DocumentStore, Patch, Query, StoreError,
    WriteBatch,
};
use crate::shared::collections::{self, user_sub};
use crate::shared::{
    AnalyticsEvent, AnalyticsKind, NotificationSettings, UserProfile, INITIAL_TRUST_SCORE,
};

const RECENT_LIMIT: usize = 5;

fn user_not_found() -> ApiError {
    ApiError::not_found("USER_NOT_FOUND", "User not found")
}

pub(crate) async fn load_profile(store: &dyn DocumentStore, uid: &str) -> ApiResult<UserProfile> {
    get_as::<UserProfile>(store, collections::USERS, uid)
        .await?
        .ok_or_else(user_not_found)
}

fn new_profile(identity: &Identity, request: &CreateProfileRequest) -> UserProfile {
    UserProfile {
        uid: identity.uid.clone(),
        display_name: request.display_name.clone().or_else(|| identity.name.clone()),
        email: identity.email.clone(),
        photo_url: identity.picture.clone(),
        phone_number: request.phone_number.clone(),
        address: request.address.clone(),
        preferences: Some(request.preferences.clone().unwrap_or_else(|| json!({}))),
        fcm_token: request.fcm_token.clone(),
        verification_documents: request.verification_documents.clone().unwrap_or_default(),
        verification_status: "pending".to_string(),
        trust_score: INITIAL_TRUST_SCORE,
        ..Default::default()
    }
}

/// Contact fields refreshed on every later `createUserProfile` call
fn contact_patch(identity: &Identity, request: &CreateProfileRequest) -> Patch {
    let mut patch = Patch::new();
    let display_name = request.display_name.clone().or_else(|| identity.name.clone());
    let fields = [
        ("displayName", display_name.map(Value::from)),
        ("email", identity.email.clone().map(Value::from)),
        ("photoURL", identity.picture.clone().map(Value::from)),
        ("phoneNumber", request.phone_number.clone().map(Value::from)),
        ("address", request.address.clone()),
        ("preferences", request.preferences.clone()),
        ("fcmToken", request.fcm_token.clone().map(Value::from)),
        (
            "verificationDocuments",
            request.verification_documents.clone().map(Value::from),
        ),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            patch = patch.set(field, value);
        }
    }
    patch
        .server_timestamp("lastActive")
        .server_timestamp("updatedAt")
}

/// Create the caller's profile, or refresh its contact fields
pub async fn create_user_profile(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<CreateProfileRequest>,
) -> ApiResult<Json<ProfileWriteResponse>> {
    let store = app_state.store.as_ref();
    let existing = get_as::<UserProfile>(store, collections::USERS, &user.uid).await?;

    let created = if existing.is_none() {
        let mut batch = WriteBatch::new();
        batch.create(
            collections::USERS,
            user.uid.clone(),
            Patch::from_document(&new_profile(&user, &request))?
                .server_timestamp("createdAt")
                .server_timestamp("updatedAt")
                .server_timestamp("lastActive"),
        );
        match store.commit(batch).await {
            Ok(_) => true,
            // Another request created it first; fall through to an update
            Err(StoreError::AlreadyExists { .. }) => false,
            Err(e) => return Err(e.into()),
        }
    } else {
        false
    };

    if !created {
        let mut batch = WriteBatch::new();
        batch.update(collections::USERS, user.uid.clone(), contact_patch(&user, &request));
        store.commit(batch).await.or_not_found("USER_NOT_FOUND", "User not found")?;
    }

    tracing::info!(uid = %user.uid, created, "Profile written");

    let profile = load_profile(store, &user.uid).await?;
    Ok(Json(ProfileWriteResponse {
        success: true,
        created,
        user: profile,
    }))
}

/// A profile with recent items, recent swaps and latest verification
///
/// Viewing someone else's profile records a `profile_view` event.
pub async fn get_user_profile(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(query): Params<UserQuery>,
) -> ApiResult<Json<ProfileDetails>> {
    let uid = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| user.uid.clone());
    let store = app_state.store.as_ref();

    let recent_items = Query::collection(collections::ITEMS)
        .where_eq("ownerId", uid.clone())
        .order_by("createdAt", Direction::Descending)
        .limit(RECENT_LIMIT);
    let recent_swaps = Query::collection(collections::SWAPS)
        .where_eq("offeredByUserId", uid.clone())
        .order_by("createdAt", Direction::Descending)
        .limit(RECENT_LIMIT);
    let verification = Query::collection(collections::USER_VERIFICATIONS)
        .where_eq("userId", uid.clone())
        .order_by("verifiedAt", Direction::Descending)
        .limit(1);

    let (profile, recent_items, recent_swaps, verification) = futures_util::try_join!(
        load_profile(store, &uid),
        query_json(store, &recent_items).map_err(ApiError::from),
        query_json(store, &recent_swaps).map_err(ApiError::from),
        query_json(store, &verification).map_err(ApiError::from),
    )?;

    if uid != user.uid {
        let mut event = AnalyticsEvent::new(AnalyticsKind::ProfileView);
        event.user_id = Some(uid.clone());
        event.viewer_id = Some(user.uid.clone());
        event.viewer_name = user.name.clone();

        let mut batch = WriteBatch::new();
        batch.create(
            collections::ANALYTICS,
            new_document_id(),
            Patch::from_document(&event)?.server_timestamp("timestamp"),
        );
        if let Err(e) = store.commit(batch).await {
            tracing::warn!(profile = %uid, viewer = %user.uid, "Failed to record profile view: {}", e);
        }
    }

    Ok(Json(ProfileDetails {
        profile,
        recent_items,
        recent_swaps,
        verification: verification.into_iter().next(),
    }))
}

/// Merge keys into the caller's `settings`
///
/// Keys not mentioned keep their value.
pub async fn update_settings(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<SettingsRequest>,
) -> ApiResult<Json<Value>> {
    let settings = request
        .settings
        .ok_or_else(|| ApiError::validation("INVALID_SETTINGS", "settings must be an object"))?;

    let patch = settings
        .into_iter()
        .fold(Patch::new(), |patch, (key, value)| {
            patch.set(format!("settings.{key}"), value)
        })
        .server_timestamp("updatedAt");

    let mut batch = WriteBatch::new();
    batch.update(collections::USERS, user.uid.clone(), patch);
    app_state
        .store
        .commit(batch)
        .await
        .or_not_found("USER_NOT_FOUND", "User not found")?;

    Ok(Json(json!({ "success": true })))
}

/// The caller's notification switches with defaults applied
pub async fn get_notification_settings(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<NotificationSettings>> {
    let profile = load_profile(app_state.store.as_ref(), &user.uid).await?;
    Ok(Json(profile.notification_settings()))
}

pub async fn update_notification_settings(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<NotificationSettingsRequest>,
) -> ApiResult<Json<Value>> {
    let update = request
        .settings
        .ok_or_else(|| ApiError::validation("INVALID_SETTINGS", "settings must be an object"))?;

    let Value::Object(switches) = serde_json::to_value(&update).map_err(StoreError::from)? else {
        return Err(ApiError::validation("INVALID_SETTINGS", "settings must be an object"));
    };
    let patch = switches
        .into_iter()
        .fold(Patch::new(), |patch, (key, value)| {
            patch.set(format!("settings.{key}"), value)
        })
        .server_timestamp("updatedAt");

    let mut batch = WriteBatch::new();
    batch.update(collections::USERS, user.uid.clone(), patch);
    app_state
        .store
        .commit(batch)
        .await
        .or_not_found("USER_NOT_FOUND", "User not found")?;

    Ok(Json(json!({ "success": true })))
}

/// Delete the caller's profile, items and cart
pub async fn delete_account(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Value>> {
    let store = app_state.store.as_ref();
    let cart_collection = user_sub(&user.uid, collections::CART);
    let items = Query::collection(collections::ITEMS).where_eq("ownerId", user.uid.clone());
    let cart = Query::collection(cart_collection.clone());

    let (items, cart) = futures_util::try_join!(store.query(&items), store.query(&cart))?;

    let mut batch = WriteBatch::new();
    batch.delete(collections::USERS, user.uid.clone());
    for item in &items {
        batch.delete(collections::ITEMS, item.id.clone());
    }
    for entry in &cart {
        batch.delete(cart_collection.clone(), entry.id.clone());
    }
    store.commit(batch).await?;

    tracing::info!(
        uid = %user.uid,
        items = items.len(),
        cart_entries = cart.len(),
        "Account deleted"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Account deleted successfully"
    })))
}

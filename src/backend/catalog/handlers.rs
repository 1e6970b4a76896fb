/**
 * Catalog HTTP Handlers
 *
 * Listing, editing, browsing and searching items, plus view tracking, likes
 * and recommendations.
 *
 * # Ownership
 *
 * Only the owner may update or delete an item. Both checks are repeated as a
 * batch guard on `ownerId`, so the write is rejected if the document changed
 * hands between the read and the commit.
 */

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::recommendations::recommend;
use super::search::{is_sortable, rank};
use super::types::{
    ItemDetails, ItemIdRequest, ItemQuery, ItemsQuery, LikeResponse, ListItemRequest,
    OwnerStatus, RecommendationsQuery, SearchPagination, SearchQuery, SearchResponse,
    UpdateItemRequest,
};
use crate::backend::error::{ApiError, ApiResult, StoreResultExt};
use crate::backend::extract::{required, Paging, Params, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::notifications::{NewNotification, NotificationDispatcher};
use crate::backend::server::state::AppState;
use crate::backend::store::{
    get_as, new_document_id, query_as, Direction, DocumentStore, Filter, Patch, Query,
    StoreError, WriteBatch,
};
use crate::shared::collections::{self, user_sub};
use crate::shared::{
    validate_listing, AnalyticsEvent, AnalyticsKind, Item, ItemStatus, Like, NotificationType,
    RecentView, UserProfile,
};

const DEFAULT_PAGE_SIZE: usize = 20;

fn item_not_found() -> ApiError {
    ApiError::not_found("ITEM_NOT_FOUND", "Item not found")
}

/// Load an item or fail with 404 `ITEM_NOT_FOUND`
pub(crate) async fn load_item(store: &dyn DocumentStore, item_id: &str) -> ApiResult<Item> {
    get_as::<Item>(store, collections::ITEMS, item_id)
        .await?
        .ok_or_else(item_not_found)
}

/// Load an item the caller owns
async fn load_owned_item(store: &dyn DocumentStore, item_id: &str, uid: &str) -> ApiResult<Item> {
    let item = load_item(store, item_id).await?;
    if !item.is_owned_by(uid) {
        tracing::warn!(%item_id, %uid, "Rejected change to an item owned by someone else");
        return Err(ApiError::forbidden("FORBIDDEN", "You can only modify your own items"));
    }
    Ok(item)
}

/// List a new item
///
/// # Returns
///
/// The created item including its id
///
/// # Errors
///
/// * `400 INVALID_TITLE` - Title shorter than 3 characters
/// * `400 INVALID_PRICE` - Price missing or below 1000
/// * `400 MISSING_CATEGORY` - No category
pub async fn list_item(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<ListItemRequest>,
) -> ApiResult<Json<Item>> {
    let title = request.title.unwrap_or_default();
    let price = request.price.unwrap_or(0.0);
    let category = request.category.unwrap_or_default();
    validate_listing(Some(&title), Some(price), Some(&category))?;

    let mut item = Item {
        id: String::new(),
        owner_id: user.uid.clone(),
        title: title.trim().to_string(),
        description: request.description.unwrap_or_default(),
        images: request.images,
        category,
        price,
        condition: request.condition.unwrap_or_default(),
        tags: request.tags,
        location: request.location,
        verification_required: request.verification_required,
        is_verified: false,
        verification_status: "pending".to_string(),
        status: ItemStatus::Active,
        views: 0,
        likes: 0,
        offers: 0,
        created_at: None,
        updated_at: None,
    };

    let item_id = new_document_id();
    let mut batch = WriteBatch::new();
    batch.create(
        collections::ITEMS,
        item_id.clone(),
        Patch::from_document(&item)?
            .server_timestamp("createdAt")
            .server_timestamp("updatedAt"),
    );
    let pending = NotificationDispatcher::stage(
        &mut batch,
        NewNotification::new(
            user.uid.clone(),
            NotificationType::ItemListed,
            "Item Listed Successfully",
            format!("Your item \"{}\" has been listed for ₹{}", item.title, item.price),
        )
        .item(item_id.clone(), item.title.clone()),
    )?;

    let committed_at = app_state.store.commit(batch).await?;
    app_state.notifier.deliver(&[pending]).await;

    tracing::info!(%item_id, owner = %user.uid, price = item.price, "Item listed");

    item.id = item_id;
    item.created_at = Some(committed_at);
    item.updated_at = Some(committed_at);
    Ok(Json(item))
}

/// Apply a partial update to an item the caller owns
///
/// Changed fields are validated with the listing rules.
pub async fn update_item(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<UpdateItemRequest>,
) -> ApiResult<Json<Value>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;
    validate_listing(request.title.as_deref(), request.price, request.category.as_deref())?;
    let current = load_owned_item(app_state.store.as_ref(), &item_id, &user.uid).await?;
    if request.status.is_some() && current.status == ItemStatus::Swapped {
        return Err(ApiError::invalid_state(
            "INVALID_STATUS",
            "A swapped item cannot change status",
        ));
    }

    let mut patch = Patch::new();
    if let Some(title) = request.title {
        patch = patch.set("title", title.trim());
    }
    if let Some(description) = request.description {
        patch = patch.set("description", description);
    }
    if let Some(images) = request.images {
        patch = patch.set("images", images);
    }
    if let Some(category) = request.category {
        patch = patch.set("category", category);
    }
    if let Some(price) = request.price {
        patch = patch.set("price", price);
    }
    if let Some(condition) = request.condition {
        patch = patch.set("condition", condition.as_str());
    }
    if let Some(tags) = request.tags {
        patch = patch.set("tags", tags);
    }
    if let Some(location) = request.location {
        patch = patch.set("location", location);
    }
    if let Some(verification_required) = request.verification_required {
        patch = patch.set("verificationRequired", verification_required);
    }
    if let Some(status) = request.status {
        let status = match status {
            OwnerStatus::Active => ItemStatus::Active,
            OwnerStatus::Cancelled => ItemStatus::Cancelled,
        };
        patch = patch.set("status", status.as_str());
    }

    let mut batch = WriteBatch::new();
    batch
        .require(collections::ITEMS, item_id.clone(), "ownerId", user.uid.clone())
        .update(collections::ITEMS, item_id.clone(), patch.server_timestamp("updatedAt"));
    match app_state.store.commit(batch).await {
        Ok(_) => {}
        // Deleted between the ownership check and the commit
        Err(StoreError::NotFound { .. } | StoreError::PreconditionFailed { .. }) => {
            return Err(item_not_found())
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(%item_id, owner = %user.uid, "Item updated");
    Ok(Json(json!({ "success": true })))
}

/// Delete an item the caller owns
pub async fn delete_item(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<ItemIdRequest>,
) -> ApiResult<Json<Value>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;
    load_owned_item(app_state.store.as_ref(), &item_id, &user.uid).await?;

    let mut batch = WriteBatch::new();
    batch
        .require(collections::ITEMS, item_id.clone(), "ownerId", user.uid.clone())
        .delete(collections::ITEMS, item_id.clone());
    match app_state.store.commit(batch).await {
        Ok(_) => {}
        Err(StoreError::PreconditionFailed { .. }) => return Err(item_not_found()),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(%item_id, owner = %user.uid, "Item deleted");
    Ok(Json(json!({ "success": true })))
}

/// All items, optionally restricted to one owner
pub async fn get_items(
    State(app_state): State<AppState>,
    AuthUser(_user): AuthUser,
    Params(query): Params<ItemsQuery>,
) -> ApiResult<Json<Vec<Item>>> {
    let mut listing = Query::collection(collections::ITEMS);
    if let Some(owner_id) = query.owner_id.filter(|o| !o.is_empty()) {
        listing = listing.where_eq("ownerId", owner_id);
    }
    Ok(Json(query_as(app_state.store.as_ref(), &listing).await?))
}

/// Active items the caller does not own
pub async fn get_available_items(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Item>>> {
    let listing = Query::collection(collections::ITEMS)
        .where_eq("status", ItemStatus::Active.as_str())
        .filter(Filter::NotEqual("ownerId".into(), Value::from(user.uid)));
    Ok(Json(query_as(app_state.store.as_ref(), &listing).await?))
}

/// The caller's active items, i.e. what they can offer in a swap
pub async fn get_user_items(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Item>>> {
    let listing = Query::collection(collections::ITEMS)
        .where_eq("ownerId", user.uid)
        .where_eq("status", ItemStatus::Active.as_str());
    Ok(Json(query_as(app_state.store.as_ref(), &listing).await?))
}

/// One item with its owner's display name and photo
pub async fn get_item(
    State(app_state): State<AppState>,
    AuthUser(_user): AuthUser,
    Params(query): Params<ItemQuery>,
) -> ApiResult<Json<ItemDetails>> {
    let item_id = required(query.id, "MISSING_FIELDS", "id is required")?;
    let store = app_state.store.as_ref();
    let item = load_item(store, &item_id).await?;

    let owner = match get_as::<UserProfile>(store, collections::USERS, &item.owner_id).await {
        Ok(owner) => owner,
        Err(e) => {
            tracing::warn!(owner = %item.owner_id, "Could not load item owner: {}", e);
            None
        }
    };
    let (owner_name, owner_photo) = match owner {
        Some(profile) => (
            profile.display_name.unwrap_or_else(|| "Anonymous".to_string()),
            profile.photo_url,
        ),
        None => ("Anonymous".to_string(), None),
    };

    Ok(Json(ItemDetails {
        item,
        owner_name,
        owner_photo,
    }))
}

/// Filtered, keyword-ranked and paginated search over active items
///
/// # Errors
///
/// * `400 INVALID_SORT_FIELD` - `sortBy` is not a sortable field
pub async fn search_items(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(query): Params<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let sort_by = query.sort_by.unwrap_or_else(|| "createdAt".to_string());
    if !is_sortable(&sort_by) {
        return Err(ApiError::validation(
            "INVALID_SORT_FIELD",
            format!("Cannot sort by '{sort_by}'"),
        ));
    }
    let direction = Direction::parse(query.sort_order.as_deref().unwrap_or("desc"));
    let paging = Paging::new(query.page, query.limit, DEFAULT_PAGE_SIZE);

    let mut listing = Query::collection(collections::ITEMS)
        .where_eq("status", ItemStatus::Active.as_str())
        .order_by(sort_by, direction);
    if let Some(category) = query.category.filter(|c| !c.is_empty()) {
        listing = listing.where_eq("category", category);
    }
    if let Some(min_price) = query.min_price {
        listing = listing.filter(Filter::GreaterThanOrEqual("price".into(), Value::from(min_price)));
    }
    if let Some(max_price) = query.max_price {
        listing = listing.filter(Filter::LessThanOrEqual("price".into(), Value::from(max_price)));
    }
    if let Some(condition) = query.condition {
        listing = listing.where_eq("condition", condition.as_str());
    }
    if query.verified_only {
        listing = listing.where_eq("isVerified", true);
    }

    let mut items: Vec<Item> = query_as(app_state.store.as_ref(), &listing).await?;
    items.retain(|item| !item.is_owned_by(&user.uid));
    if let Some(q) = query.q.filter(|q| !q.trim().is_empty()) {
        items = rank(items, &q);
    }

    let total = items.len();
    let page: Vec<Item> = items
        .into_iter()
        .skip(paging.offset())
        .take(paging.limit)
        .collect();

    Ok(Json(SearchResponse {
        items: page,
        pagination: SearchPagination {
            page: paging.page,
            limit: paging.limit,
            total,
            pages: paging.pages(total),
        },
    }))
}

/// Record that the caller viewed an item
///
/// The view counter, the analytics event and the caller's recent-view
/// marker are written in one batch.
pub async fn track_item_view(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<ItemIdRequest>,
) -> ApiResult<Json<Value>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;
    let item = load_item(app_state.store.as_ref(), &item_id).await?;

    let mut event = AnalyticsEvent::new(AnalyticsKind::ItemView);
    event.item_id = Some(item_id.clone());
    event.user_id = Some(user.uid.clone());

    let marker = RecentView {
        item_id: item_id.clone(),
        category: Some(item.category.clone()),
        timestamp: None,
    };

    let mut batch = WriteBatch::new();
    batch
        .update(collections::ITEMS, item_id.clone(), Patch::new().increment("views", 1))
        .create(
            collections::ANALYTICS,
            new_document_id(),
            Patch::from_document(&event)?.server_timestamp("timestamp"),
        )
        .set(
            user_sub(&user.uid, collections::RECENT_VIEWS),
            item_id.clone(),
            Patch::from_document(&marker)?.server_timestamp("timestamp"),
        );
    app_state
        .store
        .commit(batch)
        .await
        .or_not_found("ITEM_NOT_FOUND", "Item not found")?;

    Ok(Json(json!({ "success": true })))
}

/// Items the caller is likely to be interested in
pub async fn get_item_recommendations(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(query): Params<RecommendationsQuery>,
) -> ApiResult<Json<Vec<Item>>> {
    let items = recommend(app_state.store.as_ref(), &user.uid, query.item_id.as_deref()).await?;
    Ok(Json(items))
}

/// Like an item; each user counts once
pub async fn like_item(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<ItemIdRequest>,
) -> ApiResult<Json<LikeResponse>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;
    let store = app_state.store.as_ref();
    let item = load_item(store, &item_id).await?;

    let like_id = format!("{}_{}", user.uid, item_id);
    let like = Like {
        id: String::new(),
        user_id: user.uid.clone(),
        item_id: item_id.clone(),
        target_user_id: item.owner_id.clone(),
        item_title: item.title.clone(),
        created_at: None,
    };

    let mut batch = WriteBatch::new();
    batch
        .create(
            collections::LIKES,
            like_id,
            Patch::from_document(&like)?.server_timestamp("createdAt"),
        )
        .update(collections::ITEMS, item_id.clone(), Patch::new().increment("likes", 1));

    match store.commit(batch).await {
        Ok(_) => Ok(Json(LikeResponse {
            success: true,
            likes: item.likes + 1,
            created: true,
        })),
        Err(StoreError::AlreadyExists { .. }) => Ok(Json(LikeResponse {
            success: true,
            likes: item.likes,
            created: false,
        })),
        Err(StoreError::NotFound { .. }) => Err(item_not_found()),
        Err(e) => Err(e.into()),
    }
}

/**
 * API Route Table
 *
 * Every marketplace operation is mounted at `/api/<operationName>` with the
 * single method it accepts: GET for reads, POST for writes and PUT for
 * `updateDeliveryAddress`.
 *
 * # Middleware
 *
 * Auth and rate limiting are attached to each method handler with
 * `MethodRouter::route_layer`, so a request with the wrong method is
 * answered with 405 before any credential is looked at:
 *
 * ```text
 * wrong method -> 405
 * right method -> auth (401) -> rate limit (429) -> handler
 * ```
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put, MethodRouter},
    Router,
};

use crate::backend::catalog::{handlers as catalog, wishlist};
use crate::backend::deliveries::{handlers as deliveries, locations};
use crate::backend::middleware::{auth_middleware, rate_limit_middleware};
use crate::backend::notifications::handlers as notifications;
use crate::backend::orders::{cart, handlers as orders};
use crate::backend::profile::{handlers as profile, reviews, stats};
use crate::backend::server::state::AppState;
use crate::backend::swaps::handlers as swaps;

/// Put a method handler behind auth and the rate limiter
fn protected(app_state: &AppState, handler: MethodRouter<AppState>) -> MethodRouter<AppState> {
    handler
        .route_layer(from_fn_with_state(app_state.clone(), rate_limit_middleware))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware))
}

/// Configure the `/api` routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
/// * `app_state` - State handed to the auth and rate limit middleware
///
/// # Returns
///
/// Router with every API operation mounted
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let routes: Vec<(&str, MethodRouter<AppState>)> = vec![
        // Catalog
        ("listItem", post(catalog::list_item)),
        ("updateItem", post(catalog::update_item)),
        ("deleteItem", post(catalog::delete_item)),
        ("getItems", get(catalog::get_items)),
        ("getAvailableItems", get(catalog::get_available_items)),
        ("getUserItems", get(catalog::get_user_items)),
        ("getItem", get(catalog::get_item)),
        ("searchItems", get(catalog::search_items)),
        ("trackItemView", post(catalog::track_item_view)),
        ("getItemRecommendations", get(catalog::get_item_recommendations)),
        ("likeItem", post(catalog::like_item)),
        ("addToWishlist", post(wishlist::add_to_wishlist)),
        ("removeFromWishlist", post(wishlist::remove_from_wishlist)),
        ("getWishlist", get(wishlist::get_wishlist)),
        // Swaps
        ("proposeSwap", post(swaps::propose_swap)),
        ("acceptSwap", post(swaps::accept_swap)),
        ("declineSwap", post(swaps::decline_swap)),
        ("getUserSwaps", get(swaps::get_user_swaps)),
        // Orders and payments
        ("processBuyNow", post(orders::process_buy_now)),
        ("initializePayment", post(orders::initialize_payment)),
        ("verifyPayment", post(orders::verify_payment)),
        ("getPaymentStatus", get(orders::get_payment_status)),
        ("processRefund", post(orders::process_refund)),
        ("getPaymentHistory", get(orders::get_payment_history)),
        ("addToCart", post(cart::add_to_cart)),
        ("removeFromCart", post(cart::remove_from_cart)),
        ("getCart", get(cart::get_cart)),
        // Deliveries
        ("createDelivery", post(deliveries::create_delivery)),
        ("getDelivery", get(deliveries::get_delivery)),
        ("getDeliveryStatus", get(deliveries::get_delivery_status)),
        ("updateDeliveryAddress", put(deliveries::update_delivery_address)),
        ("updateDeliveryStatus", post(deliveries::update_delivery_status)),
        ("cancelDelivery", post(deliveries::cancel_delivery)),
        ("getDeliveryHistory", get(deliveries::get_delivery_history)),
        ("calculateDeliveryCost", post(deliveries::calculate_delivery_cost)),
        ("saveLocation", post(locations::save_location)),
        ("getLocations", get(locations::get_locations)),
        ("deleteLocation", post(locations::delete_location)),
        // Notifications
        ("sendNotification", post(notifications::send_notification)),
        ("getNotifications", get(notifications::get_notifications)),
        ("markNotificationRead", post(notifications::mark_notification_read)),
        ("markAllNotificationsRead", post(notifications::mark_all_notifications_read)),
        ("updateFCMToken", post(notifications::update_fcm_token)),
        ("sendEmailNotification", post(notifications::send_email_notification)),
        ("sendSMSNotification", post(notifications::send_sms_notification)),
        // Profile
        ("createUserProfile", post(profile::create_user_profile)),
        ("getUserProfile", get(profile::get_user_profile)),
        ("updateSettings", post(profile::update_settings)),
        ("deleteAccount", post(profile::delete_account)),
        ("getNotificationSettings", get(profile::get_notification_settings)),
        ("updateNotificationSettings", post(profile::update_notification_settings)),
        ("getUserStats", get(stats::get_user_stats)),
        ("getUserActivity", get(stats::get_user_activity)),
        ("getUserRatings", get(reviews::get_user_ratings)),
        ("submitReview", post(reviews::submit_review)),
    ];

    routes.into_iter().fold(router, |router, (operation, handler)| {
        router.route(&format!("/api/{operation}"), protected(app_state, handler))
    })
}

//! Marketplace Module
//!
//! Data structures for every document the backend persists:
//!
//! - `UserProfile` - A marketplace member and their preferences
//! - `Item` - A listed good available for swap or purchase
//! - `Swap` - A proposed or completed bilateral exchange
//! - `Order`, `Payment`, `Refund` - The buy-now pipeline
//! - `Delivery` - A physical hand-off tied to a swap or an order
//! - `Notification` - A per-user inbox entry
//! - `AnalyticsEvent`, `Review`, `Like`, `RecentView` - Activity records
//! - `WishlistEntry`, `CartEntry` - Per-user shopping lists
//!
//! All documents serialize with camelCase keys. Document ids are not part of
//! the stored body; they are injected when a document is read back, which is
//! why every `id` field is skipped when empty.
//!
//! # Usage
//!
//! ```rust
//! use swapin::shared::marketplace::{Item, ItemStatus, ItemCondition};
//! ```

pub mod activity;
pub mod commerce;
pub mod delivery;
pub mod item;
pub mod notification;
pub mod shopping;
pub mod swap;
pub mod user;

pub use activity::{AnalyticsEvent, AnalyticsKind, Like, RecentView, Review};
pub use commerce::{Order, OrderStatus, Payment, PaymentStatus, Refund, RefundStatus};
pub use delivery::{Delivery, DeliveryMethod, DeliveryStatus};
pub use item::{validate_listing, Item, ItemCondition, ItemStatus};
pub use notification::{Notification, NotificationPriority, NotificationType};
pub use shopping::{CartEntry, WishlistEntry};
pub use swap::{Swap, SwapStatus};
pub use user::{NotificationSettings, UserProfile, INITIAL_TRUST_SCORE};

/// Collection names used by the document store
pub mod collections {
    pub const USERS: &str = "users";
    pub const ITEMS: &str = "items";
    pub const SWAPS: &str = "swaps";
    pub const DELIVERIES: &str = "deliveries";
    pub const ORDERS: &str = "orders";
    pub const PAYMENTS: &str = "payments";
    pub const REFUNDS: &str = "refunds";
    pub const ANALYTICS: &str = "analytics";
    pub const REVIEWS: &str = "reviews";
    pub const LIKES: &str = "likes";
    pub const USER_VERIFICATIONS: &str = "userVerifications";

    pub const NOTIFICATIONS: &str = "notifications";
    pub const WISHLIST: &str = "wishlist";
    pub const CART: &str = "cart";
    pub const DELIVERY_LOCATIONS: &str = "deliveryLocations";
    pub const RECENT_VIEWS: &str = "recentViews";

    /// Path of a per-user subcollection, e.g. `users/u1/cart`
    pub fn user_sub(uid: &str, name: &str) -> String {
        format!("{USERS}/{uid}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::collections;

    #[test]
    fn test_user_subcollection_path() {
        assert_eq!(collections::user_sub("u1", collections::CART), "users/u1/cart");
        assert_eq!(
            collections::user_sub("abc", collections::NOTIFICATIONS),
            "users/abc/notifications"
        );
    }
}

//! Catalog Module
//!
//! Item listings and everything users do with them short of trading:
//! browsing, keyword search, view tracking, likes, recommendations and
//! wishlists.
//!
//! # Module Structure
//!
//! ```text
//! catalog/
//! ├── mod.rs              - Module exports and documentation
//! ├── handlers.rs         - Item endpoints
//! ├── wishlist.rs         - Wishlist endpoints
//! ├── search.rs           - Keyword relevance and popularity ranking
//! ├── recommendations.rs  - Category-based recommendations
//! └── types.rs            - Request/response types
//! ```
//!
//! # Listing Rules
//!
//! | Field    | Rule            | Code               |
//! |----------|-----------------|--------------------|
//! | title    | ≥ 3 characters  | `INVALID_TITLE`    |
//! | price    | ≥ 1000          | `INVALID_PRICE`    |
//! | category | present         | `MISSING_CATEGORY` |
//!
//! The same rules apply to the fields an update changes.

pub mod handlers;
pub mod recommendations;
pub mod search;
pub mod types;
pub mod wishlist;

pub use recommendations::recommend;
pub use search::{popularity, rank, relevance};

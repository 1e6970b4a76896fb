//! Profile Module
//!
//! User profiles, their settings, reviews and the aggregate statistics shown
//! on a profile page.
//!
//! # Module Structure
//!
//! ```text
//! profile/
//! ├── mod.rs       - Module exports and documentation
//! ├── handlers.rs  - Profile, settings and account endpoints
//! ├── reviews.rs   - Ratings between users
//! ├── stats.rs     - Statistics and activity feed
//! └── types.rs     - Request/response types
//! ```

pub mod handlers;
pub mod reviews;
pub mod stats;
pub mod types;

pub use reviews::check_review;
pub use stats::{average_rating, merge_activity};

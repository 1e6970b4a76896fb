//! Swaps Module
//!
//! Bilateral item exchanges: a user offers one of their active items for
//! someone else's, and the owner of the requested item accepts or declines.
//! Accepting marks both items `swapped` and opens one delivery per direction.
//!
//! # Module Structure
//!
//! ```text
//! swaps/
//! ├── mod.rs       - Module exports and documentation
//! ├── workflow.rs  - Pure capability and state checks
//! ├── handlers.rs  - propose/accept/decline/list endpoints
//! └── types.rs     - Request types
//! ```

pub mod handlers;
pub mod types;
pub mod workflow;

pub use workflow::{check_proposal, check_response, delivery_legs, net_amount, SwapRejection};

//! Orders Module
//!
//! Direct purchases: buy-now orders, their payments and refund requests,
//! plus the per-user cart.
//!
//! # Module Structure
//!
//! ```text
//! orders/
//! ├── mod.rs       - Module exports and documentation
//! ├── workflow.rs  - Buyer and status checks
//! ├── handlers.rs  - Order, payment and refund endpoints
//! ├── cart.rs      - Cart endpoints
//! └── types.rs     - Request/response types
//! ```

pub mod cart;
pub mod handlers;
pub mod types;
pub mod workflow;

pub use workflow::{check_payable, check_purchase, check_refundable, check_verifiable, OrderRejection};

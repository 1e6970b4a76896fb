//! Deliveries Module
//!
//! Physical hand-offs. Swap deliveries are opened by `acceptSwap` (one per
//! direction) and order deliveries by `processBuyNow` or `createDelivery`;
//! this module lets the parties follow and update them.
//!
//! # Module Structure
//!
//! ```text
//! deliveries/
//! ├── mod.rs        - Module exports and documentation
//! ├── handlers.rs   - Delivery endpoints
//! ├── locations.rs  - Saved delivery locations
//! ├── pricing.rs    - Cost quotes per shipping tier
//! └── types.rs      - Request/response types
//! ```
//!
//! # Pricing
//!
//! | Method   | Base | Days |
//! |----------|------|------|
//! | standard | 50   | 7    |
//! | premium  | 100  | 3    |
//! | express  | 150  | 1    |
//!
//! Every unit of item weight adds 10.

pub mod handlers;
pub mod locations;
pub mod pricing;
pub mod types;

pub use pricing::{quote, CostQuote};

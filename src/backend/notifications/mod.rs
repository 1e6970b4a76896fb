//! Notifications Module
//!
//! Per-user notification inbox and mobile push delivery.
//!
//! # Module Structure
//!
//! ```text
//! notifications/
//! ├── mod.rs         - Module exports and documentation
//! ├── dispatcher.rs  - Staging, persistence and push fan-out
//! ├── push.rs        - PushSender trait, logging and HTTP senders
//! ├── handlers.rs    - Inbox, device token and out-of-band endpoints
//! └── types.rs       - Request/response types
//! ```
//!
//! # Delivery Guarantees
//!
//! A notification document is written in the same batch as the change that
//! caused it. Push delivery happens after the commit and is best effort: a
//! user without a registered token, or with `settings.pushNotifications`
//! switched off, only gets the inbox entry.

pub mod dispatcher;
pub mod handlers;
pub mod push;
pub mod types;

pub use dispatcher::{NewNotification, NotificationDispatcher, PendingPush};
pub use push::{HttpPushSender, LogPushSender, PushMessage, PushSender};

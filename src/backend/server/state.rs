/**
 * Application State Management
 *
 * `AppState` is the central state container handed to every handler and
 * middleware. Every collaborator sits behind a trait object, so the same
 * router runs against PostgreSQL in production and against in-memory fakes
 * in tests.
 */

use std::sync::Arc;

use crate::backend::auth::IdentityVerifier;
use crate::backend::notifications::NotificationDispatcher;
use crate::backend::ratelimit::RateLimiter;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::DocumentStore;

/// Application state shared by all request handlers
///
/// # Fields
///
/// * `store` - Document store holding every marketplace collection
/// * `identity` - Verifies bearer credentials
/// * `rate_limiter` - Per-caller sliding window limiter
/// * `notifier` - Persists notifications and pushes them to devices
/// * `config` - Server configuration
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub notifier: NotificationDispatcher,
    pub config: Arc<ServerConfig>,
}

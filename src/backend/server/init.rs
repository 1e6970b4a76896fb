/**
 * Server Initialization
 *
 * Builds the application state from configuration and assembles the router.
 *
 * # Storage Selection
 *
 * When `DATABASE_URL` points at a reachable PostgreSQL server, documents and
 * rate-limit windows live there and are shared by every instance. Otherwise
 * both fall back to process memory, which is what local development and the
 * test suite use.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use sqlx::PgPool;

use crate::backend::auth::JwtIdentityVerifier;
use crate::backend::error::set_production;
use crate::backend::notifications::push::{HttpPushSender, LogPushSender, PushSender};
use crate::backend::notifications::NotificationDispatcher;
use crate::backend::ratelimit::{MemoryRateLimiter, PgRateLimiter, RateLimitConfig, RateLimiter};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::{DocumentStore, MemoryStore, PgDocumentStore};

/// How often expired rate-limit hits are purged
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Create and configure the Axum application
///
/// # Arguments
///
/// * `config` - Validated server configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!(environment = config.environment.as_str(), "Initializing Swapin backend server");

    set_production(config.is_production());
    if config.jwt_secret == ServerConfig::default().jwt_secret {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    let pool = load_database(config.database_url.as_deref()).await;
    let app_state = build_state(config, pool);

    let limiter = app_state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match limiter.cleanup(Utc::now()).await {
                Ok(removed) => tracing::debug!(removed, "Purged expired rate limit hits"),
                Err(e) => tracing::warn!("Rate limit cleanup failed: {}", e),
            }
        }
    });

    tracing::info!("Router configured with periodic rate limit cleanup");

    create_router(app_state)
}

/// Assemble the application state
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `pool` - PostgreSQL pool, or `None` for in-memory storage
pub fn build_state(config: ServerConfig, pool: Option<PgPool>) -> AppState {
    let limits = RateLimitConfig::per_minute(config.rate_limit_per_minute);

    let (store, rate_limiter): (Arc<dyn DocumentStore>, Arc<dyn RateLimiter>) = match pool {
        Some(pool) => {
            tracing::info!("Using PostgreSQL document store and shared rate limiter");
            (
                Arc::new(PgDocumentStore::new(pool.clone())),
                Arc::new(PgRateLimiter::new(pool, limits)),
            )
        }
        None => {
            tracing::info!("Using in-memory document store and rate limiter");
            (
                Arc::new(MemoryStore::new()),
                Arc::new(MemoryRateLimiter::new(limits)),
            )
        }
    };

    let push: Arc<dyn PushSender> = match &config.push_endpoint {
        Some(endpoint) => Arc::new(HttpPushSender::new(endpoint.clone(), config.push_server_key.clone())),
        None => Arc::new(LogPushSender),
    };

    AppState {
        notifier: NotificationDispatcher::new(store.clone(), push),
        identity: Arc::new(JwtIdentityVerifier::new(&config.jwt_secret)),
        store,
        rate_limiter,
        config: Arc::new(config),
    }
}

/**
 * Server Configuration
 *
 * Connects the optional collaborators named in [`AppConfig`]: the Postgres
 * pool and the Redis cache.
 *
 * # Error Handling
 *
 * Connection failures are logged but do not prevent server startup. A missing
 * database disables the chat API (503); a missing cache falls back to an
 * in-process [`MemoryCache`].
 */

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::backend::cache::{Cache, MemoryCache, RedisCache};
use crate::shared::config::{CacheConfig, DatabaseConfig};

/// Load and initialize the database connection pool
///
/// This function:
/// 1. Reads the database URL from configuration
/// 2. Creates a PostgreSQL connection pool
/// 3. Runs database migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is successfully configured
/// - `None` if no URL is configured or the connection fails
pub async fn load_database(config: &DatabaseConfig) -> Option<PgPool> {
    let Some(database_url) = config.url.as_deref() else {
        tracing::warn!("No database URL configured. Chat endpoints will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let mut options = PgPoolOptions::new();
    if let Some(max) = config.max_connections {
        options = options.max_connections(max);
    }

    let pool = match options.connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Chat endpoints will be disabled.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

/// Connect the notification cache
///
/// Falls back to [`MemoryCache`] when no URL is configured or Redis does not
/// answer; notifications then live only as long as the process.
pub async fn load_cache(config: &CacheConfig) -> Arc<dyn Cache> {
    let Some(url) = config.url.as_deref() else {
        tracing::warn!("No cache URL configured. Using in-memory notification cache.");
        return Arc::new(MemoryCache::new());
    };

    match RedisCache::connect(url).await {
        Ok(cache) => {
            tracing::info!("Connected to Redis");
            Arc::new(cache)
        }
        Err(e) => {
            tracing::error!("Failed to connect to Redis: {}", e);
            tracing::warn!("Using in-memory notification cache.");
            Arc::new(MemoryCache::new())
        }
    }
}

//! Redis connection pool.

use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use tracing::info;

use crate::{RedisConfig, RedisError, Result};

/// Type alias for the connection pool.
pub type RedisPool = Pool<RedisConnectionManager>;

/// Builder for creating Redis connection pools.
///
/// Credentials and the database index are folded into the connection URL,
/// so every pooled connection authenticates and selects on its own.
pub struct RedisPoolBuilder {
    config: RedisConfig,
}

impl RedisPoolBuilder {
    /// Create a new pool builder.
    pub fn new(config: RedisConfig) -> Self {
        Self { config }
    }

    /// Build the connection pool.
    pub async fn build(self) -> Result<RedisPool> {
        let url = self.config.connection_url()?;

        let manager =
            RedisConnectionManager::new(url).map_err(|e| RedisError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(self.config.pool_size)
            .min_idle(self.config.min_idle)
            .connection_timeout(self.config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| classify(e.to_string()))?;

        // Test the connection in a scope so the connection is dropped before returning pool
        {
            let mut conn = pool.get().await?;
            let _: String = redis::cmd("PING")
                .query_async(&mut *conn)
                .await
                .map_err(|e| classify(e.to_string()))?;
        }

        info!(
            pool_size = self.config.pool_size,
            url = %self.config.url,
            "Redis connection pool created"
        );

        Ok(pool)
    }
}

/// Credential rejections are start-up failures, not transient pool errors.
fn classify(message: String) -> RedisError {
    let upper = message.to_ascii_uppercase();
    if upper.contains("WRONGPASS") || upper.contains("NOAUTH") || upper.contains("AUTHENTICATION") {
        RedisError::Auth(message)
    } else {
        RedisError::Pool(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_failures() {
        assert!(matches!(
            classify("WRONGPASS invalid username-password pair".into()),
            RedisError::Auth(_)
        ));
        assert!(matches!(
            classify("NOAUTH Authentication required".into()),
            RedisError::Auth(_)
        ));
        assert!(matches!(
            classify("Connection refused".into()),
            RedisError::Pool(_)
        ));
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_pool_builds_and_pings() {
        let config = RedisConfig::builder()
            .url("redis://localhost:6379")
            .pool_size(2)
            .build();

        let pool = RedisPoolBuilder::new(config).build().await.unwrap();
        assert!(pool.state().connections >= 1);
    }
}

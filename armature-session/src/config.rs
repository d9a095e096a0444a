//! Session configuration.

use crate::codec::DEFAULT_PREFIX;
use crate::error::{SessionError, SessionResult};
use std::time::Duration;

#[cfg(feature = "redis")]
use armature_redis::RedisConfig;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Prefix prepended to every session id to form the storage key
    pub prefix: String,
    /// Fixed TTL for every saved session; overrides the cookie's `maxAge`
    pub ttl: Option<Duration>,
    /// Redis connection settings
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            ttl: None,
            #[cfg(feature = "redis")]
            redis: RedisConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Create a configuration with the defaults (`sess:` prefix, no fixed TTL).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Redis session configuration.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// # Examples
    ///
    /// ```
    /// use armature_session::SessionConfig;
    ///
    /// let config = SessionConfig::redis("redis://localhost:6379").unwrap();
    /// assert_eq!(config.prefix, "sess:");
    /// ```
    #[cfg(feature = "redis")]
    pub fn redis(url: &str) -> SessionResult<Self> {
        const SCHEMES: [&str; 4] = ["redis://", "rediss://", "redis+unix://", "unix://"];

        if !SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            return Err(SessionError::InvalidUrl(
                "Redis URL must start with redis://, rediss://, redis+unix:// or unix://"
                    .to_string(),
            ));
        }

        Ok(Self {
            redis: RedisConfig::new(url),
            ..Default::default()
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `SESSION_PREFIX` and `SESSION_TTL` (seconds), plus the
    /// `REDIS_*` variables understood by [`RedisConfig::from_env`].
    pub fn from_env() -> SessionResult<Self> {
        let mut config = Self::default();

        if let Ok(prefix) = std::env::var("SESSION_PREFIX") {
            config.prefix = prefix;
        }

        if let Ok(ttl) = std::env::var("SESSION_TTL") {
            let secs: u64 = ttl
                .parse()
                .map_err(|_| SessionError::Config(format!("SESSION_TTL is not a number: {}", ttl)))?;
            config.ttl = Some(Duration::from_secs(secs));
        }

        #[cfg(feature = "redis")]
        {
            config.redis = RedisConfig::from_env().build();
        }

        Ok(config)
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Set a fixed TTL for every saved session.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Replace the Redis connection settings.
    #[cfg(feature = "redis")]
    pub fn with_redis(mut self, redis: RedisConfig) -> Self {
        self.redis = redis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.prefix, "sess:");
        assert_eq!(config.ttl, None);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new()
            .with_prefix("myapp:")
            .with_ttl(Duration::from_secs(60));

        assert_eq!(config.prefix, "myapp:");
        assert_eq!(config.ttl, Some(Duration::from_secs(60)));
    }

    #[cfg(feature = "redis")]
    #[test]
    fn test_redis_url_validation() {
        assert!(SessionConfig::redis("redis://localhost:6379").is_ok());
        assert!(SessionConfig::redis("rediss://cache:6380").is_ok());
        assert!(SessionConfig::redis("redis+unix:///tmp/redis.sock").is_ok());

        let err = SessionConfig::redis("http://localhost").unwrap_err();
        assert!(matches!(err, SessionError::InvalidUrl(_)));
    }

    #[cfg(feature = "redis")]
    #[test]
    fn test_with_redis() {
        let redis = RedisConfig::builder().database(4).password("pw").build();
        let config = SessionConfig::new().with_redis(redis);

        assert_eq!(config.redis.database, Some(4));
        assert!(config.redis.has_credentials());
    }
}

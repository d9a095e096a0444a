//! Redis session storage implementation.

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::pool::{Connection, Connector, Pool, SingleConnectionPool};
use crate::store::PooledSessionStore;
use armature_redis::{ConnectionEvent, RedisConfig, RedisConnection, RedisPool, RedisPoolBuilder};
use async_trait::async_trait;
use bb8::PooledConnection;
use bb8_redis::RedisConnectionManager;
use redis::aio::MultiplexedConnection;
use tokio::sync::broadcast;
use tracing::error;

/// Redis-backed session store over one shared connection.
///
/// This is the mode used when no pool is configured: the connection is
/// created once and reused by every operation.
///
/// # Examples
///
/// ```no_run
/// use armature_session::{RedisSessionStore, Session, SessionConfig, SessionStore};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SessionConfig::redis("redis://localhost:6379")?
///         .with_prefix("myapp:sess:")
///         .with_ttl(Duration::from_secs(3600));
///
///     let store = RedisSessionStore::new(config).await?;
///
///     let session = Session::default().with("user_id", 123)?;
///     store.save("abc123", &session).await?;
///
///     let loaded: Option<Session> = store.load("abc123").await?;
///     assert_eq!(loaded, Some(session));
///
///     store.destroy("abc123").await?;
///     Ok(())
/// }
/// ```
pub type RedisSessionStore = PooledSessionStore<SingleConnectionPool<RedisConnection>>;

/// Redis-backed session store over a bb8 connection pool.
pub type RedisPooledSessionStore = PooledSessionStore<RedisPool>;

impl PooledSessionStore<SingleConnectionPool<RedisConnection>> {
    /// Create a store that owns a single Redis connection.
    ///
    /// Without credentials the connection is opened on first use. With
    /// credentials it is established here, so a rejected password fails
    /// start-up with [`SessionError::ConnectionSetup`] instead of surfacing
    /// on some later request.
    pub async fn new(config: SessionConfig) -> SessionResult<Self> {
        if config.redis.has_credentials() {
            let conn = RedisConnection::open(config.redis.clone())?;
            if let Err(e) = conn.connect().await {
                let err = SessionError::from(e);
                if err.is_fatal() {
                    error!(url = %config.redis.url, error = %err, "Redis session store setup rejected");
                }
                return Err(err);
            }
            return Ok(Self::with_connection(&config, conn));
        }

        Ok(Self::with_connector(
            &config,
            RedisConnector::new(config.redis.clone()),
        ))
    }

    /// Create a store around a caller-supplied connection.
    pub fn with_client(config: &SessionConfig, client: RedisConnection) -> Self {
        Self::with_connection(config, client)
    }

    /// Connect/disconnect notifications of the shared connection, once it exists.
    pub fn connection_events(&self) -> Option<broadcast::Receiver<ConnectionEvent>> {
        self.pool().connection().map(RedisConnection::subscribe)
    }
}

impl PooledSessionStore<RedisPool> {
    /// Create a store over a new bb8 pool built from `config.redis`.
    pub async fn new(config: SessionConfig) -> SessionResult<Self> {
        let pool = RedisPoolBuilder::new(config.redis.clone()).build().await?;
        Ok(Self::with_pool(&config, pool))
    }
}

/// Opens the single [`RedisConnection`] used by [`RedisSessionStore`].
///
/// Opening performs no I/O; the connection establishes its transport (and
/// runs its AUTH/SELECT handshake) on the first command.
pub struct RedisConnector {
    config: RedisConfig,
}

impl RedisConnector {
    /// Create a connector for the given settings.
    pub fn new(config: RedisConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector<RedisConnection> for RedisConnector {
    async fn connect(&self) -> SessionResult<RedisConnection> {
        Ok(RedisConnection::open(self.config.clone())?)
    }
}

#[async_trait]
impl Connection for RedisConnection {
    async fn get(&mut self, key: &str) -> SessionResult<Option<String>> {
        Ok(RedisConnection::get(self, key).await?)
    }

    async fn set_ex(&mut self, key: &str, ttl_secs: i64, value: &str) -> SessionResult<()> {
        Ok(RedisConnection::set_ex(self, key, ttl_secs, value).await?)
    }

    async fn del(&mut self, key: &str) -> SessionResult<()> {
        RedisConnection::del(self, key).await?;
        Ok(())
    }
}

#[async_trait]
impl Connection for MultiplexedConnection {
    async fn get(&mut self, key: &str) -> SessionResult<Option<String>> {
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(self).await?;
        Ok(value)
    }

    async fn set_ex(&mut self, key: &str, ttl_secs: i64, value: &str) -> SessionResult<()> {
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_secs)
            .arg(value)
            .query_async(self)
            .await?;
        Ok(())
    }

    async fn del(&mut self, key: &str) -> SessionResult<()> {
        let _: i64 = redis::cmd("DEL").arg(key).query_async(self).await?;
        Ok(())
    }
}

#[async_trait]
impl Connection for PooledConnection<'static, RedisConnectionManager> {
    async fn get(&mut self, key: &str) -> SessionResult<Option<String>> {
        Connection::get(&mut **self, key).await
    }

    async fn set_ex(&mut self, key: &str, ttl_secs: i64, value: &str) -> SessionResult<()> {
        Connection::set_ex(&mut **self, key, ttl_secs, value).await
    }

    async fn del(&mut self, key: &str) -> SessionResult<()> {
        Connection::del(&mut **self, key).await
    }
}

#[async_trait]
impl Pool for RedisPool {
    type Connection = PooledConnection<'static, RedisConnectionManager>;

    async fn acquire(&self) -> SessionResult<Self::Connection> {
        self.get_owned()
            .await
            .map_err(|e| SessionError::Pool(e.to_string()))
    }

    fn release(&self, conn: Self::Connection) {
        drop(conn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Cookie, Session, SessionStore};

    #[tokio::test]
    async fn test_store_without_credentials_connects_lazily() {
        let config = SessionConfig::redis("redis://localhost:6379").unwrap();
        let store = RedisSessionStore::new(config).await.unwrap();

        assert!(!store.pool().is_connected());
        assert!(store.connection_events().is_none());
        assert_eq!(store.prefix(), "sess:");
    }

    #[tokio::test]
    async fn test_with_client_uses_supplied_connection() {
        let config = SessionConfig::redis("redis://localhost:6379").unwrap();
        let client = RedisConnection::open(config.redis.clone()).unwrap();
        let store = RedisSessionStore::with_client(&config, client);

        assert!(store.pool().is_connected());
        assert!(store.connection_events().is_some());
    }

    #[tokio::test]
    async fn test_credentials_force_eager_connect() {
        let redis = RedisConfig::builder()
            .url("redis://127.0.0.1:1")
            .password("secret")
            .build();
        let config = SessionConfig::new().with_redis(redis);

        let err = RedisSessionStore::new(config).await.err().unwrap();
        assert!(matches!(err, SessionError::Connection(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_redis_round_trip() {
        let config = SessionConfig::redis("redis://localhost:6379")
            .unwrap()
            .with_prefix("armature:test:sess:");
        let store = RedisSessionStore::new(config).await.unwrap();

        let session = Session::new(Cookie::new().with_max_age(30000))
            .with("user", "alice")
            .unwrap();
        store.save("abc123", &session).await.unwrap();

        let loaded: Option<Session> = store.load("abc123").await.unwrap();
        assert_eq!(loaded, Some(session));

        store.destroy("abc123").await.unwrap();
        let loaded: Option<Session> = store.load("abc123").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_pooled_round_trip() {
        let config = SessionConfig::redis("redis://localhost:6379")
            .unwrap()
            .with_prefix("armature:test:pooled:");
        let store = RedisPooledSessionStore::new(config).await.unwrap();

        let session = Session::default().with("n", 1).unwrap();
        store.save("sid", &session).await.unwrap();
        assert_eq!(store.load::<Session>("sid").await.unwrap(), Some(session));
        store.destroy("sid").await.unwrap();
    }
}

//! Session store on top of a connection pool.

use crate::codec;
use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::pool::{Connection, Connector, Pool, SingleConnectionPool};
use crate::traits::{SessionData, SessionStore};
use crate::ttl::TtlPolicy;
use async_trait::async_trait;
use tracing::trace;

/// Key-value session store that borrows connections from a [`Pool`].
///
/// Each operation acquires one connection, issues one command and releases
/// the connection as soon as that command completes. Nothing is retried;
/// every failure is returned to the caller.
///
/// # Examples
///
/// ```
/// use armature_session::memory::MemoryBackend;
/// use armature_session::{PooledSessionStore, Session, SessionConfig, SessionStore};
///
/// # #[tokio::main]
/// # async fn main() -> armature_session::SessionResult<()> {
/// let store = PooledSessionStore::with_connection(&SessionConfig::new(), MemoryBackend::new());
///
/// let session = Session::default().with("user", "alice")?;
/// store.save("abc123", &session).await?;
///
/// let loaded: Option<Session> = store.load("abc123").await?;
/// assert_eq!(loaded, Some(session));
/// # Ok(())
/// # }
/// ```
pub struct PooledSessionStore<P> {
    pool: P,
    prefix: String,
    ttl: TtlPolicy,
}

impl<P: Pool> PooledSessionStore<P> {
    /// Create a store over a caller-supplied pool.
    pub fn with_pool(config: &SessionConfig, pool: P) -> Self {
        Self {
            pool,
            prefix: config.prefix.clone(),
            ttl: TtlPolicy::new(config.ttl),
        }
    }

    /// The pool connections are borrowed from.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// The key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The expiry policy applied on save.
    pub fn ttl_policy(&self) -> TtlPolicy {
        self.ttl
    }

    fn key(&self, sid: &str) -> String {
        codec::storage_key(&self.prefix, sid)
    }
}

impl<C> PooledSessionStore<SingleConnectionPool<C>>
where
    C: Connection + Clone + Sync + 'static,
{
    /// Create a store over one shared, already established connection.
    pub fn with_connection(config: &SessionConfig, conn: C) -> Self {
        Self::with_pool(config, SingleConnectionPool::with_connection(conn))
    }

    /// Create a store whose single connection is opened on first use.
    pub fn with_connector(config: &SessionConfig, connector: impl Connector<C> + 'static) -> Self {
        Self::with_pool(config, SingleConnectionPool::lazy(connector))
    }
}

#[async_trait]
impl<P: Pool> SessionStore for PooledSessionStore<P> {
    async fn load<S: SessionData>(&self, sid: &str) -> SessionResult<Option<S>> {
        let key = self.key(sid);
        trace!(command = "GET", key = %key, "Loading session");

        let mut conn = self.pool.acquire().await?;
        let data = conn.get(&key).await;
        self.pool.release(conn);

        match data? {
            Some(data) if !data.is_empty() => {
                trace!(key = %key, data = %data, "GOT session");
                codec::decode(&data).map(Some)
            }
            _ => Ok(None),
        }
    }

    async fn save<S: SessionData>(&self, sid: &str, session: &S) -> SessionResult<()> {
        let key = self.key(sid);
        let ttl = self.ttl.expiry_secs(session.cookie_max_age());
        let data = codec::encode(session)?;
        trace!(command = "SETEX", key = %key, ttl = ttl, data = %data, "Saving session");

        let mut conn = self.pool.acquire().await?;
        let result = conn.set_ex(&key, ttl, &data).await;
        self.pool.release(conn);

        result?;
        trace!(key = %key, "SETEX complete");
        Ok(())
    }

    async fn destroy(&self, sid: &str) -> SessionResult<()> {
        let key = self.key(sid);
        trace!(command = "DEL", key = %key, "Destroying session");

        let mut conn = self.pool.acquire().await?;
        let result = conn.del(&key).await;
        self.pool.release(conn);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::traits::{Cookie, Session};
    use std::time::Duration;

    fn store(config: SessionConfig) -> (PooledSessionStore<SingleConnectionPool<MemoryBackend>>, MemoryBackend) {
        let backend = MemoryBackend::new();
        (PooledSessionStore::with_connection(&config, backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_keys_use_prefix() {
        let (store, backend) = store(SessionConfig::new().with_prefix("app:"));
        store.save("abc", &Session::default()).await.unwrap();

        assert!(backend.raw("app:abc").is_some());
        assert!(backend.raw("sess:abc").is_none());
        assert_eq!(store.prefix(), "app:");
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_overrides_cookie() {
        let (store, backend) = store(SessionConfig::new().with_ttl(Duration::from_secs(60)));
        let session = Session::new(Cookie::new().with_max_age(5000));
        store.save("sid", &session).await.unwrap();

        assert_eq!(backend.ttl("sess:sid"), Some(Duration::from_secs(60)));
        assert_eq!(store.ttl_policy().fixed(), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_empty_value_is_no_session() {
        let (store, backend) = store(SessionConfig::new());
        backend.insert_raw("sess:blank", "", Duration::from_secs(60));

        let loaded: Option<Session> = store.load("blank").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_destroy_missing_is_ok() {
        let (store, backend) = store(SessionConfig::new());
        store.destroy("never-written").await.unwrap();
        assert_eq!(backend.command_count(), 1);
    }

    #[tokio::test]
    async fn test_regenerate_drops_old_entry() {
        let (store, backend) = store(SessionConfig::new());
        store.save("old", &Session::default()).await.unwrap();

        let fresh = store.regenerate("old").await.unwrap();

        assert_ne!(fresh, "old");
        assert!(backend.raw("sess:old").is_none());
    }
}

//! Connection pool abstraction.
//!
//! The store only ever talks to a [`Pool`]: it acquires a connection, runs
//! one command and releases it. When no real pool is configured a
//! [`SingleConnectionPool`] wraps one shared connection behind the same
//! interface, so the store never branches on how it was configured.

use crate::error::{SessionError, SessionResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// The key-value commands the store needs from a backend connection.
#[async_trait]
pub trait Connection: Send {
    /// Fetch the value stored under `key`.
    async fn get(&mut self, key: &str) -> SessionResult<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl_secs` seconds.
    async fn set_ex(&mut self, key: &str, ttl_secs: i64, value: &str) -> SessionResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn del(&mut self, key: &str) -> SessionResult<()>;
}

/// Hands out and takes back backend connections.
#[async_trait]
pub trait Pool: Send + Sync {
    /// Connection type handed out by this pool.
    type Connection: Connection;

    /// Check out a connection.
    async fn acquire(&self) -> SessionResult<Self::Connection>;

    /// Return a connection. Must not fail.
    fn release(&self, conn: Self::Connection);
}

/// Creates the connection behind a [`SingleConnectionPool`].
#[async_trait]
pub trait Connector<C>: Send + Sync {
    /// Establish a new connection.
    async fn connect(&self) -> SessionResult<C>;
}

/// A pool of exactly one shared connection.
///
/// The connection is created on first use and never again; every `acquire`
/// returns a clone of it, so concurrent borrowers share the same underlying
/// connection. `release` does nothing.
pub struct SingleConnectionPool<C> {
    conn: OnceCell<C>,
    connector: Option<Arc<dyn Connector<C>>>,
}

impl<C> SingleConnectionPool<C>
where
    C: Connection + Clone + Sync + 'static,
{
    /// Pool that creates its connection lazily through `connector`.
    pub fn lazy(connector: impl Connector<C> + 'static) -> Self {
        Self {
            conn: OnceCell::new(),
            connector: Some(Arc::new(connector)),
        }
    }

    /// Pool around an already established connection.
    pub fn with_connection(conn: C) -> Self {
        Self {
            conn: OnceCell::new_with(Some(conn)),
            connector: None,
        }
    }

    /// Whether the connection has been created yet.
    pub fn is_connected(&self) -> bool {
        self.conn.initialized()
    }

    /// The shared connection, if created.
    pub fn connection(&self) -> Option<&C> {
        self.conn.get()
    }

    async fn create(&self) -> SessionResult<C> {
        match &self.connector {
            Some(connector) => connector.connect().await,
            None => Err(SessionError::Connection(
                "no connection or connector configured".to_string(),
            )),
        }
    }
}

#[async_trait]
impl<C> Pool for SingleConnectionPool<C>
where
    C: Connection + Clone + Sync + 'static,
{
    type Connection = C;

    async fn acquire(&self) -> SessionResult<C> {
        self.conn
            .get_or_try_init(|| self.create())
            .await
            .cloned()
    }

    fn release(&self, _conn: C) {}
}

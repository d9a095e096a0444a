//! Single persistent Redis connection.
//!
//! The transport is established lazily and re-established after it drops.
//! Every (re)connect runs the same handshake: AUTH when a password is
//! configured, then SELECT of the configured database. Commands are refused
//! while the connection is not ready, except during the handshake, which
//! raises the per-connection `send_anyway` flag for the SELECT and lowers it
//! again afterwards.

use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use redis::{Cmd, FromRedisValue};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{RedisConfig, RedisError, Result};

/// Lifecycle notifications emitted by a [`RedisConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Transport established and handshake completed.
    Connected,
    /// Transport dropped; the next command reconnects.
    Disconnected,
}

/// A cloneable handle to one logical Redis connection.
///
/// Clones share the same multiplexed transport, so any number of callers may
/// borrow it concurrently; commands are pipelined by the transport.
#[derive(Clone)]
pub struct RedisConnection {
    inner: Arc<Inner>,
}

struct Inner {
    client: redis::Client,
    config: RedisConfig,
    transport: Mutex<Option<MultiplexedConnection>>,
    connecting: tokio::sync::Mutex<()>,
    ready: AtomicBool,
    send_anyway: AtomicBool,
    events: broadcast::Sender<ConnectionEvent>,
}

impl RedisConnection {
    /// Create a connection handle. No network I/O happens until the first
    /// command or an explicit [`connect`](Self::connect).
    pub fn open(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| RedisError::Connection(e.to_string()))?;
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                config,
                transport: Mutex::new(None),
                connecting: tokio::sync::Mutex::new(()),
                ready: AtomicBool::new(false),
                send_anyway: AtomicBool::new(false),
                events,
            }),
        })
    }

    /// The configuration this connection was opened with.
    pub fn config(&self) -> &RedisConfig {
        &self.inner.config
    }

    /// Whether the handshake has completed on the current transport.
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    /// Subscribe to connect/disconnect notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.inner.events.subscribe()
    }

    /// Establish the transport and run the handshake if not already ready.
    ///
    /// Authentication failures are reported as [`RedisError::Auth`].
    pub async fn connect(&self) -> Result<()> {
        let _guard = self.inner.connecting.lock().await;
        if self.is_ready() {
            return Ok(());
        }

        let conn = timeout(
            self.inner.config.connection_timeout,
            self.inner.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| RedisError::Timeout)?
        .map_err(|e| RedisError::Connection(e.to_string()))?;

        *self.inner.transport.lock() = Some(conn);
        debug!(url = %self.inner.config.url, "Redis transport established");

        if let Err(e) = self.authenticate().await {
            self.inner.transport.lock().take();
            return Err(e);
        }
        self.on_connect().await?;

        self.inner.ready.store(true, Ordering::SeqCst);
        let _ = self.inner.events.send(ConnectionEvent::Connected);
        Ok(())
    }

    /// Run a command, reconnecting first if the transport is down.
    ///
    /// A command that fails because the transport dropped is not retried.
    pub async fn query<T: FromRedisValue + Send>(&self, cmd: &Cmd) -> Result<T> {
        if !self.is_ready() {
            self.connect().await?;
        }
        self.dispatch(cmd).await
    }

    /// GET `key`.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query(&cmd).await
    }

    /// SETEX `key` `ttl_secs` `value`.
    pub async fn set_ex(&self, key: &str, ttl_secs: i64, value: &str) -> Result<()> {
        let mut cmd = redis::cmd("SETEX");
        cmd.arg(key).arg(ttl_secs).arg(value);
        self.query(&cmd).await
    }

    /// DEL `key`, returning the number of keys removed.
    pub async fn del(&self, key: &str) -> Result<u64> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        self.query(&cmd).await
    }

    async fn authenticate(&self) -> Result<()> {
        let Some(password) = &self.inner.config.password else {
            return Ok(());
        };

        let mut cmd = redis::cmd("AUTH");
        if let Some(username) = &self.inner.config.username {
            cmd.arg(username);
        }
        cmd.arg(password);

        let mut conn = self.transport()?;
        cmd.query_async::<()>(&mut conn)
            .await
            .map_err(|e| RedisError::Auth(e.to_string()))
    }

    /// Re-select the configured database on the fresh transport.
    async fn on_connect(&self) -> Result<()> {
        let Some(db) = self.inner.config.database else {
            return Ok(());
        };
        debug!(database = db, "Selecting Redis database");

        let mut cmd = redis::cmd("SELECT");
        cmd.arg(db);

        self.inner.send_anyway.store(true, Ordering::SeqCst);
        let result = self.dispatch::<()>(&cmd).await;
        self.inner.send_anyway.store(false, Ordering::SeqCst);
        result
    }

    fn admit(&self) -> Result<()> {
        if self.is_ready() || self.inner.send_anyway.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RedisError::NotReady)
        }
    }

    fn transport(&self) -> Result<MultiplexedConnection> {
        self.inner.transport.lock().clone().ok_or(RedisError::NotReady)
    }

    async fn dispatch<T: FromRedisValue + Send>(&self, cmd: &Cmd) -> Result<T> {
        self.admit()?;
        let mut conn = self.transport()?;

        match timeout(self.inner.config.command_timeout, cmd.query_async::<T>(&mut conn)).await {
            Err(_) => Err(RedisError::Timeout),
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = RedisError::from(e);
                if err.is_connection_error() {
                    self.mark_disconnected();
                }
                Err(err)
            }
        }
    }

    fn mark_disconnected(&self) {
        if self.inner.ready.swap(false, Ordering::SeqCst) {
            warn!(url = %self.inner.config.url, "Redis transport dropped");
            self.inner.transport.lock().take();
            let _ = self.inner.events.send(ConnectionEvent::Disconnected);
        }
    }
}

impl fmt::Debug for RedisConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConnection")
            .field("url", &self.inner.config.url)
            .field("ready", &self.is_ready())
            .finish()
    }
}

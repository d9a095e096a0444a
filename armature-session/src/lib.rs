//! Session storage for Armature framework.
//!
//! Persists opaque session state in a key-value store with per-entry
//! expiry. Session middleware drives the store through three operations,
//! all keyed by a session id: [`SessionStore::load`], [`SessionStore::save`]
//! and [`SessionStore::destroy`].
//!
//! # How it works
//!
//! - Every session lives under `prefix + sid` (prefix defaults to `sess:`).
//! - Sessions are stored as JSON. A value that fails to parse is reported as
//!   [`SessionError::Deserialization`]; a session that fails to encode is
//!   reported as [`SessionError::Serialization`] before any command is sent.
//! - Each save attaches a TTL: the store-level `ttl` if configured, otherwise
//!   the cookie's `maxAge` in whole seconds, otherwise one day. Expiry itself
//!   is left to the backend.
//! - Connections come from a [`Pool`]. Without a configured pool, a
//!   [`SingleConnectionPool`] shares one lazily created connection between
//!   all operations.
//!
//! # Features
//!
//! - `redis` - Redis backend (enabled by default)
//!
//! # Examples
//!
//! ## Redis Session Store (Default)
//!
//! ```no_run
//! use armature_session::*;
//! use armature_redis::RedisConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SessionError> {
//!     let redis = RedisConfig::builder()
//!         .host("localhost", 6379)
//!         .password("secret")
//!         .database(2)
//!         .build();
//!     let config = SessionConfig::new().with_redis(redis);
//!
//!     // Fails here if the password is rejected
//!     let store = RedisSessionStore::new(config).await?;
//!
//!     let sid = generate_session_id();
//!     let session = Session::new(Cookie::new().with_max_age(30_000)).with("user", "alice")?;
//!     store.save(&sid, &session).await?;
//!
//!     let loaded: Option<Session> = store.load(&sid).await?;
//!     assert_eq!(loaded.and_then(|s| s.get::<String>("user")), Some("alice".into()));
//!
//!     store.destroy(&sid).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pooled Redis Session Store
//!
//! ```no_run
//! use armature_session::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SessionError> {
//!     let config = SessionConfig::redis("redis://localhost:6379")?;
//!     let store = RedisPooledSessionStore::new(config).await?;
//!
//!     let missing: Option<Session> = store.load("unknown").await?;
//!     assert!(missing.is_none());
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod memory;
pub mod pool;
pub mod store;
pub mod traits;
pub mod ttl;

#[cfg(feature = "redis")]
pub mod redis_session;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use pool::{Connection, Connector, Pool, SingleConnectionPool};
pub use store::PooledSessionStore;
pub use traits::{Cookie, Session, SessionData, SessionStore, generate_session_id};
pub use ttl::{DEFAULT_TTL_SECS, TtlPolicy};

#[cfg(feature = "redis")]
pub use redis_session::{RedisConnector, RedisPooledSessionStore, RedisSessionStore};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SessionConfig;
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::pool::{Connection, Connector, Pool, SingleConnectionPool};
    pub use crate::store::PooledSessionStore;
    pub use crate::traits::{Cookie, Session, SessionData, SessionStore, generate_session_id};

    #[cfg(feature = "redis")]
    pub use crate::redis_session::{RedisPooledSessionStore, RedisSessionStore};
}

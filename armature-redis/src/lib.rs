//! # Armature Redis
//!
//! Redis transport used by Armature's session storage.
//!
//! ## Features
//!
//! - **Single connection**: [`RedisConnection`], one lazily established,
//!   self-healing multiplexed connection with an AUTH/SELECT handshake on
//!   every (re)connect
//! - **Connection Pooling**: [`RedisPool`] built with bb8
//! - **Configuration**: builder and environment loading via [`RedisConfig`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armature_redis::{RedisConfig, RedisConnection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RedisConfig::builder()
//!         .host("localhost", 6379)
//!         .password("secret")
//!         .database(2)
//!         .build();
//!
//!     let conn = RedisConnection::open(config)?;
//!     conn.set_ex("greeting", 60, "hello").await?;
//!     assert_eq!(conn.get("greeting").await?, Some("hello".to_string()));
//!
//!     Ok(())
//! }
//! ```

mod config;
mod connection;
mod error;
mod pool;

pub use config::{RedisConfig, RedisConfigBuilder};
pub use connection::{ConnectionEvent, RedisConnection};
pub use error::{RedisError, Result};
pub use pool::{RedisPool, RedisPoolBuilder};

// Re-export redis crate for convenience
pub use redis;

/// Prelude for common imports.
///
/// ```
/// use armature_redis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{RedisConfig, RedisConfigBuilder};
    pub use crate::connection::{ConnectionEvent, RedisConnection};
    pub use crate::error::{RedisError, Result};
    pub use crate::pool::{RedisPool, RedisPoolBuilder};
}

//! In-memory key-value backend
//!
//! Uses DashMap for thread-safe concurrent access and expires entries the
//! way Redis does: an entry whose TTL has elapsed is gone. Suitable for
//! single-instance development and testing. For shared deployments, use the
//! Redis backend.

use crate::error::{SessionError, SessionResult};
use crate::pool::Connection;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Shared in-memory store; clones see the same entries.
///
/// Every GET/SETEX/DEL counts as one command, which lets callers assert how
/// much traffic an operation produced.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<DashMap<String, Entry>>,
    commands: Arc<AtomicUsize>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands executed so far.
    pub fn command_count(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        self.entries.len()
    }

    /// Whether no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining lifetime of `key`, if it is live.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.live(key)
            .map(|entry| entry.expires_at.saturating_duration_since(Instant::now()))
    }

    /// Stored value of `key`, if it is live. Not counted as a command.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.live(key).map(|entry| entry.value)
    }

    /// Write a value directly, bypassing command accounting.
    ///
    /// A `ttl` too large to represent keeps the entry for as long as the
    /// clock allows.
    pub fn insert_raw(&self, key: &str, value: &str, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(u32::MAX as u64));
        self.put(key, value, expires_at);
    }

    fn put(&self, key: &str, value: &str, expires_at: Instant) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    fn live(&self, key: &str) -> Option<Entry> {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        self.entries.get(key).map(|entry| entry.clone())
    }

    fn count(&self) {
        self.commands.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for MemoryBackend {
    async fn get(&mut self, key: &str) -> SessionResult<Option<String>> {
        self.count();
        trace!(key = %key, "Memory GET");
        Ok(self.live(key).map(|entry| entry.value))
    }

    async fn set_ex(&mut self, key: &str, ttl_secs: i64, value: &str) -> SessionResult<()> {
        self.count();
        trace!(key = %key, ttl = ttl_secs, "Memory SETEX");

        let expires_at = u64::try_from(ttl_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)))
            .ok_or_else(|| SessionError::backend("ERR invalid expire time in 'setex' command"))?;

        self.put(key, value, expires_at);
        Ok(())
    }

    async fn del(&mut self, key: &str) -> SessionResult<()> {
        self.count();
        trace!(key = %key, "Memory DEL");
        self.entries.remove(key);
        Ok(())
    }
}

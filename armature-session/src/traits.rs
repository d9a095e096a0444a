//! Session data and the store capability consumed by session middleware.

use crate::error::{SessionError, SessionResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session cookie settings.
///
/// Kept as an opaque map so that fields the store never reads (`expires`,
/// `httpOnly`, `path`, ...) survive a round trip untouched. Only `maxAge`
/// (milliseconds) is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cookie(Map<String, Value>);

impl Cookie {
    /// Create an empty cookie (no explicit expiry).
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookie lifetime in milliseconds, if `maxAge` holds a number.
    pub fn max_age(&self) -> Option<f64> {
        self.0.get("maxAge").and_then(Value::as_f64)
    }

    /// Set or clear `maxAge` (milliseconds).
    pub fn set_max_age(&mut self, max_age_ms: Option<i64>) {
        match max_age_ms {
            Some(ms) => self.0.insert("maxAge".to_string(), Value::from(ms)),
            None => self.0.insert("maxAge".to_string(), Value::Null),
        };
    }

    /// Builder form of [`set_max_age`](Self::set_max_age).
    pub fn with_max_age(mut self, max_age_ms: i64) -> Self {
        self.set_max_age(Some(max_age_ms));
        self
    }

    /// Raw access to any cookie field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set any cookie field.
    pub fn insert(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }
}

/// Session state as handed over by the middleware.
///
/// Everything besides `cookie` is opaque application data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Cookie settings
    pub cookie: Cookie,
    /// Application data as key-value pairs
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Session {
    /// Create an empty session with the given cookie.
    pub fn new(cookie: Cookie) -> Self {
        Self {
            cookie,
            data: Map::new(),
        }
    }

    /// Get a value from the session data.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the session data.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> SessionResult<()> {
        let json_value = serde_json::to_value(value).map_err(SessionError::Serialization)?;
        self.data.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Builder form of [`set`](Self::set).
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> SessionResult<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Remove a value from the session data.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Check if a key exists in the session data.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

/// Anything the store can persist as a session.
///
/// The store reads nothing but the cookie lifetime; the rest only has to
/// go through serde.
pub trait SessionData: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// `cookie.maxAge` in milliseconds, when it is a number.
    fn cookie_max_age(&self) -> Option<f64>;
}

impl SessionData for Session {
    fn cookie_max_age(&self) -> Option<f64> {
        self.cookie.max_age()
    }
}

impl SessionData for Value {
    fn cookie_max_age(&self) -> Option<f64> {
        self.pointer("/cookie/maxAge").and_then(Value::as_f64)
    }
}

/// Store capability required by session middleware.
///
/// Implementors provide `load`, `save` and `destroy`; behavior shared by all
/// stores is provided on top of those.
///
/// # Examples
///
/// ```ignore
/// use armature_session::{Session, SessionStore, SessionResult};
///
/// async fn example(store: &impl SessionStore, sid: &str) -> SessionResult<()> {
///     let session: Option<Session> = store.load(sid).await?;
///     if let Some(mut session) = session {
///         session.set("visits", 2)?;
///         store.save(sid, &session).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session.
    ///
    /// Returns `Ok(None)` when nothing (or an expired entry) is stored under `sid`.
    async fn load<S: SessionData>(&self, sid: &str) -> SessionResult<Option<S>>;

    /// Persist a session, replacing whatever is stored under `sid`.
    async fn save<S: SessionData>(&self, sid: &str, session: &S) -> SessionResult<()>;

    /// Remove a session. Succeeds whether or not it existed.
    async fn destroy(&self, sid: &str) -> SessionResult<()>;

    /// Drop the session stored under `sid` and hand out a fresh identifier.
    async fn regenerate(&self, sid: &str) -> SessionResult<String> {
        self.destroy(sid).await?;
        Ok(generate_session_id())
    }
}

/// Generate a new unique session ID.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

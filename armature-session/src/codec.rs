//! Storage key derivation and session (de)serialization.

use crate::error::{SessionError, SessionResult};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Default prefix prepended to every session id.
pub const DEFAULT_PREFIX: &str = "sess:";

/// Build the storage key for `sid`.
///
/// The id is concatenated verbatim; it is not validated or escaped.
pub fn storage_key(prefix: &str, sid: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + sid.len());
    key.push_str(prefix);
    key.push_str(sid);
    key
}

/// Serialize a session to its stored JSON form.
pub fn encode<S: Serialize>(session: &S) -> SessionResult<String> {
    serde_json::to_string(session).map_err(SessionError::Serialization)
}

/// Parse a stored value back into a session.
pub fn decode<S: DeserializeOwned>(data: &str) -> SessionResult<S> {
    serde_json::from_str(data).map_err(SessionError::Deserialization)
}

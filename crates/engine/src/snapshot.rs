//! Persisted form of a [`SessionStore`].
//!
//! ```json
//! { "sessions": [ { "id": 42, "expire": 1767225600, "transactions": [ ... ] } ] }
//! ```
//!
//! [`SessionStore`]: crate::SessionStore

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{ResultEngine, sessions::ConversationId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<R> {
    #[serde(default = "Vec::new")]
    pub sessions: Vec<SessionSnapshot<R>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot<R> {
    pub id: ConversationId,
    /// Unix timestamp (seconds) after which the session is expired.
    pub expire: i64,
    #[serde(default = "Vec::new")]
    pub transactions: Vec<R>,
}

impl<R> Default for Snapshot<R> {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }
}

impl<R: Serialize> Snapshot<R> {
    pub fn encode(&self) -> ResultEngine<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

impl<R: DeserializeOwned> Snapshot<R> {
    /// Decodes a snapshot. An empty (or blank) blob is an empty snapshot.
    pub fn decode(blob: &[u8]) -> ResultEngine<Self> {
        if blob.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(blob)?)
    }
}

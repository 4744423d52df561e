//! Session data structures and the in-memory store

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One turn of conversation
///
/// Messages are immutable once appended to a session. The timestamp is
/// kept as an ISO-8601 string so that imported data round-trips verbatim;
/// when it is absent, JSON serialization omits the key entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role (user, assistant, system); preserved verbatim
    pub role: String,
    /// Message content; may be empty but never absent
    pub content: String,
    /// ISO-8601 timestamp, if one was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Fields beyond the core three, preserved across JSON round-trips
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Create a new message without a timestamp
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            timestamp: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Create a new message stamped with the current wall-clock time
    pub fn stamped(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(role, content).with_timestamp(Utc::now().to_rfc3339())
    }

    /// Attach a timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Process-wide mapping from session id to its ordered message sequence
///
/// The single source of truth for conversation history. Sessions are
/// created implicitly by the first append and removed only by explicit
/// deletion. The map itself is never exposed; the write lock serializes
/// appends so the append-order invariant holds under concurrent use,
/// and reads clone a session's messages under the read lock so callers
/// always see a consistent snapshot.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Vec<Message>>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, creating the session on first use
    pub fn append(&self, session_id: impl Into<String>, message: Message) {
        let mut sessions = self.sessions.write();
        sessions.entry(session_id.into()).or_default().push(message);
    }

    /// Snapshot of a session's messages; empty if the session is unknown
    pub fn get(&self, session_id: &str) -> Vec<Message> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of messages in a session; 0 if the session is unknown
    pub fn len(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .get(session_id)
            .map_or(0, |messages| messages.len())
    }

    /// Whether a session exists (a zero-message session still exists)
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// All session ids; iteration order across sessions is unspecified
    pub fn keys(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    /// Snapshot of every session and its messages, taken under one lock
    pub fn snapshot(&self) -> Vec<(String, Vec<Message>)> {
        self.sessions
            .read()
            .iter()
            .map(|(id, messages)| (id.clone(), messages.clone()))
            .collect()
    }

    /// Remove a session; true if it existed
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }

    /// Remove every session, returning how many were removed
    pub fn clear(&self) -> usize {
        let mut sessions = self.sessions.write();
        let count = sessions.len();
        sessions.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_append_creates_session() {
        let store = SessionStore::new();
        assert!(!store.contains("s1"));

        store.append("s1", Message::new("user", "Hello"));
        assert!(store.contains("s1"));
        assert_eq!(store.len("s1"), 1);
    }

    #[test]
    fn test_get_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.get("missing").is_empty());
        assert_eq!(store.len("missing"), 0);
    }

    #[test]
    fn test_append_order_preserved() {
        let store = SessionStore::new();
        for i in 0..10 {
            store.append("s1", Message::new("user", format!("Message {}", i)));
        }

        let messages = store.get("s1");
        assert_eq!(messages.len(), 10);
        for (i, msg) in messages.iter().enumerate() {
            assert_eq!(msg.content, format!("Message {}", i));
        }
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::new();
        store.append("s1", Message::new("user", "Hello"));

        assert!(store.remove("s1"));
        assert!(!store.contains("s1"));
        assert!(!store.remove("s1"));
    }

    #[test]
    fn test_clear_returns_prior_count() {
        let store = SessionStore::new();
        store.append("a", Message::new("user", "1"));
        store.append("b", Message::new("user", "2"));

        assert_eq!(store.clear(), 2);
        assert_eq!(store.clear(), 0);
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_concurrent_appends_same_session() {
        let store = Arc::new(SessionStore::new());
        let mut handles = Vec::new();

        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    store.append("shared", Message::new("user", format!("{}-{}", t, i)));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len("shared"), 800);
    }

    #[test]
    fn test_message_serialization_omits_absent_timestamp() {
        let msg = Message::new("user", "Hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("timestamp"));

        let stamped = msg.with_timestamp("2025-01-01T10:00:00Z");
        let json = serde_json::to_string(&stamped).unwrap();
        assert!(json.contains("\"timestamp\":\"2025-01-01T10:00:00Z\""));
    }
}

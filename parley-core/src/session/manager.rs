//! Session manager: filtering, statistics, lifecycle and import/export

use super::store::{Message, SessionStore};
use crate::codec::{self, ExportFormat, ImportFormat};
use crate::error::{Error, Result};
use crate::utils::truncate_chars;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum length of the content preview in a session summary
const PREVIEW_CHARS: usize = 100;

/// Filters for [`SessionManager::list_sessions`]
///
/// `since` is compared lexicographically against raw message timestamp
/// strings, not parsed as a datetime; callers must supply comparable
/// ISO-8601 values. Inherited behavior, kept on purpose.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionFilter {
    /// Inclusive lower bound on message count
    pub min_messages: Option<usize>,
    /// Inclusive upper bound on message count
    pub max_messages: Option<usize>,
    /// Keep a session only if at least one message timestamp is >= this
    pub since: Option<String>,
}

/// Summary of one session, as returned by listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub message_count: usize,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
    /// Content of the last message, truncated to 100 characters
    pub preview: String,
}

/// Aggregate statistics over the whole store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub total_messages: usize,
    pub average_messages_per_session: f64,
    /// Ties resolve to whichever qualifying session was encountered
    /// first; iteration order is unspecified
    pub largest_session: Option<String>,
    pub smallest_session: Option<String>,
}

/// Outcome partition of a bulk deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteResult {
    pub deleted: Vec<String>,
    pub deleted_count: usize,
    pub not_found: Vec<String>,
    pub not_found_count: usize,
}

/// Operates over the [`SessionStore`] to provide filtered listing,
/// statistics, deletion and import/export orchestration
#[derive(Debug, Default)]
pub struct SessionManager {
    store: SessionStore,
}

impl SessionManager {
    /// Create a manager over an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a session, creating it on first use
    pub fn append_message(&self, session_id: &str, message: Message) {
        self.store.append(session_id, message);
    }

    /// Full message history of a session; empty if unknown
    pub fn get_history(&self, session_id: &str) -> Vec<Message> {
        self.store.get(session_id)
    }

    /// Summaries of all sessions passing the filter
    ///
    /// Output order across sessions is unspecified and not stable
    /// between calls.
    pub fn list_sessions(&self, filter: &SessionFilter) -> Vec<SessionSummary> {
        let mut summaries = Vec::new();

        for (session_id, messages) in self.store.snapshot() {
            let count = messages.len();
            if filter.min_messages.is_some_and(|min| count < min) {
                continue;
            }
            if filter.max_messages.is_some_and(|max| count > max) {
                continue;
            }
            if let Some(since) = &filter.since {
                // A zero-message session can never satisfy `since`.
                let any_recent = messages.iter().any(|message| {
                    message
                        .timestamp
                        .as_deref()
                        .is_some_and(|timestamp| timestamp >= since.as_str())
                });
                if !any_recent {
                    continue;
                }
            }

            summaries.push(SessionSummary {
                session_id,
                message_count: count,
                first_timestamp: messages.first().and_then(|m| m.timestamp.clone()),
                last_timestamp: messages.last().and_then(|m| m.timestamp.clone()),
                preview: messages
                    .last()
                    .map(|m| truncate_chars(&m.content, PREVIEW_CHARS))
                    .unwrap_or_default(),
            });
        }

        summaries
    }

    /// Aggregate statistics; a zero-session store yields zeroes with no
    /// largest/smallest, never NaN
    pub fn get_session_stats(&self) -> SessionStats {
        let snapshot = self.store.snapshot();

        let total_sessions = snapshot.len();
        let total_messages: usize = snapshot.iter().map(|(_, messages)| messages.len()).sum();

        let mut largest: Option<(&str, usize)> = None;
        let mut smallest: Option<(&str, usize)> = None;
        for (session_id, messages) in &snapshot {
            let count = messages.len();
            if largest.map_or(true, |(_, best)| count > best) {
                largest = Some((session_id, count));
            }
            if smallest.map_or(true, |(_, best)| count < best) {
                smallest = Some((session_id, count));
            }
        }

        let average = if total_sessions == 0 {
            0.0
        } else {
            total_messages as f64 / total_sessions as f64
        };

        SessionStats {
            total_sessions,
            total_messages,
            average_messages_per_session: average,
            largest_session: largest.map(|(id, _)| id.to_string()),
            smallest_session: smallest.map(|(id, _)| id.to_string()),
        }
    }

    /// Delete one session; false if it did not exist
    pub fn delete_session(&self, session_id: &str) -> bool {
        let deleted = self.store.remove(session_id);
        if deleted {
            debug!(session_id, "session deleted");
        }
        deleted
    }

    /// Delete a set of sessions, reporting a per-id outcome partition
    ///
    /// Ids are processed in input order and duplicates are evaluated
    /// independently, so a duplicate of an id deleted earlier in the
    /// same call lands in `not_found`.
    pub fn delete_multiple_sessions(&self, session_ids: &[String]) -> BulkDeleteResult {
        let mut deleted = Vec::new();
        let mut not_found = Vec::new();

        for session_id in session_ids {
            if self.store.remove(session_id) {
                deleted.push(session_id.clone());
            } else {
                not_found.push(session_id.clone());
            }
        }

        debug!(
            deleted = deleted.len(),
            not_found = not_found.len(),
            "bulk delete finished"
        );

        BulkDeleteResult {
            deleted_count: deleted.len(),
            not_found_count: not_found.len(),
            deleted,
            not_found,
        }
    }

    /// Remove every session, returning the prior count
    pub fn clear_all_sessions(&self) -> usize {
        let count = self.store.clear();
        debug!(count, "all sessions cleared");
        count
    }

    /// Export a session to the given format
    ///
    /// Exporting a session id that does not exist is a not-found error;
    /// an existing zero-message session exports normally.
    pub fn export_session(&self, session_id: &str, format: ExportFormat) -> Result<String> {
        if !self.store.contains(session_id) {
            return Err(Error::NotFound(format!("session '{}'", session_id)));
        }
        let messages = self.store.get(session_id);

        match format {
            ExportFormat::Json => codec::to_json(&messages),
            ExportFormat::Csv => Ok(codec::to_csv(&messages)),
            ExportFormat::Markdown => Ok(codec::to_markdown(session_id, &messages)),
        }
    }

    /// Import messages into a session, appending to any existing
    /// content. Returns how many messages were imported.
    pub fn import_session(
        &self,
        session_id: &str,
        format: ImportFormat,
        body: &str,
    ) -> Result<usize> {
        let messages = match format {
            ImportFormat::Json => codec::from_json(body)?,
            ImportFormat::Csv => codec::from_csv(body)?,
        };

        let count = messages.len();
        for message in messages {
            self.store.append(session_id, message);
        }
        debug!(session_id, count, "imported messages");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(sessions: &[(&str, usize)]) -> SessionManager {
        let manager = SessionManager::new();
        for (id, count) in sessions {
            for i in 0..*count {
                manager.append_message(id, Message::new("user", format!("msg {}", i)));
            }
        }
        manager
    }

    #[test]
    fn test_list_sessions_unfiltered() {
        let manager = manager_with(&[("a", 1), ("b", 3)]);
        let summaries = manager.list_sessions(&SessionFilter::default());
        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn test_min_max_filters_are_inclusive() {
        let manager = manager_with(&[("one", 1), ("two", 2), ("three", 3)]);

        let filter = SessionFilter {
            min_messages: Some(2),
            ..Default::default()
        };
        let ids: Vec<_> = manager
            .list_sessions(&filter)
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"two".to_string()));
        assert!(ids.contains(&"three".to_string()));

        let filter = SessionFilter {
            max_messages: Some(2),
            ..Default::default()
        };
        let ids: Vec<_> = manager
            .list_sessions(&filter)
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"one".to_string()));
        assert!(ids.contains(&"two".to_string()));
    }

    #[test]
    fn test_since_filter_is_lexicographic() {
        let manager = SessionManager::new();
        manager.append_message(
            "old",
            Message::new("user", "hi").with_timestamp("2024-12-31T23:59:59Z"),
        );
        manager.append_message(
            "new",
            Message::new("user", "hi").with_timestamp("2025-06-01T00:00:00Z"),
        );
        manager.append_message("unstamped", Message::new("user", "hi"));

        let filter = SessionFilter {
            since: Some("2025-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let ids: Vec<_> = manager
            .list_sessions(&filter)
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(ids, vec!["new".to_string()]);
    }

    #[test]
    fn test_since_keeps_session_with_any_recent_message() {
        let manager = SessionManager::new();
        manager.append_message(
            "mixed",
            Message::new("user", "old").with_timestamp("2024-01-01T00:00:00Z"),
        );
        manager.append_message(
            "mixed",
            Message::new("assistant", "new").with_timestamp("2025-06-01T00:00:00Z"),
        );

        let filter = SessionFilter {
            since: Some("2025-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(manager.list_sessions(&filter).len(), 1);
    }

    #[test]
    fn test_summary_fields() {
        let manager = SessionManager::new();
        manager.append_message(
            "s1",
            Message::new("user", "first").with_timestamp("2025-01-01T10:00:00Z"),
        );
        let long_content = "x".repeat(250);
        manager.append_message(
            "s1",
            Message::new("assistant", long_content).with_timestamp("2025-01-01T10:00:01Z"),
        );

        let summaries = manager.list_sessions(&SessionFilter::default());
        let summary = &summaries[0];
        assert_eq!(summary.message_count, 2);
        assert_eq!(
            summary.first_timestamp.as_deref(),
            Some("2025-01-01T10:00:00Z")
        );
        assert_eq!(
            summary.last_timestamp.as_deref(),
            Some("2025-01-01T10:00:01Z")
        );
        assert_eq!(summary.preview.chars().count(), 100);
    }

    #[test]
    fn test_stats_empty_store() {
        let manager = SessionManager::new();
        let stats = manager.get_session_stats();
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_messages, 0);
        assert_eq!(stats.average_messages_per_session, 0.0);
        assert_eq!(stats.largest_session, None);
        assert_eq!(stats.smallest_session, None);
    }

    #[test]
    fn test_stats_average_uses_real_division() {
        let manager = manager_with(&[("a", 1), ("b", 2)]);
        let stats = manager.get_session_stats();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_messages, 3);
        assert!((stats.average_messages_per_session - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_extremes() {
        let manager = manager_with(&[("small", 1), ("big", 5), ("mid", 3)]);
        let stats = manager.get_session_stats();
        assert_eq!(stats.largest_session.as_deref(), Some("big"));
        assert_eq!(stats.smallest_session.as_deref(), Some("small"));
    }

    #[test]
    fn test_stats_tie_reports_member_of_tied_set() {
        let manager = manager_with(&[("a", 2), ("b", 2)]);
        let stats = manager.get_session_stats();
        let winner = stats.largest_session.unwrap();
        assert!(winner == "a" || winner == "b");
    }

    #[test]
    fn test_delete_session() {
        let manager = manager_with(&[("a", 1)]);
        assert!(manager.delete_session("a"));
        assert!(!manager.delete_session("a"));
        assert!(!manager.delete_session("never-existed"));
    }

    #[test]
    fn test_bulk_delete_partition_with_duplicates() {
        let manager = manager_with(&[("a", 1)]);
        let ids = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        let result = manager.delete_multiple_sessions(&ids);

        assert_eq!(result.deleted, vec!["a".to_string()]);
        assert_eq!(result.deleted_count, 1);
        assert_eq!(result.not_found, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(result.not_found_count, 2);
        assert_eq!(result.deleted_count + result.not_found_count, ids.len());
    }

    #[test]
    fn test_clear_all_sessions() {
        let manager = manager_with(&[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(manager.clear_all_sessions(), 3);
        assert_eq!(manager.clear_all_sessions(), 0);
    }

    #[test]
    fn test_export_unknown_session_is_not_found() {
        let manager = SessionManager::new();
        let err = manager
            .export_session("ghost", ExportFormat::Json)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_export_csv_scenario() {
        let manager = SessionManager::new();
        manager.append_message(
            "s1",
            Message::new("user", "Hello").with_timestamp("2025-01-01T10:00:00Z"),
        );
        manager.append_message(
            "s1",
            Message::new("assistant", "Hi!").with_timestamp("2025-01-01T10:00:01Z"),
        );

        let csv = manager.export_session("s1", ExportFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "role,content,timestamp\nuser,Hello,2025-01-01T10:00:00Z\nassistant,Hi!,2025-01-01T10:00:01Z\n"
        );
    }

    #[test]
    fn test_import_appends_to_existing_content() {
        let manager = SessionManager::new();
        manager.append_message("s1", Message::new("user", "existing"));

        let count = manager
            .import_session("s1", ImportFormat::Json, r#"[{"role":"user","content":"imported"}]"#)
            .unwrap();
        assert_eq!(count, 1);

        let history = manager.get_history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "existing");
        assert_eq!(history[1].content, "imported");
    }

    #[test]
    fn test_import_malformed_body_leaves_session_untouched() {
        let manager = SessionManager::new();
        manager.append_message("s1", Message::new("user", "existing"));

        let err = manager
            .import_session("s1", ImportFormat::Json, "{not json")
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(manager.get_history("s1").len(), 1);
    }

    #[test]
    fn test_export_import_round_trip_via_manager() {
        let manager = SessionManager::new();
        manager.append_message(
            "src",
            Message::new("user", "Hello").with_timestamp("2025-01-01T10:00:00Z"),
        );
        manager.append_message("src", Message::new("assistant", "Hi!"));

        let json = manager.export_session("src", ExportFormat::Json).unwrap();
        manager.import_session("dst", ImportFormat::Json, &json).unwrap();

        assert_eq!(manager.get_history("dst"), manager.get_history("src"));
    }
}

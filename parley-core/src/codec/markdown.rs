//! Markdown codec (export only)

use crate::session::store::Message;
use chrono::Utc;

/// Render a session as a Markdown document
///
/// The document carries the session id in its heading, the wall-clock
/// export time, the message count, then one section per message with
/// the role upper-cased, the timestamp italicized when present and the
/// content verbatim. Messages are separated by horizontal rules.
pub fn to_markdown(session_id: &str, messages: &[Message]) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Chat Session: {}\n\n", session_id));
    out.push_str(&format!("**Exported:** {}\n\n", Utc::now().to_rfc3339()));
    out.push_str(&format!("**Total Messages:** {}\n\n", messages.len()));

    for (index, message) in messages.iter().enumerate() {
        if index > 0 {
            out.push_str("---\n\n");
        }
        out.push_str(&format!("## {}\n\n", message.role.to_uppercase()));
        if let Some(timestamp) = &message.timestamp {
            out.push_str(&format!("*{}*\n\n", timestamp));
        }
        out.push_str(&message.content);
        out.push_str("\n\n");
    }

    out
}

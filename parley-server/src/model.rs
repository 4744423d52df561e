//! Model invocation boundary

use async_trait::async_trait;
use parley_core::session::Message;
use parley_core::Result;

/// Opaque producer of assistant replies
///
/// The session core treats model invocation as an external collaborator;
/// implementations wrap whatever backend actually serves completions.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Produce an assistant reply for the given conversation history
    async fn complete(&self, history: &[Message]) -> Result<String>;
}

/// Development stand-in that echoes the latest user message
pub struct EchoClient;

#[async_trait]
impl ModelClient for EchoClient {
    async fn complete(&self, history: &[Message]) -> Result<String> {
        let last_user = history.iter().rev().find(|m| m.role == "user");
        Ok(match last_user {
            Some(message) => format!("You said: {}", message.content),
            None => "Hello! How can I help?".to_string(),
        })
    }
}

use std::sync::Arc;

use parley_core::session::SessionManager;

use crate::model::ModelClient;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
    pub model: Arc<dyn ModelClient>,
    /// How many trailing messages feed the model client
    pub context_messages: usize,
}

impl AppState {
    pub fn new(model: Arc<dyn ModelClient>, context_messages: usize) -> Self {
        Self {
            manager: Arc::new(SessionManager::new()),
            model,
            context_messages,
        }
    }
}

//! Shared application state handed to route handlers.

use std::sync::Arc;

use chatwire_agent::AgentEventSource;
use chatwire_storage::MessageStore;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn MessageStore>,
    pub agent: Arc<dyn AgentEventSource>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn MessageStore>,
        agent: Arc<dyn AgentEventSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            agent,
        }
    }
}

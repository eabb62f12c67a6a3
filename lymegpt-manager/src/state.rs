use lymegpt_agent::ChatController;
use lymegpt_core::auth::CredentialVerifier;
use lymegpt_core::config::UiConfig;
use lymegpt_core::session::SessionManager;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub controller: Arc<ChatController>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub ui: Arc<UiConfig>,
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionManager>,
        controller: Arc<ChatController>,
        verifier: Arc<dyn CredentialVerifier>,
        ui: UiConfig,
    ) -> Self {
        Self {
            sessions,
            controller,
            verifier,
            ui: Arc::new(ui),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
}

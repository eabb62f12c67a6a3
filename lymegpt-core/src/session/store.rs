//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthState, CredentialVerifier};

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role (user, assistant)
    pub role: Role,
    /// Message content
    pub content: String,
    /// Message timestamp
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// State owned by one browser session
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Key of this session in the session store (cookie value)
    pub key: String,
    /// Opaque id round-tripped with the knowledge base; empty until the
    /// first successful answer
    session_id: String,
    /// Append-only transcript
    messages: Vec<ChatMessage>,
    auth: AuthState,
    /// Session creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a new, logged-out session with an empty transcript
    pub fn new(key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            session_id: String::new(),
            messages: Vec::new(),
            auth: AuthState::LoggedOut,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Replace the knowledge-base session id wholesale
    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.session_id = session_id.into();
        self.updated_at = Utc::now();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Add a message to the transcript
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
        self.updated_at = Utc::now();
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    /// Check credentials and flip the session to logged in
    pub fn login(
        &mut self,
        verifier: &dyn CredentialVerifier,
        username: &str,
        password: &str,
    ) -> crate::Result<()> {
        self.auth.log_in(verifier, username, password)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;

    #[test]
    fn test_session_creation() {
        let session = ChatSession::new("tab-1");
        assert_eq!(session.key, "tab-1");
        assert_eq!(session.session_id(), "");
        assert!(session.messages().is_empty());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_add_message() {
        let mut session = ChatSession::new("test");
        session.add_message(Role::User, "Hello");
        session.add_message(Role::Assistant, "Hi there!");

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn test_login_flow() {
        let verifier = StaticCredentials::new("lyme", "lyme");
        let mut session = ChatSession::new("test");

        assert!(session.login(&verifier, "lyme", "nope").is_err());
        assert!(!session.is_logged_in());

        session.login(&verifier, "lyme", "lyme").unwrap();
        assert_eq!(session.auth_state(), AuthState::LoggedIn);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::new(Role::Assistant, "x")).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
    }
}

//! Login gate
//!
//! Credential comparison is isolated behind [`CredentialVerifier`] so the
//! shared static pair can be replaced by a real provider without touching
//! the chat flow.

use serde::Serialize;

use crate::config::AuthConfig;

/// Checks a submitted username/password pair
pub trait CredentialVerifier: Send + Sync {
    /// Returns true when the pair is accepted
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single fixed credential pair compared verbatim.
///
/// Placeholder-grade access control: no hashing, no rate limiting.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Login state of one session. The only transition is `LoggedOut -> LoggedIn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn,
}

impl AuthState {
    pub fn is_logged_in(self) -> bool {
        matches!(self, AuthState::LoggedIn)
    }

    /// Run the login transition. A failed check leaves the state untouched;
    /// a logged-in state never reverts.
    pub fn log_in(
        &mut self,
        verifier: &dyn CredentialVerifier,
        username: &str,
        password: &str,
    ) -> crate::Result<()> {
        if self.is_logged_in() {
            return Ok(());
        }
        if !verifier.verify(username, password) {
            return Err(crate::Error::InvalidCredentials);
        }
        *self = AuthState::LoggedIn;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lyme() -> StaticCredentials {
        StaticCredentials::from_config(&AuthConfig::default())
    }

    #[test]
    fn test_default_pair_logs_in() {
        let mut state = AuthState::default();
        state.log_in(&lyme(), "lyme", "lyme").unwrap();
        assert!(state.is_logged_in());
    }

    #[test]
    fn test_wrong_pair_is_rejected() {
        let verifier = lyme();
        let pairs = [
            ("lyme", "wrong"),
            ("admin", "lyme"),
            ("", ""),
            ("Lyme", "lyme"),
            ("lyme ", "lyme"),
        ];
        for (user, pass) in pairs {
            let mut state = AuthState::default();
            let err = state.log_in(&verifier, user, pass).unwrap_err();
            assert!(matches!(err, crate::Error::InvalidCredentials));
            assert_eq!(state, AuthState::LoggedOut);
        }
    }

    #[test]
    fn test_logged_in_never_reverts() {
        let verifier = lyme();
        let mut state = AuthState::default();
        state.log_in(&verifier, "lyme", "lyme").unwrap();
        state.log_in(&verifier, "bad", "bad").unwrap();
        assert!(state.is_logged_in());
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", StaticCredentials::new("u", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}

//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for LymeGPT
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Login gate configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Remote knowledge-base configuration
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    /// Interface text
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sessions untouched for this long are dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_session_idle_secs() -> u64 {
    24 * 3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

/// The single shared credential pair checked by the login gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_credential")]
    pub username: String,
    #[serde(default = "default_credential")]
    pub password: String,
}

fn default_credential() -> String {
    "lyme".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_credential(),
            password: default_credential(),
        }
    }
}

/// Transport used to reach the knowledge-base function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeBaseBackend {
    /// Invoke an AWS Lambda function with ambient AWS credentials
    #[default]
    Lambda,
    /// POST the request to an HTTPS endpoint (function URL, API gateway)
    Http,
}

impl std::fmt::Display for KnowledgeBaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnowledgeBaseBackend::Lambda => write!(f, "lambda"),
            KnowledgeBaseBackend::Http => write!(f, "http"),
        }
    }
}

/// Remote knowledge-base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    #[serde(default)]
    pub backend: KnowledgeBaseBackend,
    /// Lambda function name or ARN
    #[serde(default = "default_function_name")]
    pub function_name: String,
    /// AWS region; the ambient region is used when unset
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint URL for the http backend
    #[serde(default)]
    pub endpoint: String,
    /// Extra headers sent by the http backend
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Client-side timeout for one remote call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_function_name() -> String {
    "InvokeKnowledgeBase".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            backend: KnowledgeBaseBackend::default(),
            function_name: default_function_name(),
            region: None,
            endpoint: String::new(),
            headers: HashMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Interface text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_input_placeholder")]
    pub input_placeholder: String,
}

fn default_title() -> String {
    "LymeGPT".to_string()
}

fn default_input_placeholder() -> String {
    "Ask about Lyme disease treatment...".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            input_placeholder: default_input_placeholder(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.auth.username, "lyme");
        assert_eq!(config.auth.password, "lyme");
        assert_eq!(config.knowledge_base.backend, KnowledgeBaseBackend::Lambda);
        assert_eq!(config.knowledge_base.function_name, "InvokeKnowledgeBase");
        assert_eq!(config.knowledge_base.timeout_secs, 60);
        assert_eq!(config.ui.title, "LymeGPT");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"knowledge_base":{"backend":"http"}}"#).unwrap();
        assert_eq!(config.knowledge_base.backend, KnowledgeBaseBackend::Http);
        assert_eq!(config.knowledge_base.function_name, "InvokeKnowledgeBase");
        assert_eq!(config.server.host, "127.0.0.1");
    }
}

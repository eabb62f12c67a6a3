//! Configuration validation rules.

use super::schema::{Config, KnowledgeBaseBackend};

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".to_string());
    }
    if config.server.port == 0 {
        errors.push("server.port must be > 0".to_string());
    }
    if config.auth.username.is_empty() {
        errors.push("auth.username must not be empty".to_string());
    }

    let kb = &config.knowledge_base;
    if kb.timeout_secs == 0 {
        errors.push("knowledge_base.timeout_secs must be > 0".to_string());
    }
    match kb.backend {
        KnowledgeBaseBackend::Lambda => {
            if kb.function_name.trim().is_empty() {
                errors.push(
                    "knowledge_base.function_name is required for the lambda backend".to_string(),
                );
            }
        }
        KnowledgeBaseBackend::Http => {
            let endpoint = kb.endpoint.trim();
            if endpoint.is_empty() {
                errors.push("knowledge_base.endpoint is required for the http backend".to_string());
            } else if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                errors.push("knowledge_base.endpoint must be an http(s) URL".to_string());
            }
        }
    }

    match config.logging.format.to_lowercase().as_str() {
        "text" | "json" => {}
        other => errors.push(format!(
            "logging.format must be text or json, got {}",
            other
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

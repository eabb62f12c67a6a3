//! Knowledge-base clients for LymeGPT
//!
//! The retrieval and answer generation happen in a remote function. This
//! crate only knows how to call it: over the AWS Lambda API or over HTTP.

pub mod base;
pub mod http;
pub mod lambda;

pub use base::{
    parse_invocation_payload, Citation, KnowledgeBase, KnowledgeBaseError, KnowledgeBaseRequest,
    KnowledgeBaseResponse, KnowledgeBaseResult, RetrievedReference,
};
pub use http::HttpKnowledgeBase;
pub use lambda::LambdaKnowledgeBase;

use lymegpt_core::config::{KnowledgeBaseBackend, KnowledgeBaseConfig};
use std::sync::Arc;
use tracing::info;

/// Build the client selected by the configuration
pub async fn build_knowledge_base(
    config: &KnowledgeBaseConfig,
) -> KnowledgeBaseResult<Arc<dyn KnowledgeBase>> {
    let kb: Arc<dyn KnowledgeBase> = match config.backend {
        KnowledgeBaseBackend::Lambda => {
            if config.function_name.trim().is_empty() {
                return Err(KnowledgeBaseError::Config(
                    "function_name is required for the lambda backend".to_string(),
                ));
            }
            Arc::new(
                LambdaKnowledgeBase::from_env(config.function_name.clone(), config.region.clone())
                    .await,
            )
        }
        KnowledgeBaseBackend::Http => {
            if config.endpoint.trim().is_empty() {
                return Err(KnowledgeBaseError::Config(
                    "endpoint is required for the http backend".to_string(),
                ));
            }
            let headers = if config.headers.is_empty() {
                None
            } else {
                Some(config.headers.clone())
            };
            Arc::new(HttpKnowledgeBase::new(config.endpoint.clone(), headers))
        }
    };
    info!("Knowledge base: {}", kb.target());
    Ok(kb)
}

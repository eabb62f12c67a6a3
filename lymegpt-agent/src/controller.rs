//! Chat session controller: one question in, one answer out

use lymegpt_core::session::{ChatSession, Role, SharedSession};
use lymegpt_knowledge::{KnowledgeBase, KnowledgeBaseError, KnowledgeBaseRequest};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::citations::{collect_sources, SourceChunk};

/// Why a turn produced no answer
#[derive(Error, Debug)]
pub enum TurnError {
    /// Blank submission; nothing happened
    #[error("Question is empty")]
    EmptyInput,

    #[error("Please log in first")]
    NotLoggedIn,

    /// Another question from this session is still being answered
    #[error("Still answering the previous question")]
    Busy,

    #[error(transparent)]
    Remote(#[from] KnowledgeBaseError),
}

/// A completed exchange
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub sources: Vec<SourceChunk>,
}

/// Runs question/answer turns against the knowledge base
pub struct ChatController {
    knowledge_base: Arc<dyn KnowledgeBase>,
    timeout: Duration,
}

impl ChatController {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBase>, timeout: Duration) -> Self {
        Self {
            knowledge_base,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one turn on an exclusively borrowed session.
    ///
    /// The user message is appended before the remote call. On success the
    /// stored session id is replaced and the answer appended; on failure the
    /// transcript keeps only the user message and the session id is untouched.
    pub async fn submit_question(
        &self,
        session: &mut ChatSession,
        text: &str,
    ) -> Result<Turn, TurnError> {
        if !session.is_logged_in() {
            return Err(TurnError::NotLoggedIn);
        }
        if text.trim().is_empty() {
            return Err(TurnError::EmptyInput);
        }

        info!("Question from {}: {}", session.key, preview(text));
        session.add_message(Role::User, text);

        let request = KnowledgeBaseRequest::new(text, session.session_id());
        let call = self.knowledge_base.ask(&request);
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("Knowledge base call failed for {}: {}", session.key, e);
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    "Knowledge base call timed out for {} after {:?}",
                    session.key, self.timeout
                );
                return Err(KnowledgeBaseError::Timeout(self.timeout.as_secs()).into());
            }
        };

        if response.session_id != session.session_id() {
            debug!(
                "Knowledge base session for {} is now {}",
                session.key, response.session_id
            );
        }
        session.set_session_id(response.session_id.clone());
        session.add_message(Role::Assistant, response.answer.clone());

        let sources = collect_sources(&response.citations);
        info!(
            "Answered {} with {} sources",
            session.key,
            sources.len()
        );

        Ok(Turn {
            question: text.to_string(),
            answer: response.answer,
            session_id: response.session_id,
            sources,
        })
    }

    /// Run one turn on a shared session. Fails with [`TurnError::Busy`] when
    /// the session already has a turn in flight.
    pub async fn submit_shared(
        &self,
        session: &SharedSession,
        text: &str,
    ) -> Result<Turn, TurnError> {
        let mut session = session.try_lock().map_err(|_| TurnError::Busy)?;
        self.submit_question(&mut session, text).await
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > 80 {
        format!("{}...", text.chars().take(80).collect::<String>())
    } else {
        text.to_string()
    }
}

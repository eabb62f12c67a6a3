//! Per-browser chat sessions
//!
//! Each session holds the transcript, the knowledge-base session id and the
//! login state. Sessions live in memory only.

pub mod manager;
pub mod store;

pub use manager::{SessionManager, SharedSession};
pub use store::{ChatMessage, ChatSession, Role};

//! Chat logic for LymeGPT
//!
//! This crate provides the chat session controller and the citation
//! de-duplication shown under each answer.

pub mod citations;
pub mod controller;

pub use citations::{collect_sources, SourceChunk};
pub use controller::{ChatController, Turn, TurnError};

//! Core types and traits for LymeGPT
//!
//! This crate provides configuration, logging, the error type, the login
//! gate and the per-browser chat sessions shared by every other crate.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};

//! Web front-end for LymeGPT
//!
//! Serves the login and chat pages plus a small JSON API over the same
//! cookie-keyed sessions.

pub mod handlers;
pub mod render;
pub mod server;
pub mod state;

pub use handlers::SESSION_COOKIE;
pub use server::{build_router, run_server};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use lymegpt_core::session::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    api_chat_handler, api_history_handler, api_login_handler, chat_handler, health_handler,
    index_handler, login_handler, reset_handler,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/login", post(login_handler))
        .route("/chat", post(chat_handler))
        .route("/reset", post(reset_handler))
        .route("/api/login", post(api_login_handler))
        .route("/api/history", get(api_history_handler))
        .route("/api/chat", post(api_chat_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// How often idle sessions are swept
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Drop idle sessions every `every` until shutdown. Sessions are otherwise
/// only pruned when a new one is created.
pub async fn prune_sessions(
    sessions: Arc<SessionManager>,
    every: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                sessions.prune_idle();
            }
            _ = shutdown_rx.recv() => break,
        }
    }
}

pub async fn run_server(
    state: AppState,
    addr: SocketAddr,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    tokio::spawn(prune_sessions(
        state.sessions.clone(),
        PRUNE_INTERVAL,
        shutdown_rx.resubscribe(),
    ));
    let app = build_router(state);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            tracing::info!("Server shutting down signal received");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_idle_sessions_are_swept_without_new_visits() {
        let sessions = Arc::new(SessionManager::new(Duration::from_millis(20)));
        sessions.create();
        sessions.create();
        assert_eq!(sessions.len(), 2);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let sweeper = tokio::spawn(prune_sessions(
            sessions.clone(),
            Duration::from_millis(10),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sessions.is_empty());

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), sweeper)
            .await
            .unwrap()
            .unwrap();
    }
}

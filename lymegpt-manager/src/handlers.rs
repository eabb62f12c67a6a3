use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lymegpt_agent::TurnError;
use lymegpt_core::session::SharedSession;
use lymegpt_knowledge::KnowledgeBaseError;

use crate::render::{self, TurnNotice};
use crate::state::{AppState, ChatRequest, LoginRequest};

/// Cookie carrying the browser session key
pub const SESSION_COOKIE: &str = "lymegpt_session";

/// Find the caller's session, starting a new one (and setting the cookie)
/// when the cookie is missing or stale.
fn session_for(state: &AppState, jar: CookieJar) -> (CookieJar, SharedSession) {
    let presented = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (key, session) = state.sessions.get_or_create(presented.as_deref());

    if presented.as_deref() == Some(key.as_str()) {
        return (jar, session);
    }
    let cookie = Cookie::build((SESSION_COOKIE, key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), session)
}

fn status_for(err: &TurnError) -> StatusCode {
    match err {
        TurnError::EmptyInput => StatusCode::BAD_REQUEST,
        TurnError::NotLoggedIn => StatusCode::UNAUTHORIZED,
        TurnError::Busy => StatusCode::CONFLICT,
        TurnError::Remote(KnowledgeBaseError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        TurnError::Remote(_) => StatusCode::BAD_GATEWAY,
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "status": "error", "message": message.into() })),
    )
        .into_response()
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn index_handler(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, shared) = session_for(&state, jar);
    let session = shared.lock().await;
    let page = if session.is_logged_in() {
        render::chat_page(&state.ui, session.messages(), None)
    } else {
        render::login_page(&state.ui, None)
    };
    (jar, Html(page))
}

pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginRequest>,
) -> Response {
    let (jar, shared) = session_for(&state, jar);
    let mut session = shared.lock().await;
    match session.login(state.verifier.as_ref(), &form.username, &form.password) {
        Ok(()) => {
            tracing::info!("Session {} logged in", session.key);
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => {
            tracing::warn!("Rejected login for session {}", session.key);
            (
                StatusCode::UNAUTHORIZED,
                jar,
                Html(render::login_page(&state.ui, Some(&e.to_string()))),
            )
                .into_response()
        }
    }
}

pub async fn chat_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ChatRequest>,
) -> Response {
    let (jar, shared) = session_for(&state, jar);

    // The guard spans the turn and the render, so the page always shows
    // this turn's outcome.
    let Ok(mut session) = shared.try_lock() else {
        // Nothing is submitted; show the transcript once the running turn ends
        let session = shared.lock().await;
        let message = TurnError::Busy.to_string();
        let page = render::chat_page(
            &state.ui,
            session.messages(),
            Some(TurnNotice::Failure(&message)),
        );
        return (StatusCode::CONFLICT, jar, Html(page)).into_response();
    };

    let outcome = state
        .controller
        .submit_question(&mut session, &form.question)
        .await;
    let (status, page) = match &outcome {
        Ok(turn) => (
            StatusCode::OK,
            render::chat_page(
                &state.ui,
                session.messages(),
                Some(TurnNotice::Sources(&turn.sources)),
            ),
        ),
        Err(TurnError::NotLoggedIn) => return (jar, Redirect::to("/")).into_response(),
        Err(TurnError::EmptyInput) => (
            StatusCode::OK,
            render::chat_page(&state.ui, session.messages(), None),
        ),
        Err(e) => {
            let message = e.to_string();
            (
                status_for(e),
                render::chat_page(
                    &state.ui,
                    session.messages(),
                    Some(TurnNotice::Failure(&message)),
                ),
            )
        }
    };
    (status, jar, Html(page)).into_response()
}

pub async fn reset_handler(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if state.sessions.remove(cookie.value()) {
            tracing::info!("Session {} reset", cookie.value());
        }
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

pub async fn api_login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let (jar, shared) = session_for(&state, jar);
    let mut session = shared.lock().await;
    match session.login(state.verifier.as_ref(), &payload.username, &payload.password) {
        Ok(()) => {
            tracing::info!("Session {} logged in", session.key);
            (jar, Json(serde_json::json!({ "status": "ok" }))).into_response()
        }
        Err(e) => {
            tracing::warn!("Rejected login for session {}", session.key);
            (jar, api_error(StatusCode::UNAUTHORIZED, e.to_string())).into_response()
        }
    }
}

pub async fn api_history_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, shared) = session_for(&state, jar);
    let session = shared.lock().await;
    if !session.is_logged_in() {
        let error = api_error(StatusCode::UNAUTHORIZED, TurnError::NotLoggedIn.to_string());
        return (jar, error).into_response();
    }
    let body = serde_json::json!({
        "sessionId": session.session_id(),
        "messages": session.messages(),
    });
    (jar, Json(body)).into_response()
}

pub async fn api_chat_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<ChatRequest>,
) -> Response {
    let (jar, shared) = session_for(&state, jar);
    match state.controller.submit_shared(&shared, &payload.question).await {
        Ok(turn) => (jar, Json(turn)).into_response(),
        Err(e) => (jar, api_error(status_for(&e), e.to_string())).into_response(),
    }
}

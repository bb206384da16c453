use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::controller::{ClearOutcome, RequestState, Session, SessionView, SubmitOutcome};
use crate::session::{SessionStore, DEFAULT_SESSION_ID};
use crate::validate::word_count;

pub const SESSION_HEADER: &str = "x-session-id";
const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(sessions: SessionStore) -> Self {
        Self {
            sessions: Arc::new(sessions),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/state", get(session_state))
        .route("/api/analyze", post(analyze))
        .route("/api/clear", post(clear))
        .route("/api/word-count", post(count_words))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Session id from the `x-session-id` header; `default` when absent.
pub struct SessionId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for SessionId {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(SESSION_HEADER) else {
            return Ok(SessionId(DEFAULT_SESSION_ID.to_string()));
        };
        let id = raw
            .to_str()
            .map(str::trim)
            .map_err(|_| (StatusCode::BAD_REQUEST, "x-session-id must be visible ASCII"))?;
        if id.is_empty() || id.len() > MAX_SESSION_ID_LEN {
            return Err((StatusCode::BAD_REQUEST, "x-session-id must be 1-128 characters"));
        }
        Ok(SessionId(id.to_string()))
    }
}

#[derive(serde::Deserialize)]
struct TextReq {
    text: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WordCountResp {
    word_count: usize,
}

async fn session_state(State(state): State<AppState>, SessionId(id): SessionId) -> Json<SessionView> {
    let view = match state.sessions.get(&id) {
        Some(c) => c.snapshot().view(),
        None => Session::default().view(),
    };
    Json(view)
}

async fn analyze(
    State(state): State<AppState>,
    SessionId(id): SessionId,
    Json(body): Json<TextReq>,
) -> (StatusCode, Json<SessionView>) {
    let Some(controller) = state.sessions.get_or_create(&id) else {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(Session::default().view()));
    };

    // Detached so a dropped connection does not cut the request short.
    let task = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit(&body.text).await })
    };
    let outcome = match task.await {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(target: "analysis", error = %e, "analysis task panicked");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(controller.snapshot().view()));
        }
    };

    let status = match &outcome {
        SubmitOutcome::Rejected => StatusCode::CONFLICT,
        SubmitOutcome::Finished(RequestState::Succeeded(_)) => StatusCode::OK,
        SubmitOutcome::Finished(RequestState::Failed(e)) if e.is_validation() => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SubmitOutcome::Finished(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(controller.snapshot().view()))
}

/// Clearing an unknown session is a no-op that reports the idle view; it never
/// creates one.
async fn clear(State(state): State<AppState>, SessionId(id): SessionId) -> (StatusCode, Json<SessionView>) {
    let Some(controller) = state.sessions.get(&id) else {
        return (StatusCode::OK, Json(Session::default().view()));
    };
    let status = match controller.clear() {
        ClearOutcome::Cleared => StatusCode::OK,
        ClearOutcome::Rejected => StatusCode::CONFLICT,
    };
    (status, Json(controller.snapshot().view()))
}

async fn count_words(Json(body): Json<TextReq>) -> Json<WordCountResp> {
    Json(WordCountResp {
        word_count: word_count(&body.text),
    })
}

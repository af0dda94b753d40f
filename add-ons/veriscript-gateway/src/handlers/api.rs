//! JSON API under `/api/v1`, plus the SSE state stream.
//!
//! Errors are `{ "error": <message>, "kind": <machine kind> }` with a status per kind:
//! 412 missing credential, 409 busy / not resettable / inputs frozen, 400 bad edition,
//! 404 no report yet.

use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use veriscript_core::{ControllerError, Edition, ScriptInputs, CREDENTIAL_ENV_VARS};

fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    (status, Json(json!({ "error": message, "kind": kind }))).into_response()
}

fn controller_error(e: ControllerError) -> Response {
    let status = match e {
        ControllerError::MissingCredential => StatusCode::PRECONDITION_FAILED,
        ControllerError::AlreadyGenerating
        | ControllerError::InvalidTransition { .. }
        | ControllerError::InputsFrozen => StatusCode::CONFLICT,
    };
    error_response(status, e.kind(), e.to_string())
}

/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "app_name": state.config.app_name,
        "llm_mode": state.config.llm_mode,
        "model": state.config.model,
        "capability": state.client.capability_name(),
        "credential_configured": state.credential.is_some(),
        "credential_env": CREDENTIAL_ENV_VARS,
    }))
}

/// GET /api/v1/state
pub async fn get_state(State(state): State<AppState>) -> Response {
    Json(state.session.state()).into_response()
}

/// GET /api/v1/state/stream – current state first, then every replacement.
pub async fn state_stream(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    use async_stream::stream;
    let mut rx = state.session.subscribe();
    let stream = stream! {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            match serde_json::to_string(&snapshot) {
                Ok(json) => yield Ok(Event::default().event("state").data(json)),
                Err(e) => tracing::warn!(target: "veriscript::gateway", error = %e, "State snapshot not serializable"),
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keepalive"),
    )
}

/// GET /api/v1/inputs
pub async fn get_inputs(State(state): State<AppState>) -> Json<ScriptInputs> {
    Json(state.session.inputs())
}

/// PUT /api/v1/inputs – replace all three scripts (rejected while generating).
pub async fn put_inputs(State(state): State<AppState>, Json(inputs): Json<ScriptInputs>) -> Response {
    match state.session.set_inputs(inputs) {
        Ok(()) => Json(state.session.inputs()).into_response(),
        Err(e) => controller_error(e),
    }
}

/// POST /api/v1/generate – start a run with the stored scripts; poll or stream for the outcome.
pub async fn generate(State(state): State<AppState>) -> Response {
    match state.session.spawn(state.client.clone(), state.credential.clone()) {
        Ok(_) => (StatusCode::ACCEPTED, Json(state.session.state())).into_response(),
        Err(e) => controller_error(e),
    }
}

/// POST /api/v1/reset
pub async fn reset(State(state): State<AppState>) -> Json<veriscript_core::GenerationState> {
    state.session.reset();
    Json(state.session.state())
}

/// GET /api/v1/article/:edition – article body as plain markdown, for copy/export.
pub async fn article(State(state): State<AppState>, Path(edition): Path<String>) -> Response {
    let edition: Edition = match edition.parse() {
        Ok(e) => e,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, "invalid_edition", msg),
    };
    match state.session.state().data {
        Some(data) => (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            data.article(edition).to_string(),
        )
            .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "no_report",
            "No report has been generated yet".to_string(),
        ),
    }
}

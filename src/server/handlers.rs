//! HTTP fragment and control handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use tracing::{error, info};

use crate::error::AguiError;
use crate::render;

use super::AppState;

/// Consume a pending run's event stream. Triggered by the hidden
/// run-trigger fragment the submit broadcast put into every client. The
/// run is claimed before the agent is asked for a stream, so concurrent
/// triggers from several tabs invoke the agent once; losers get 404.
pub async fn trigger_run(
    Path((thread_id, run_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, String)> {
    let thread = state.pool.get_or_create(&thread_id).await;

    let input = match thread.claim_run(&run_id).await {
        Ok(input) => input,
        Err(AguiError::RunNotFound { run_id }) => {
            error!(thread_id = %thread_id, run_id = %run_id, "duplicate or unknown run trigger");
            return Err((StatusCode::NOT_FOUND, format!("run {run_id} not found")));
        }
    };

    let events = state.runner.run(input).await;
    thread.consume_claimed(&run_id, events).await;
    info!(thread_id = %thread_id, run_id = %run_id, "run consumed");
    Ok(Html(String::new()))
}

pub async fn transcript_fragment(
    Path(thread_id): Path<String>,
    State(state): State<AppState>,
) -> Html<String> {
    let thread = state.pool.get_or_create(&thread_id).await;
    Html(render::transcript_container(&thread.transcript().await))
}

pub async fn chat_fragment(Path(thread_id): Path<String>) -> Html<String> {
    Html(render::chat_shell(&thread_id))
}

pub async fn state_fragment(
    Path(thread_id): Path<String>,
    State(state): State<AppState>,
) -> Html<String> {
    let thread = state.pool.get_or_create(&thread_id).await;
    Html(render::state_panel(&thread.state_snapshot().await))
}

pub async fn get_suggestions(
    Path(thread_id): Path<String>,
    State(state): State<AppState>,
) -> Json<Vec<String>> {
    let thread = state.pool.get_or_create(&thread_id).await;
    Json(thread.suggestions().await)
}

pub async fn set_suggestions(
    Path(thread_id): Path<String>,
    State(state): State<AppState>,
    Json(suggestions): Json<Vec<String>>,
) -> StatusCode {
    let thread = state.pool.get_or_create(&thread_id).await;
    thread.set_suggestions(suggestions).await;
    StatusCode::NO_CONTENT
}

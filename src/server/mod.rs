//! Transport glue: axum router and WebSocket fan-out around the core.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::agent::AgentRunner;
use crate::pool::ThreadPool;
use crate::render::RenderNotification;

pub mod handlers;
pub mod ws;

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ThreadPool>,
    pub runner: Arc<dyn AgentRunner>,
    pub renderer: Arc<dyn RenderNotification>,
}

impl AppState {
    pub fn new(
        pool: Arc<ThreadPool>,
        runner: Arc<dyn AgentRunner>,
        renderer: Arc<dyn RenderNotification>,
    ) -> Self {
        Self {
            pool,
            runner,
            renderer,
        }
    }
}

/// All routes the live-UI layer serves, ready to be merged into an
/// application router.
pub fn agui_router(state: AppState) -> Router {
    Router::new()
        .route("/agui/ws/:thread_id", get(ws::ws_handler))
        .route("/agui/run/:thread_id/:run_id", get(handlers::trigger_run))
        .route("/agui/messages/:thread_id", get(handlers::transcript_fragment))
        .route("/agui/ui/:thread_id/chat", get(handlers::chat_fragment))
        .route("/agui/ui/:thread_id/state", get(handlers::state_fragment))
        .route(
            "/agui/suggestions/:thread_id",
            get(handlers::get_suggestions).post(handlers::set_suggestions),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

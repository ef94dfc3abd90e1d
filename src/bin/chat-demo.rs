//! Demo chat server backed by a scripted agent.
//!
//! Serves a single-thread chat page with live streaming, a shared-state
//! panel (message counter), and suggestion buttons. Run with
//! `cargo run --bin chat-demo` and open http://127.0.0.1:3000/.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{response::Html, routing::get, Router};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use agui_web::server::{agui_router, AppState};
use agui_web::{AgentEvent, AgentRunner, EventStream, HtmxRenderer, RunInput, ThreadPool};

/// Streams a canned reply for the last user message, bumping a counter in
/// the shared state along the way.
struct ScriptedAgent;

#[async_trait]
impl AgentRunner for ScriptedAgent {
    async fn run(&self, input: RunInput) -> EventStream {
        let message_id = Uuid::new_v4().to_string();
        let run_id = input.run_id.clone();
        let last_user = input
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let replies = input.messages.len() / 2 + 1;
        let reply = format!("You said \"{last_user}\". This is scripted reply number {replies}.");

        Box::pin(async_stream::stream! {
            yield AgentEvent::RunStarted { run_id: run_id.clone() };
            yield AgentEvent::StepStarted { step_name: "compose".into() };
            yield AgentEvent::TextMessageStart { message_id: message_id.clone() };
            for word in reply.split_inclusive(' ') {
                tokio::time::sleep(Duration::from_millis(40)).await;
                yield AgentEvent::TextMessageContent {
                    message_id: message_id.clone(),
                    delta: word.to_string(),
                };
            }
            yield AgentEvent::TextMessageEnd { message_id: message_id.clone() };
            yield AgentEvent::StepFinished { step_name: "compose".into() };
            yield AgentEvent::StateSnapshot { snapshot: json!({ "replies": replies }) };
            yield AgentEvent::RunFinished { run_id };
        })
    }
}

async fn index() -> Html<String> {
    Html(format!(
        concat!(
            "<!doctype html><html><head>",
            r#"<script src="https://unpkg.com/htmx.org@1.9.12"></script>"#,
            r#"<script src="https://unpkg.com/htmx.org@1.9.12/dist/ext/ws.js"></script>"#,
            "<title>agui-web demo</title></head><body>",
            r#"<div style="display:flex;gap:2rem;">"#,
            r#"<div style="width:18rem;"><h3>State</h3><div id="agui-state" hx-get="/agui/ui/main/state" hx-trigger="load" hx-swap="outerHTML"></div></div>"#,
            r#"<div style="flex:1;">{chat}</div>"#,
            r#"<div style="width:18rem;"><h3>Thinking</h3><div id="thinking-steps"></div></div>"#,
            "</div></body></html>",
        ),
        chat = agui_web::render::chat_shell("main"),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let pool = Arc::new(ThreadPool::new(json!({ "replies": 0 })));
    pool.get_or_create("main")
        .await
        .set_suggestions(vec![
            "What can you do?".into(),
            "Tell me a joke".into(),
            "Write a haiku".into(),
        ])
        .await;

    let state = AppState::new(pool, Arc::new(ScriptedAgent), Arc::new(HtmxRenderer));
    let app = Router::new()
        .route("/", get(index))
        .merge(agui_router(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

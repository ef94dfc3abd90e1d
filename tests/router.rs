//! Router-level tests for the axum glue: fragment routes, the run
//! trigger, and the suggestions endpoints.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

use agui_web::server::{agui_router, AppState};
use agui_web::{
    scripted_stream, AgentEvent, AgentRunner, EventStream, HtmxRenderer, RunInput, ThreadPool,
};

struct ScriptedAgent;

#[async_trait]
impl AgentRunner for ScriptedAgent {
    async fn run(&self, input: RunInput) -> EventStream {
        let message_id = Uuid::new_v4().to_string();
        scripted_stream(vec![
            AgentEvent::TextMessageStart {
                message_id: message_id.clone(),
            },
            AgentEvent::TextMessageContent {
                message_id: message_id.clone(),
                delta: "scripted reply".into(),
            },
            AgentEvent::TextMessageEnd { message_id },
            AgentEvent::StateSnapshot {
                snapshot: json!({"replies": 1}),
            },
            AgentEvent::RunFinished {
                run_id: input.run_id,
            },
        ])
    }
}

fn setup() -> (Arc<ThreadPool>, TestServer) {
    let pool = Arc::new(ThreadPool::new(json!({"replies": 0})));
    let state = AppState::new(pool.clone(), Arc::new(ScriptedAgent), Arc::new(HtmxRenderer));
    let server = TestServer::new(agui_router(state)).expect("test server");
    (pool, server)
}

#[tokio::test]
async fn chat_fragment_wires_the_websocket() {
    let (_pool, server) = setup();
    let response = server.get("/agui/ui/main/chat").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains(r#"ws-connect="/agui/ws/main""#));
    assert!(body.contains(r#"id="chat-input-container""#));
}

#[tokio::test]
async fn transcript_fragment_reflects_consumed_runs() {
    let (pool, server) = setup();
    let thread = pool.get_or_create("main").await;
    let run_id = thread.submit_message("hello", "Alice").await;

    let response = server.get(&format!("/agui/run/main/{run_id}")).await;
    response.assert_status_ok();

    let body = server.get("/agui/messages/main").await.text();
    assert!(body.contains("hello"));
    assert!(body.contains("scripted reply"));
}

#[tokio::test]
async fn duplicate_run_trigger_is_not_found() {
    let (pool, server) = setup();
    let thread = pool.get_or_create("main").await;
    let run_id = thread.submit_message("hello", "Alice").await;

    server
        .get(&format!("/agui/run/main/{run_id}"))
        .await
        .assert_status_ok();
    let response = server.get(&format!("/agui/run/main/{run_id}")).await;
    assert_eq!(response.status_code(), 404);

    // The transcript holds exactly one user/assistant pair.
    let transcript = pool.get_or_create("main").await.transcript().await;
    assert_eq!(transcript.len(), 2);
}

/// Counts how many times the agent is asked for a stream.
struct CountingAgent {
    invocations: Arc<AtomicUsize>,
}

#[async_trait]
impl AgentRunner for CountingAgent {
    async fn run(&self, input: RunInput) -> EventStream {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        scripted_stream(vec![AgentEvent::RunFinished {
            run_id: input.run_id,
        }])
    }
}

#[tokio::test]
async fn concurrent_triggers_invoke_the_agent_exactly_once() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let pool = Arc::new(ThreadPool::new(json!({})));
    let state = AppState::new(
        pool.clone(),
        Arc::new(CountingAgent {
            invocations: invocations.clone(),
        }),
        Arc::new(HtmxRenderer),
    );
    let server = TestServer::new(agui_router(state)).expect("test server");

    let thread = pool.get_or_create("main").await;
    let run_id = thread.submit_message("hello", "Alice").await;

    // Two tabs race on the same run trigger; the run is claimed before
    // the agent is invoked, so the loser must 404 without a second run.
    let url = format!("/agui/run/main/{run_id}");
    let (first, second) = tokio::join!(server.get(&url), server.get(&url));
    let mut codes = [first.status_code().as_u16(), second.status_code().as_u16()];
    codes.sort();
    assert_eq!(codes, [200, 404]);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_run_is_not_found() {
    let (_pool, server) = setup();
    let response = server.get("/agui/run/main/no-such-run").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn state_fragment_shows_the_current_snapshot() {
    let (pool, server) = setup();
    let thread = pool.get_or_create("main").await;
    let run_id = thread.submit_message("hello", "Alice").await;
    server
        .get(&format!("/agui/run/main/{run_id}"))
        .await
        .assert_status_ok();

    let body = server.get("/agui/ui/main/state").await.text();
    assert!(body.contains(r#"id="agui-state""#));
    assert!(body.contains(r#""replies": 1"#));
}

#[tokio::test]
async fn suggestions_round_trip_with_truncation() {
    let (_pool, server) = setup();

    let response = server
        .post("/agui/suggestions/main")
        .json(&json!(["a", "b", "c", "d", "e"]))
        .await;
    assert_eq!(response.status_code(), 204);

    let listed: Vec<String> = server.get("/agui/suggestions/main").await.json();
    assert_eq!(listed, vec!["a", "b", "c", "d"]);
}

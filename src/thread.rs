//! The thread (session) manager: one conversation's authoritative message
//! history, shared state, pending runs, thinking trace, suggestions, and
//! live subscribers.
//!
//! All mutation is serialized through one async mutex. The lock is held
//! only across synchronous apply-and-broadcast sections, never across an
//! await on the event stream, so consuming a run cannot starve other
//! operations on the same thread.

use std::collections::{HashMap, VecDeque};

use futures::StreamExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::EventStream;
use crate::error::AguiError;
use crate::event::AgentEvent;
use crate::model::{Message, RunInput, RunPhase, TraceKind, TraceStep};
use crate::notify::{target, Payload, UiNotification};
use crate::project::{project, RunProgress, StateChange};
use crate::registry::{DeliverySender, SubscriberRegistry};

/// Suggestions are replaced wholesale and never exceed this length.
pub const MAX_SUGGESTIONS: usize = 4;

/// The thinking trace is display-only; keep a bounded window rather than
/// growing for the life of the thread.
const TRACE_CAP: usize = 256;

/// Run phases are kept for status queries after a run completes; once a
/// thread has seen this many runs, the oldest terminal phases are dropped.
const RUN_PHASE_CAP: usize = 256;

pub struct ChatThread {
    id: String,
    assistant_name: String,
    inner: Mutex<ThreadInner>,
}

struct ThreadInner {
    history: Vec<Message>,
    shared_state: Value,
    pending_runs: HashMap<String, RunInput>,
    run_phases: HashMap<String, RunPhase>,
    // Insertion order of `run_phases` keys, for bounded eviction.
    phase_order: VecDeque<String>,
    progress: HashMap<String, RunProgress>,
    registry: SubscriberRegistry,
    suggestions: Vec<String>,
    trace: Vec<TraceStep>,
}

impl ChatThread {
    pub(crate) fn new(
        id: impl Into<String>,
        initial_state: Value,
        assistant_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            assistant_name: assistant_name.into(),
            inner: Mutex::new(ThreadInner {
                history: Vec::new(),
                shared_state: initial_state,
                pending_runs: HashMap::new(),
                run_phases: HashMap::new(),
                phase_order: VecDeque::new(),
                progress: HashMap::new(),
                registry: SubscriberRegistry::new(),
                suggestions: Vec::new(),
                trace: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn subscribe(&self, connection_id: impl Into<String>, sender: DeliverySender) {
        self.inner.lock().await.registry.subscribe(connection_id, sender);
    }

    pub async fn unsubscribe(&self, connection_id: &str) {
        self.inner.lock().await.registry.unsubscribe(connection_id);
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }

    /// Append a user message, record a pending run snapshot, and notify
    /// subscribers that a run is starting. Returns the new run id. Never
    /// blocks on the agent; consumption is triggered separately.
    pub async fn submit_message(&self, text: &str, author: &str) -> String {
        let mut inner = self.inner.lock().await;

        inner.history.push(Message::user(author, text));

        let run_id = Uuid::new_v4().to_string();
        let input = RunInput {
            thread_id: self.id.clone(),
            run_id: run_id.clone(),
            messages: inner.history.clone(),
            state: inner.shared_state.clone(),
        };
        inner.pending_runs.insert(run_id.clone(), input);
        inner.set_phase(&run_id, RunPhase::Submitted);
        info!(thread_id = %self.id, run_id = %run_id, "message submitted, run pending");

        let notifications = [
            UiNotification::replace(
                target::CHAT_MESSAGES,
                Payload::Transcript {
                    messages: inner.history.clone(),
                },
            ),
            UiNotification::replace(
                target::CHAT_STATUS,
                Payload::RunTrigger {
                    thread_id: self.id.clone(),
                    run_id: run_id.clone(),
                },
            ),
            UiNotification::replace(
                target::CHAT_INPUT,
                Payload::ClearInput {
                    thread_id: self.id.clone(),
                },
            ),
        ];
        inner.registry.broadcast_all(&notifications);

        run_id
    }

    /// Read-only copy of a pending run's input snapshot. Present only
    /// between submission and the start of consumption.
    pub async fn run_input(&self, run_id: &str) -> Option<RunInput> {
        self.inner.lock().await.pending_runs.get(run_id).cloned()
    }

    pub async fn run_phase(&self, run_id: &str) -> Option<RunPhase> {
        self.inner.lock().await.run_phases.get(run_id).copied()
    }

    /// Atomically take ownership of a pending run: the `pending_runs`
    /// entry is removed, the phase moves to `Streaming`, and the run's
    /// input snapshot is returned. Exactly one caller wins; everyone else
    /// gets [`AguiError::RunNotFound`] and must not start an agent.
    pub async fn claim_run(&self, run_id: &str) -> Result<RunInput, AguiError> {
        let mut inner = self.inner.lock().await;
        let Some(input) = inner.pending_runs.remove(run_id) else {
            warn!(thread_id = %self.id, run_id = %run_id, "run not found or already claimed");
            return Err(AguiError::RunNotFound {
                run_id: run_id.to_string(),
            });
        };
        inner.set_phase(run_id, RunPhase::Streaming);
        inner.progress.insert(run_id.to_string(), RunProgress::default());
        Ok(input)
    }

    /// Consume a pending run's event stream to completion, applying each
    /// event to the authoritative state exactly once and in arrival
    /// order, broadcasting the derived notifications before the next
    /// event is taken from the stream.
    ///
    /// Fails with [`AguiError::RunNotFound`] for unknown ids and for runs
    /// already claimed or consumed; that path mutates nothing. A stream
    /// that ends without a terminal event is treated as errored.
    pub async fn consume_run(
        &self,
        run_id: &str,
        events: EventStream,
    ) -> Result<(), AguiError> {
        self.claim_run(run_id).await?;
        self.consume_claimed(run_id, events).await;
        Ok(())
    }

    /// Drain the event stream of a run previously taken with
    /// [`ChatThread::claim_run`]. Split from the claim so callers can
    /// secure the run before asking an agent to produce the stream.
    pub async fn consume_claimed(&self, run_id: &str, mut events: EventStream) {
        info!(thread_id = %self.id, run_id = %run_id, "consuming run events");

        while let Some(event) = events.next().await {
            let mut inner = self.inner.lock().await;
            inner.apply_event(run_id, &event, &self.assistant_name);
        }

        let mut inner = self.inner.lock().await;
        if inner.run_phases.get(run_id) == Some(&RunPhase::Streaming) {
            // The source went away mid-run. Surface it like an upstream
            // error so subscribers never watch a spinner forever.
            warn!(thread_id = %self.id, run_id = %run_id, "event stream ended without terminal event");
            inner.apply_event(
                run_id,
                &AgentEvent::RunError {
                    message: "agent stream ended unexpectedly".into(),
                },
                &self.assistant_name,
            );
        }
        inner.progress.remove(run_id);
    }

    /// Replace the suggestion list wholesale, truncated to
    /// [`MAX_SUGGESTIONS`]. An empty list broadcasts an explicit clear so
    /// subscribers never observe stale buttons.
    pub async fn set_suggestions(&self, suggestions: Vec<String>) {
        let mut inner = self.inner.lock().await;
        let mut suggestions = suggestions;
        suggestions.truncate(MAX_SUGGESTIONS);
        inner.suggestions = suggestions.clone();
        let notification = if suggestions.is_empty() {
            UiNotification::clear(target::SUGGESTION_BUTTONS)
        } else {
            UiNotification::replace(
                target::SUGGESTION_BUTTONS,
                Payload::Suggestions { suggestions },
            )
        };
        inner.registry.broadcast(&notification);
    }

    /// Snapshot copy; callers never observe later mutation through it.
    pub async fn suggestions(&self) -> Vec<String> {
        self.inner.lock().await.suggestions.clone()
    }

    /// Read-only copy of the transcript, in display order.
    pub async fn transcript(&self) -> Vec<Message> {
        self.inner.lock().await.history.clone()
    }

    /// Read-only snapshot of the shared state.
    pub async fn state_snapshot(&self) -> Value {
        self.inner.lock().await.shared_state.clone()
    }

    pub async fn trace(&self) -> Vec<TraceStep> {
        self.inner.lock().await.trace.clone()
    }
}

impl ThreadInner {
    fn apply_event(&mut self, run_id: &str, event: &AgentEvent, assistant_name: &str) {
        if matches!(event, AgentEvent::Unknown) {
            debug!(run_id = %run_id, "ignoring unknown event variant");
            return;
        }
        let progress = self.progress.entry(run_id.to_string()).or_default().clone();
        let projection = project(event, &progress);
        for change in projection.changes {
            self.apply_change(run_id, change, assistant_name);
        }
        self.registry.broadcast_all(&projection.notifications);
    }

    fn apply_change(&mut self, run_id: &str, change: StateChange, assistant_name: &str) {
        match change {
            StateChange::BeginAssistantMessage { message_id } => {
                let progress = self.progress.entry(run_id.to_string()).or_default();
                progress.message_id = Some(message_id);
                progress.content.clear();
            }
            StateChange::AppendAssistantDelta { delta } => {
                self.progress
                    .entry(run_id.to_string())
                    .or_default()
                    .content
                    .push_str(&delta);
            }
            StateChange::FinalizeAssistantMessage => {
                let progress = self.progress.entry(run_id.to_string()).or_default();
                if let Some(message_id) = progress.message_id.take() {
                    let content = std::mem::take(&mut progress.content);
                    self.history
                        .push(Message::assistant(message_id, assistant_name, content));
                }
            }
            StateChange::ReplaceState { snapshot } => {
                self.shared_state = snapshot;
            }
            StateChange::RecordTrace {
                kind,
                name,
                reference,
            } => {
                self.push_trace(kind, name, reference);
            }
            StateChange::SetPhase { phase } => {
                self.set_phase(run_id, phase);
            }
        }
    }

    fn set_phase(&mut self, run_id: &str, phase: RunPhase) {
        if self.run_phases.insert(run_id.to_string(), phase).is_some() {
            return;
        }
        self.phase_order.push_back(run_id.to_string());
        if self.phase_order.len() <= RUN_PHASE_CAP {
            return;
        }
        // Evict the oldest terminal phase; live runs are never dropped.
        for _ in 0..self.phase_order.len() {
            let Some(oldest) = self.phase_order.pop_front() else {
                break;
            };
            match self.run_phases.get(&oldest) {
                Some(RunPhase::Finished) | Some(RunPhase::Errored) => {
                    self.run_phases.remove(&oldest);
                    break;
                }
                _ => self.phase_order.push_back(oldest),
            }
        }
    }

    fn push_trace(&mut self, kind: TraceKind, name: String, reference: Option<String>) {
        if self.trace.len() == TRACE_CAP {
            self.trace.remove(0);
        }
        self.trace.push(TraceStep {
            kind,
            name,
            reference,
            recorded_at: chrono::Utc::now(),
        });
    }
}

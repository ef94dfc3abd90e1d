//! Event-to-delta-update projection.
//!
//! [`project`] is the single place where a protocol event turns into
//! state-change instructions and addressed UI notifications. It is pure:
//! no I/O, no clock, no access to the thread beyond the per-run progress
//! record handed in. The thread applies every change and then broadcasts
//! every notification before the next event is consumed, so notification
//! order always matches event order.

use serde_json::Value;

use crate::event::AgentEvent;
use crate::model::{RunPhase, TraceKind};
use crate::notify::{target, Payload, UiNotification};

/// Accumulation record for one run's in-flight assistant message.
#[derive(Debug, Clone, Default)]
pub struct RunProgress {
    /// Set by `TextMessageStart`; identifies the streaming message.
    pub message_id: Option<String>,
    /// Content accumulated from text deltas so far.
    pub content: String,
}

/// Mutation instructions the thread executes against its authoritative
/// state. Closed set, mirrored one-to-one by `ThreadInner::apply_change`.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    BeginAssistantMessage { message_id: String },
    AppendAssistantDelta { delta: String },
    /// Move the accumulated assistant message into the transcript.
    FinalizeAssistantMessage,
    /// Whole-value replacement of the shared state.
    ReplaceState { snapshot: Value },
    RecordTrace {
        kind: TraceKind,
        name: String,
        reference: Option<String>,
    },
    SetPhase { phase: RunPhase },
}

#[derive(Debug, Default)]
pub struct Projection {
    pub changes: Vec<StateChange>,
    pub notifications: Vec<UiNotification>,
}

impl Projection {
    fn change(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }

    fn notify(mut self, notification: UiNotification) -> Self {
        self.notifications.push(notification);
        self
    }
}

/// Map one event to its projection. Total over the closed event set:
/// every variant has defined behavior, and `Unknown` projects to nothing.
pub fn project(event: &AgentEvent, progress: &RunProgress) -> Projection {
    let p = Projection::default();
    match event {
        AgentEvent::RunStarted { .. } => p.notify(UiNotification::replace(
            target::CHAT_STATUS,
            Payload::RunStatus {
                label: "thinking".into(),
            },
        )),

        AgentEvent::TextMessageStart { message_id } => p
            .change(StateChange::BeginAssistantMessage {
                message_id: message_id.clone(),
            })
            .notify(UiNotification::append(
                target::CHAT_MESSAGES,
                Payload::MessageShell {
                    message_id: message_id.clone(),
                },
            )),

        AgentEvent::TextMessageContent { message_id, delta } => p
            .change(StateChange::AppendAssistantDelta {
                delta: delta.clone(),
            })
            .notify(UiNotification::append(
                target::message_content(message_id),
                Payload::TextDelta {
                    delta: delta.clone(),
                },
            )),

        AgentEvent::TextMessageEnd { message_id } => p.notify(UiNotification::replace(
            target::streaming(message_id),
            Payload::StreamEnded,
        )),

        AgentEvent::ToolCallStart {
            tool_call_id,
            tool_call_name,
        } => p
            .change(StateChange::RecordTrace {
                kind: TraceKind::ToolCall,
                name: tool_call_name.clone(),
                reference: Some(tool_call_id.clone()),
            })
            .notify(UiNotification::append(
                target::CHAT_MESSAGES,
                Payload::ToolIndicator {
                    tool_call_id: tool_call_id.clone(),
                    tool_call_name: tool_call_name.clone(),
                },
            ))
            .notify(UiNotification::append(
                target::THINKING_STEPS,
                Payload::TraceStarted {
                    kind: TraceKind::ToolCall,
                    name: tool_call_name.clone(),
                    reference: Some(tool_call_id.clone()),
                },
            )),

        AgentEvent::ToolCallEnd { tool_call_id } => p.notify(UiNotification::replace(
            target::thinking_tool(tool_call_id),
            Payload::TraceFinished,
        )),

        AgentEvent::StepStarted { step_name } => p
            .change(StateChange::RecordTrace {
                kind: TraceKind::Step,
                name: step_name.clone(),
                reference: None,
            })
            .notify(UiNotification::append(
                target::THINKING_STEPS,
                Payload::TraceStarted {
                    kind: TraceKind::Step,
                    name: step_name.clone(),
                    reference: None,
                },
            )),

        AgentEvent::StepFinished { step_name } => p.notify(UiNotification::replace(
            target::thinking_step(step_name),
            Payload::TraceFinished,
        )),

        AgentEvent::StateSnapshot { snapshot } => p
            .change(StateChange::ReplaceState {
                snapshot: snapshot.clone(),
            })
            .notify(UiNotification::replace(
                target::STATE_PANEL,
                Payload::StateView {
                    state: snapshot.clone(),
                },
            )),

        AgentEvent::ReasoningStart { message_id } => p
            .change(StateChange::RecordTrace {
                kind: TraceKind::Reasoning,
                name: "reasoning".into(),
                reference: Some(message_id.clone()),
            })
            .notify(UiNotification::append(
                target::THINKING_STEPS,
                Payload::TraceStarted {
                    kind: TraceKind::Reasoning,
                    name: "reasoning".into(),
                    reference: Some(message_id.clone()),
                },
            )),

        AgentEvent::ReasoningContent { message_id, delta } => p.notify(UiNotification::append(
            target::thinking_reason(message_id),
            Payload::TextDelta {
                delta: delta.clone(),
            },
        )),

        AgentEvent::ReasoningEnd { message_id } => p.notify(UiNotification::replace(
            target::thinking_reason(message_id),
            Payload::TraceFinished,
        )),

        AgentEvent::RunFinished { .. } => {
            let mut p = p
                .change(StateChange::FinalizeAssistantMessage)
                .change(StateChange::SetPhase {
                    phase: RunPhase::Finished,
                });
            if let Some(message_id) = &progress.message_id {
                p = p.notify(UiNotification::replace(
                    target::message(message_id),
                    Payload::FinalMessage {
                        message_id: message_id.clone(),
                        content: progress.content.clone(),
                    },
                ));
            }
            p.notify(UiNotification::clear(target::CHAT_STATUS))
        }

        AgentEvent::RunError { message } => p
            .change(StateChange::RecordTrace {
                kind: TraceKind::Error,
                name: message.clone(),
                reference: None,
            })
            .change(StateChange::SetPhase {
                phase: RunPhase::Errored,
            })
            .notify(UiNotification::append(
                target::THINKING_STEPS,
                Payload::TraceError {
                    message: message.clone(),
                },
            ))
            .notify(UiNotification::clear(target::CHAT_STATUS)),

        AgentEvent::Unknown => p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn progress_with(message_id: &str, content: &str) -> RunProgress {
        RunProgress {
            message_id: Some(message_id.into()),
            content: content.into(),
        }
    }

    #[test]
    fn text_delta_addresses_the_message_content_element() {
        let projection = project(
            &AgentEvent::TextMessageContent {
                message_id: "m1".into(),
                delta: "Hi".into(),
            },
            &progress_with("m1", ""),
        );
        assert_eq!(
            projection.changes,
            vec![StateChange::AppendAssistantDelta { delta: "Hi".into() }]
        );
        assert_eq!(projection.notifications.len(), 1);
        assert_eq!(projection.notifications[0].target, "message-content-m1");
    }

    #[test]
    fn run_finished_reconciles_streamed_content_to_the_same_address() {
        let projection = project(
            &AgentEvent::RunFinished { run_id: "r1".into() },
            &progress_with("m1", "Hi there"),
        );
        assert!(projection
            .changes
            .contains(&StateChange::FinalizeAssistantMessage));
        let final_note = &projection.notifications[0];
        assert_eq!(final_note.target, "message-m1");
        assert_eq!(
            final_note.payload,
            Payload::FinalMessage {
                message_id: "m1".into(),
                content: "Hi there".into()
            }
        );
        // Status indicator is cleared last.
        assert_eq!(projection.notifications[1].target, "chat-status");
    }

    #[test]
    fn run_finished_without_streamed_message_only_clears_status() {
        let projection = project(
            &AgentEvent::RunFinished { run_id: "r1".into() },
            &RunProgress::default(),
        );
        assert_eq!(projection.notifications.len(), 1);
        assert_eq!(projection.notifications[0].target, "chat-status");
    }

    #[test]
    fn state_snapshot_is_whole_value_replace() {
        let projection = project(
            &AgentEvent::StateSnapshot {
                snapshot: json!({"count": 2}),
            },
            &RunProgress::default(),
        );
        assert_eq!(
            projection.changes,
            vec![StateChange::ReplaceState {
                snapshot: json!({"count": 2})
            }]
        );
    }

    #[test]
    fn run_error_records_trace_and_phase_without_touching_history() {
        let projection = project(
            &AgentEvent::RunError {
                message: "model overloaded".into(),
            },
            &RunProgress::default(),
        );
        assert!(!projection
            .changes
            .contains(&StateChange::FinalizeAssistantMessage));
        assert!(projection.changes.contains(&StateChange::SetPhase {
            phase: RunPhase::Errored
        }));
    }

    #[test]
    fn every_variant_projects_without_panicking() {
        let events = vec![
            AgentEvent::RunStarted { run_id: "r".into() },
            AgentEvent::RunFinished { run_id: "r".into() },
            AgentEvent::RunError { message: "e".into() },
            AgentEvent::TextMessageStart { message_id: "m".into() },
            AgentEvent::TextMessageContent {
                message_id: "m".into(),
                delta: "d".into(),
            },
            AgentEvent::TextMessageEnd { message_id: "m".into() },
            AgentEvent::ToolCallStart {
                tool_call_id: "t".into(),
                tool_call_name: "n".into(),
            },
            AgentEvent::ToolCallEnd { tool_call_id: "t".into() },
            AgentEvent::StepStarted { step_name: "s".into() },
            AgentEvent::StepFinished { step_name: "s".into() },
            AgentEvent::StateSnapshot { snapshot: json!({}) },
            AgentEvent::ReasoningStart { message_id: "m".into() },
            AgentEvent::ReasoningContent {
                message_id: "m".into(),
                delta: "d".into(),
            },
            AgentEvent::ReasoningEnd { message_id: "m".into() },
            AgentEvent::Unknown,
        ];
        for event in &events {
            let _ = project(event, &RunProgress::default());
        }
        // Unknown projects to nothing.
        let projection = project(&AgentEvent::Unknown, &RunProgress::default());
        assert!(projection.changes.is_empty());
        assert!(projection.notifications.is_empty());
    }
}

//! Addressed UI-update notifications.
//!
//! A notification names a target element, an update mode, and a semantic
//! payload. The core never constructs markup; turning a payload into a
//! renderable fragment is the renderer's job (see [`crate::render`]).

use serde::Serialize;
use serde_json::Value;

use crate::model::{Message, TraceKind};

/// Well-known target element ids, shared vocabulary between the projector
/// and whatever renderer is plugged in.
pub mod target {
    pub const CHAT_MESSAGES: &str = "chat-messages";
    pub const CHAT_STATUS: &str = "chat-status";
    pub const CHAT_INPUT: &str = "chat-input-container";
    pub const SUGGESTION_BUTTONS: &str = "suggestion-buttons";
    pub const STATE_PANEL: &str = "agui-state";
    pub const THINKING_STEPS: &str = "thinking-steps";

    pub fn message(message_id: &str) -> String {
        format!("message-{message_id}")
    }

    pub fn message_content(message_id: &str) -> String {
        format!("message-content-{message_id}")
    }

    pub fn streaming(message_id: &str) -> String {
        format!("streaming-{message_id}")
    }

    pub fn thinking_tool(tool_call_id: &str) -> String {
        format!("thinking-tool-{tool_call_id}")
    }

    pub fn thinking_step(step_name: &str) -> String {
        format!("thinking-step-{step_name}")
    }

    pub fn thinking_reason(message_id: &str) -> String {
        format!("thinking-reason-{message_id}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    Replace,
    Append,
    Clear,
}

/// Renderer-agnostic description of what goes into the target element.
/// Tagged with `type` like [`crate::event::AgentEvent`]; `kind` stays
/// free for variant fields such as [`Payload::TraceStarted`]'s.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// The full transcript, newest last.
    Transcript { messages: Vec<Message> },
    /// Empty shell for an assistant message that is about to stream.
    MessageShell { message_id: String },
    /// One text delta for an in-flight message.
    TextDelta { delta: String },
    /// Final reconciled content for a finished assistant message,
    /// addressed to the same element the streaming deltas went to.
    FinalMessage { message_id: String, content: String },
    /// The streaming cursor for a message goes away.
    StreamEnded,
    /// Compact in-transcript indicator that a tool is running.
    ToolIndicator {
        tool_call_id: String,
        tool_call_name: String,
    },
    /// A new thinking-trace entry began.
    TraceStarted {
        kind: TraceKind,
        name: String,
        reference: Option<String>,
    },
    /// A thinking-trace entry completed.
    TraceFinished,
    /// Upstream run error surfaced to the thinking trace.
    TraceError { message: String },
    /// Run status line ("thinking", cleared, ...).
    RunStatus { label: String },
    /// Instructs the client to trigger consumption of a pending run.
    RunTrigger { thread_id: String, run_id: String },
    /// Reset the message input for a thread.
    ClearInput { thread_id: String },
    /// Wholesale replacement of the suggestion buttons.
    Suggestions { suggestions: Vec<String> },
    /// Current shared state for display.
    StateView { state: Value },
    Empty,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UiNotification {
    pub target: String,
    pub mode: UpdateMode,
    pub payload: Payload,
}

impl UiNotification {
    pub fn replace(target: impl Into<String>, payload: Payload) -> Self {
        Self {
            target: target.into(),
            mode: UpdateMode::Replace,
            payload,
        }
    }

    pub fn append(target: impl Into<String>, payload: Payload) -> Self {
        Self {
            target: target.into(),
            mode: UpdateMode::Append,
            payload,
        }
    }

    pub fn clear(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            mode: UpdateMode::Clear,
            payload: Payload::Empty,
        }
    }
}

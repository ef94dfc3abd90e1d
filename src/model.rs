//! Core data types shared by the thread manager, projector, and glue
//! layers: messages, run snapshots, run phases, and thinking-trace steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry in a thread's transcript. Assistant messages grow in place
/// while their run is streaming and become immutable once the run's
/// terminal event is processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            author: author.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(
        id: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::Assistant,
            author: author.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Point-in-time input snapshot for one agent invocation: the transcript
/// and shared state exactly as they were when the user message was
/// submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInput {
    pub thread_id: String,
    pub run_id: String,
    pub messages: Vec<Message>,
    pub state: Value,
}

/// Lifecycle of one run: `Submitted -> Streaming -> Finished | Errored`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Submitted,
    Streaming,
    Finished,
    Errored,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Streaming => write!(f, "streaming"),
            Self::Finished => write!(f, "finished"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    ToolCall,
    Step,
    Reasoning,
    Error,
}

/// Auxiliary-display record of one tool call, reasoning burst, step, or
/// upstream error observed while a run was streaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceStep {
    pub kind: TraceKind,
    pub name: String,
    /// Source-side id this step refers to (tool call id or message id).
    pub reference: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

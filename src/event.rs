//! Protocol events emitted by one agent run.
//!
//! The wire shape follows the AG-UI convention: a `type` discriminant in
//! SCREAMING_SNAKE_CASE with camelCase payload fields. The set is closed
//! on our side; anything a newer event source emits that we do not know
//! deserializes to [`AgentEvent::Unknown`] and is ignored downstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentEvent {
    #[serde(rename_all = "camelCase")]
    RunStarted { run_id: String },
    #[serde(rename_all = "camelCase")]
    RunFinished { run_id: String },
    RunError { message: String },
    #[serde(rename_all = "camelCase")]
    TextMessageStart { message_id: String },
    #[serde(rename_all = "camelCase")]
    TextMessageContent { message_id: String, delta: String },
    #[serde(rename_all = "camelCase")]
    TextMessageEnd { message_id: String },
    #[serde(rename_all = "camelCase")]
    ToolCallStart {
        tool_call_id: String,
        tool_call_name: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolCallEnd { tool_call_id: String },
    #[serde(rename_all = "camelCase")]
    StepStarted { step_name: String },
    #[serde(rename_all = "camelCase")]
    StepFinished { step_name: String },
    /// Whole-value replacement of the thread's shared state. The thread
    /// never computes state deltas itself; the source already produced
    /// the complete new snapshot.
    StateSnapshot { snapshot: Value },
    /// Reasoning events are optional on the source side. Their absence is
    /// a missing capability, not an error.
    #[serde(rename_all = "camelCase")]
    ReasoningStart { message_id: String },
    #[serde(rename_all = "camelCase")]
    ReasoningContent { message_id: String, delta: String },
    #[serde(rename_all = "camelCase")]
    ReasoningEnd { message_id: String },
    /// Forward compatibility: event types this crate does not know yet.
    #[serde(other)]
    Unknown,
}

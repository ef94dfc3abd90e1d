//! Boundary to the agent runtime.
//!
//! The runtime itself is an external collaborator; all this crate needs
//! from it is an asynchronous, in-order sequence of [`AgentEvent`]s for
//! one run.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::event::AgentEvent;
use crate::model::RunInput;

/// The event sequence produced by one agent invocation. Events arrive in
/// the order the source produced them and the stream is read at most once
/// to completion.
pub type EventStream = Pin<Box<dyn Stream<Item = AgentEvent> + Send>>;

#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Start one agent invocation against the given input snapshot and
    /// return its event stream.
    async fn run(&self, input: RunInput) -> EventStream;
}

/// Wrap a fixed event sequence as an [`EventStream`]. Handy for tests and
/// scripted demo agents.
pub fn scripted_stream(events: Vec<AgentEvent>) -> EventStream {
    Box::pin(tokio_stream::iter(events))
}

//! agui-web: binds a conversational agent's streamed protocol events to
//! a live, multi-client web UI.
//!
//! The core is transport-agnostic: per-thread session state, in-order
//! event application, and addressed UI-update notifications fanned out to
//! every subscriber. The `render` and `server` modules are the default
//! htmx/axum glue around it.

pub mod agent;
pub mod error;
pub mod event;
pub mod model;
pub mod notify;
pub mod pool;
pub mod project;
pub mod registry;
pub mod render;
pub mod server;
pub mod thread;

pub use agent::{scripted_stream, AgentRunner, EventStream};
pub use error::AguiError;
pub use event::AgentEvent;
pub use model::{Message, MessageRole, RunInput, RunPhase, TraceKind, TraceStep};
pub use notify::{Payload, UiNotification, UpdateMode};
pub use pool::ThreadPool;
pub use render::{HtmxRenderer, RenderNotification};
pub use thread::{ChatThread, MAX_SUGGESTIONS};

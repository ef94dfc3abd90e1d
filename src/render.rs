//! Default HTML renderer: turns addressed notifications into htmx
//! out-of-band swap fragments.
//!
//! The core emits [`UiNotification`]s and nothing else; this module is
//! the pluggable policy that maps them to markup. Transports that want a
//! different wire format implement [`RenderNotification`] themselves.

use serde_json::Value;

use crate::model::{Message, MessageRole, TraceKind};
use crate::notify::{target, Payload, UiNotification, UpdateMode};

pub trait RenderNotification: Send + Sync {
    fn render(&self, notification: &UiNotification) -> String;
}

/// Renders htmx `hx-swap-oob` fragments: append maps to `beforeend`,
/// replace and clear to `innerHTML` on the target element.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmxRenderer;

impl RenderNotification for HtmxRenderer {
    fn render(&self, notification: &UiNotification) -> String {
        let body = payload_body(&notification.payload);
        let swap = match notification.mode {
            UpdateMode::Append => "beforeend",
            UpdateMode::Replace | UpdateMode::Clear => "innerHTML",
        };
        let tag = match notification.payload {
            Payload::TextDelta { .. } | Payload::StreamEnded | Payload::TraceFinished => "span",
            _ => "div",
        };
        format!(
            r#"<{tag} id="{id}" hx-swap-oob="{swap}">{body}</{tag}>"#,
            id = attr(&notification.target),
        )
    }
}

fn payload_body(payload: &Payload) -> String {
    match payload {
        Payload::Transcript { messages } => messages.iter().map(message_div).collect(),
        Payload::MessageShell { message_id } => format!(
            r#"<div class="chat-message chat-assistant" id="message-{id}"><div class="chat-message-content"><span class="marked" id="message-content-{id}"></span><span class="chat-streaming" id="streaming-{id}"></span></div></div>"#,
            id = attr(message_id),
        ),
        Payload::TextDelta { delta } => text(delta),
        Payload::FinalMessage { message_id, content } => format!(
            r#"<div class="chat-message-content marked" id="content-{id}">{content}</div>"#,
            id = attr(message_id),
            content = text(content),
        ),
        Payload::StreamEnded => String::new(),
        Payload::ToolIndicator {
            tool_call_id,
            tool_call_name,
        } => format!(
            r#"<div class="chat-message chat-tool" id="tool-{id}"><div class="chat-message-content">Using {name}...</div></div>"#,
            id = attr(tool_call_id),
            name = text(tool_call_name),
        ),
        Payload::TraceStarted {
            kind,
            name,
            reference,
        } => trace_started(*kind, name, reference.as_deref()),
        Payload::TraceFinished => "Done".to_string(),
        Payload::TraceError { message } => format!(
            r#"<div class="thinking-step thinking-error"><div class="thinking-step-header">Error</div><div class="thinking-step-body">{msg}</div></div>"#,
            msg = text(message),
        ),
        Payload::RunStatus { label } => format!("...{}...", text(label)),
        Payload::RunTrigger { thread_id, run_id } => format!(
            r#"...thinking...<div id="run-trigger-{run}" hx-get="/agui/run/{thread}/{run}" hx-trigger="load" style="display: none;"></div>"#,
            run = attr(run_id),
            thread = attr(thread_id),
        ),
        Payload::ClearInput { thread_id } => input_form(thread_id),
        Payload::Suggestions { suggestions } => suggestion_buttons(suggestions),
        Payload::StateView { state } => state_panel_body(state),
        Payload::Empty => String::new(),
    }
}

fn trace_started(kind: TraceKind, name: &str, reference: Option<&str>) -> String {
    let (header, cls, element_id) = match kind {
        TraceKind::ToolCall => (
            "Tool Call",
            "tool-call",
            target::thinking_tool(reference.unwrap_or(name)),
        ),
        TraceKind::Reasoning => (
            "Reasoning",
            "reasoning",
            target::thinking_reason(reference.unwrap_or(name)),
        ),
        TraceKind::Step | TraceKind::Error => ("Step", "step", target::thinking_step(name)),
    };
    format!(
        r#"<div class="thinking-step {cls}"><div class="thinking-step-header">{header}</div><div class="thinking-step-body thinking-streaming" id="{id}">{name}</div></div>"#,
        id = attr(&element_id),
        name = text(name),
    )
}

fn message_div(message: &Message) -> String {
    let role_class = match message.role {
        MessageRole::User => "chat-user",
        MessageRole::Assistant => "chat-assistant",
    };
    format!(
        r#"<div class="chat-message {role_class}" id="message-{id}"><div class="chat-message-content marked">{content}</div></div>"#,
        id = attr(&message.id),
        content = text(&message.content),
    )
}

/// Transcript container fragment, served on chat load and used by the
/// transcript route.
pub fn transcript_container(messages: &[Message]) -> String {
    let body: String = messages.iter().map(message_div).collect();
    format!(r#"<div id="chat-messages" class="chat-messages">{body}</div>"#)
}

fn suggestion_buttons(suggestions: &[String]) -> String {
    suggestions
        .iter()
        .map(|s| {
            // The quoted JS string literal still needs attribute escaping.
            let js_literal = serde_json::to_string(s).unwrap_or_default();
            format!(
                r#"<button class="suggestion-btn" onclick="document.getElementById('chat-input').value={value};document.getElementById('chat-form').requestSubmit();">{label}</button>"#,
                value = attr(&js_literal),
                label = text(s),
            )
        })
        .collect()
}

fn state_panel_body(state: &Value) -> String {
    let pretty = serde_json::to_string_pretty(state).unwrap_or_else(|_| state.to_string());
    format!("<pre>{}</pre>", text(&pretty))
}

/// Shared-state panel fragment for the state route.
pub fn state_panel(state: &Value) -> String {
    format!(
        r#"<div id="{id}">{body}</div>"#,
        id = target::STATE_PANEL,
        body = state_panel_body(state),
    )
}

fn input_form(thread_id: &str) -> String {
    format!(
        concat!(
            r#"<div id="suggestion-buttons"></div>"#,
            r#"<div id="chat-status" class="chat-status"></div>"#,
            r#"<form id="chat-form" class="chat-input-form" ws-send>"#,
            r#"<input type="hidden" name="thread_id" value="{thread}">"#,
            r#"<textarea id="chat-input" name="msg" class="chat-input-field" rows="1" placeholder="Type a message..." autofocus autocomplete="off"></textarea>"#,
            r#"<button type="submit" class="chat-input-button">Send</button>"#,
            r#"</form>"#,
        ),
        thread = attr(thread_id),
    )
}

/// Complete chat shell: websocket-connected container with the transcript
/// loader and the input form.
pub fn chat_shell(thread_id: &str) -> String {
    format!(
        concat!(
            r#"<div class="chat-container" hx-ext="ws" ws-connect="/agui/ws/{thread}">"#,
            r#"<div id="chat-messages" class="chat-messages" hx-get="/agui/messages/{thread}" hx-trigger="load" hx-swap="outerHTML"></div>"#,
            r#"<div id="chat-input-container" class="chat-input">{form}</div>"#,
            r#"</div>"#,
        ),
        thread = attr(thread_id),
        form = input_form(thread_id),
    )
}

fn text(raw: &str) -> String {
    html_escape::encode_text(raw).into_owned()
}

fn attr(raw: &str) -> String {
    html_escape::encode_double_quoted_attribute(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn append_renders_beforeend_swap() {
        let rendered = HtmxRenderer.render(&UiNotification::append(
            target::message_content("m1"),
            Payload::TextDelta {
                delta: "Hi".into(),
            },
        ));
        assert_eq!(
            rendered,
            r#"<span id="message-content-m1" hx-swap-oob="beforeend">Hi</span>"#
        );
    }

    #[test]
    fn replace_renders_inner_html_swap() {
        let rendered = HtmxRenderer.render(&UiNotification::clear(target::CHAT_STATUS));
        assert_eq!(rendered, r#"<div id="chat-status" hx-swap-oob="innerHTML"></div>"#);
    }

    #[test]
    fn message_content_is_escaped() {
        let rendered = HtmxRenderer.render(&UiNotification::append(
            target::message_content("m1"),
            Payload::TextDelta {
                delta: "<script>alert(1)</script>".into(),
            },
        ));
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }

    #[test]
    fn run_trigger_points_at_the_run_route() {
        let rendered = HtmxRenderer.render(&UiNotification::replace(
            target::CHAT_STATUS,
            Payload::RunTrigger {
                thread_id: "main".into(),
                run_id: "r1".into(),
            },
        ));
        assert!(rendered.contains(r#"hx-get="/agui/run/main/r1""#));
        assert!(rendered.contains(r#"hx-trigger="load""#));
    }

    #[test]
    fn state_view_pretty_prints_json() {
        let rendered = HtmxRenderer.render(&UiNotification::replace(
            target::STATE_PANEL,
            Payload::StateView {
                state: json!({"count": 2}),
            },
        ));
        assert!(rendered.contains("<pre>"));
        assert!(rendered.contains(r#""count": 2"#));
    }

    #[test]
    fn chat_shell_wires_websocket_and_loaders() {
        let shell = chat_shell("main");
        assert!(shell.contains(r#"ws-connect="/agui/ws/main""#));
        assert!(shell.contains(r#"hx-get="/agui/messages/main""#));
        assert!(shell.contains(r#"name="thread_id" value="main""#));
    }
}

//! Render output protocol: the versioned "current screen" channel.

use neural_desk_core::ToolError;
use serde::{Deserialize, Serialize};

/// The current screen as the kernel tracks it. One instance per session;
/// mutated only by an accepted `emit_screen` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutputState {
    pub revision: u64,
    pub latest_html: String,
    pub last_is_final: bool,
}

impl RenderOutputState {
    pub fn new() -> Self {
        Self {
            revision: 0,
            latest_html: String::new(),
            last_is_final: false,
        }
    }
}

impl Default for RenderOutputState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmitScreenArgs {
    pub html: String,
    #[serde(default)]
    pub is_final: Option<bool>,
}

/// The unit broadcast to observers after each accepted emit. Carries no
/// persistence obligation; the rendering layer consumes it as-is.
#[derive(Debug, Clone, Serialize)]
pub struct RenderEvent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub revision: u64,
    pub html: String,
    pub is_final: bool,
    pub tool_call_id: String,
}

pub fn validate_emit_screen_args(args: &serde_json::Value) -> Result<EmitScreenArgs, ToolError> {
    let args: EmitScreenArgs = serde_json::from_value(args.clone())
        .map_err(|e| ToolError::Validation(format!("emit_screen arguments: {e}")))?;
    if args.html.trim().is_empty() {
        return Err(ToolError::Validation(
            "emit_screen requires a non-empty html payload".into(),
        ));
    }
    Ok(args)
}

/// Advance the screen state by exactly one revision and build the event
/// for observers. `is_final` sticks to its previous value when omitted.
pub fn apply(
    state: &mut RenderOutputState,
    args: EmitScreenArgs,
    tool_call_id: &str,
) -> RenderEvent {
    state.revision += 1;
    state.last_is_final = args.is_final.unwrap_or(state.last_is_final);
    state.latest_html = args.html.clone();

    RenderEvent {
        kind: "render_output",
        revision: state.revision,
        html: args.html,
        is_final: state.last_is_final,
        tool_call_id: tool_call_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn revisions_increase_by_one() {
        let mut state = RenderOutputState::new();

        let first = validate_emit_screen_args(&json!({
            "html": "<div>first</div>", "is_final": false
        }))
        .unwrap();
        let event = apply(&mut state, first, "call-1");
        assert_eq!(event.revision, 1);
        assert_eq!(state.latest_html, "<div>first</div>");
        assert!(!state.last_is_final);

        let second = validate_emit_screen_args(&json!({
            "html": "<div>second</div>", "is_final": true
        }))
        .unwrap();
        let event = apply(&mut state, second, "call-2");
        assert_eq!(event.revision, 2);
        assert_eq!(state.latest_html, "<div>second</div>");
        assert!(state.last_is_final);
        assert!(event.is_final);
    }

    #[test]
    fn empty_html_is_denied() {
        for payload in [json!({"html": ""}), json!({"html": "   \n\t"})] {
            let err = validate_emit_screen_args(&payload).unwrap_err();
            assert!(err.to_string().contains("non-empty html"));
        }
    }

    #[test]
    fn missing_html_is_denied() {
        assert!(validate_emit_screen_args(&json!({})).is_err());
    }

    #[test]
    fn is_final_sticks_when_omitted() {
        let mut state = RenderOutputState::new();
        let args = validate_emit_screen_args(&json!({"html": "<p>a</p>", "is_final": true})).unwrap();
        apply(&mut state, args, "call-1");

        let args = validate_emit_screen_args(&json!({"html": "<p>b</p>"})).unwrap();
        let event = apply(&mut state, args, "call-2");
        assert!(state.last_is_final);
        assert!(event.is_final);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let mut state = RenderOutputState::new();
        let args = validate_emit_screen_args(&json!({"html": "<p>x</p>"})).unwrap();
        let event = apply(&mut state, args, "call-9");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "render_output");
        assert_eq!(value["revision"], 1);
        assert_eq!(value["tool_call_id"], "call-9");
    }
}

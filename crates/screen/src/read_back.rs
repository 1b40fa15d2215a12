//! Read-back budget: one free `read_screen` per turn, one more with an
//! explicit recovery flag, nothing after that.

use neural_desk_core::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::render::RenderOutputState;

/// Most interactive ids an outline payload will carry.
pub const OUTLINE_ID_CAP: usize = 30;

/// Structural tags the outline summarizes, in reporting order.
const OUTLINE_TAGS: &[&str] = &[
    "h1", "h2", "h3", "form", "table", "ul", "ol", "button", "input", "select", "textarea", "a",
];

/// Attribute marking an interactive element; its value is the element's
/// identifier.
const INTERACTION_ATTR: &str = "data-action=\"";

/// Per-turn read counter. Created fresh at turn start, discarded at turn
/// end; never shared across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadScreenUsage {
    pub read_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Meta,
    Outline,
    Snippet,
}

#[derive(Debug, Clone)]
pub struct ReadScreenArgs {
    pub mode: ReadMode,
    pub max_chars: usize,
    pub recovery: bool,
}

/// Parse and default `read_screen` arguments. `mode` defaults to `meta`,
/// `recovery` to false; `max_chars` clamps to the snippet ceiling.
pub fn validate_read_screen_args(
    args: &Value,
    snippet_ceiling: usize,
) -> Result<ReadScreenArgs, ToolError> {
    let mode = match args.get("mode") {
        None | Some(Value::Null) => ReadMode::Meta,
        Some(Value::String(s)) => match s.as_str() {
            "meta" => ReadMode::Meta,
            "outline" => ReadMode::Outline,
            "snippet" => ReadMode::Snippet,
            other => {
                return Err(ToolError::Validation(format!(
                    "unknown read_screen mode '{other}' (expected meta, outline, or snippet)"
                )))
            }
        },
        Some(_) => {
            return Err(ToolError::Validation(
                "read_screen mode must be a string".into(),
            ))
        }
    };

    let recovery = args
        .get("recovery")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let max_chars = args
        .get("max_chars")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(snippet_ceiling)
        .min(snippet_ceiling);

    Ok(ReadScreenArgs {
        mode,
        max_chars,
        recovery,
    })
}

/// Run one read-back against the current screen. Read-only with respect
/// to the render state; only the usage counter advances.
pub fn run_read_screen(
    args: ReadScreenArgs,
    render: &RenderOutputState,
    usage: &mut ReadScreenUsage,
) -> Result<String, ToolError> {
    if render.revision == 0 {
        return Err(ToolError::Precondition(
            "read_screen before first emit_screen".into(),
        ));
    }

    match usage.read_count {
        0 => {}
        1 if args.recovery => {}
        1 => {
            return Err(ToolError::BudgetExhausted(
                "second read_screen this turn requires recovery=true".into(),
            ))
        }
        _ => {
            return Err(ToolError::BudgetExhausted(
                "read_screen budget exceeded for this turn".into(),
            ))
        }
    }
    usage.read_count += 1;

    Ok(build_payload(&args, render))
}

fn build_payload(args: &ReadScreenArgs, render: &RenderOutputState) -> String {
    let html = &render.latest_html;
    match args.mode {
        ReadMode::Meta => json!({
            "revision": render.revision,
            "html_sha256": sha256_hex(html),
            "interaction_id_count": interaction_ids(html).len(),
        })
        .to_string(),
        ReadMode::Outline => {
            let mut ids = interaction_ids(html);
            ids.truncate(OUTLINE_ID_CAP);
            json!({
                "revision": render.revision,
                "tags": tag_summary(html),
                "interaction_ids": ids,
            })
            .to_string()
        }
        ReadMode::Snippet => {
            let snippet: String = html.chars().take(args.max_chars).collect();
            json!({
                "revision": render.revision,
                "snippet": snippet,
            })
            .to_string()
        }
    }
}

fn sha256_hex(html: &str) -> String {
    let digest = Sha256::digest(html.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Identifiers of interactive elements, in document order.
pub fn interaction_ids(html: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut rest = html;
    while let Some(pos) = rest.find(INTERACTION_ATTR) {
        let after = &rest[pos + INTERACTION_ATTR.len()..];
        match after.find('"') {
            Some(end) => {
                ids.push(after[..end].to_string());
                rest = &after[end..];
            }
            None => break,
        }
    }
    ids
}

fn tag_summary(html: &str) -> Value {
    let lower = html.to_ascii_lowercase();
    let mut summary = serde_json::Map::new();
    for tag in OUTLINE_TAGS {
        let open = format!("<{tag}");
        let count = lower
            .match_indices(&open)
            .filter(|(idx, _)| {
                // an opening tag ends with whitespace, '>' or '/'; skips
                // prefixes like <tablet matching <table
                lower[idx + open.len()..]
                    .chars()
                    .next()
                    .map(|c| c.is_whitespace() || c == '>' || c == '/')
                    .unwrap_or(false)
            })
            .count();
        if count > 0 {
            summary.insert((*tag).to_string(), json!(count));
        }
    }
    Value::Object(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rendered(html: &str) -> RenderOutputState {
        RenderOutputState {
            revision: 1,
            latest_html: html.to_string(),
            last_is_final: false,
        }
    }

    fn args(mode: ReadMode, recovery: bool) -> ReadScreenArgs {
        ReadScreenArgs {
            mode,
            max_chars: 4000,
            recovery,
        }
    }

    #[test]
    fn denied_before_first_emit() {
        let render = RenderOutputState::new();
        let mut usage = ReadScreenUsage::default();
        let err = run_read_screen(args(ReadMode::Meta, false), &render, &mut usage).unwrap_err();
        assert!(err.to_string().contains("before first emit_screen"));
        assert_eq!(usage.read_count, 0);
    }

    #[test]
    fn budget_sequence_one_free_one_recovery_then_deny() {
        let render = rendered("<div>screen</div>");
        let mut usage = ReadScreenUsage::default();

        assert!(run_read_screen(args(ReadMode::Meta, false), &render, &mut usage).is_ok());
        assert_eq!(usage.read_count, 1);

        let err =
            run_read_screen(args(ReadMode::Meta, false), &render, &mut usage).unwrap_err();
        assert!(err.to_string().contains("recovery=true"));
        assert_eq!(usage.read_count, 1);

        assert!(run_read_screen(args(ReadMode::Meta, true), &render, &mut usage).is_ok());
        assert_eq!(usage.read_count, 2);

        for recovery in [false, true] {
            let err =
                run_read_screen(args(ReadMode::Meta, recovery), &render, &mut usage).unwrap_err();
            assert!(err.to_string().contains("budget exceeded"));
        }
    }

    #[test]
    fn never_mutates_render_state() {
        let render = rendered("<div data-action=\"save\">x</div>");
        let before = serde_json::to_string(&render).unwrap();
        let mut usage = ReadScreenUsage::default();

        let _ = run_read_screen(args(ReadMode::Outline, false), &render, &mut usage);
        let _ = run_read_screen(args(ReadMode::Snippet, true), &render, &mut usage);
        let _ = run_read_screen(args(ReadMode::Meta, true), &render, &mut usage);

        let after = serde_json::to_string(&render).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn args_default_to_meta_and_no_recovery() {
        let parsed = validate_read_screen_args(&json!({}), 4000).unwrap();
        assert_eq!(parsed.mode, ReadMode::Meta);
        assert!(!parsed.recovery);
        assert_eq!(parsed.max_chars, 4000);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = validate_read_screen_args(&json!({"mode": "full_html"}), 4000).unwrap_err();
        assert!(err.to_string().contains("mode"));
    }

    #[test]
    fn max_chars_clamps_to_ceiling() {
        let parsed = validate_read_screen_args(&json!({"max_chars": 100000}), 4000).unwrap();
        assert_eq!(parsed.max_chars, 4000);
        let parsed = validate_read_screen_args(&json!({"max_chars": 12}), 4000).unwrap();
        assert_eq!(parsed.max_chars, 12);
    }

    #[test]
    fn meta_payload_fingerprints_content() {
        let render = rendered("<button data-action=\"ok\">ok</button>");
        let mut usage = ReadScreenUsage::default();
        let payload = run_read_screen(args(ReadMode::Meta, false), &render, &mut usage).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["revision"], 1);
        assert_eq!(value["interaction_id_count"], 1);
        assert_eq!(value["html_sha256"].as_str().unwrap().len(), 64);
        // no raw HTML in meta mode
        assert!(!payload.contains("<button"));
    }

    #[test]
    fn outline_caps_ids_and_keeps_document_order() {
        let mut html = String::from("<ul>");
        for i in 0..40 {
            html.push_str(&format!("<li><a data-action=\"item-{i}\">x</a></li>"));
        }
        html.push_str("</ul>");
        let render = rendered(&html);
        let mut usage = ReadScreenUsage::default();

        let payload =
            run_read_screen(args(ReadMode::Outline, false), &render, &mut usage).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let ids = value["interaction_ids"].as_array().unwrap();
        assert_eq!(ids.len(), OUTLINE_ID_CAP);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(id, &json!(format!("item-{i}")));
        }
        assert_eq!(value["tags"]["ul"], 1);
        assert_eq!(value["tags"]["a"], 40);
    }

    #[test]
    fn snippet_respects_max_chars() {
        let render = rendered(&"x".repeat(500));
        let mut usage = ReadScreenUsage::default();
        let mut request = args(ReadMode::Snippet, false);
        request.max_chars = 64;

        let payload = run_read_screen(request, &render, &mut usage).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["snippet"].as_str().unwrap().chars().count(), 64);
    }

    #[test]
    fn tag_summary_skips_prefix_collisions() {
        let render = rendered("<tablet></tablet><table><tr></tr></table>");
        let mut usage = ReadScreenUsage::default();
        let payload =
            run_read_screen(args(ReadMode::Outline, false), &render, &mut usage).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["tags"]["table"], 1);
    }
}

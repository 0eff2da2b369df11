// Lenient JSON extraction from LLM answers.
//
// Models wrap JSON in ```json fences, add a sentence before or after it, or
// stop mid-array when they hit the token limit. We strip the fence, cut out
// the first balanced object/array, and reject anything that does not end
// like JSON before handing it to serde_json.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::Value;

use crate::error::{AnalysisError, Result};

const CODE_FENCE: &str = r"(?s)```(?:json)?\s*(.*?)```";

fn code_fence() -> Option<&'static Regex> {
    static CODE_FENCE_RE: OnceLock<Option<Regex>> = OnceLock::new();
    CODE_FENCE_RE
        .get_or_init(|| Regex::new(CODE_FENCE).ok())
        .as_ref()
}

/// Cut the JSON payload out of a model answer.
///
/// If no balanced closing bracket exists (truncated output) the text from the
/// first opening bracket to the end is returned, so the caller's
/// completeness check can reject it.
pub fn extract_json(text: &str) -> String {
    let mut body = text.trim();

    if let Some(inner) = code_fence()
        .and_then(|fence| fence.captures(body))
        .and_then(|c| c.get(1))
    {
        body = inner.as_str().trim();
    }

    first_balanced(body).unwrap_or(body).to_string()
}

/// The first `{...}` or `[...]` span, honouring string literals. When the
/// span never closes, everything from the opening bracket onward.
fn first_balanced(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    Some(&text[start..])
}

/// Extract and parse the JSON value in a model answer.
///
/// Output that does not end in `]` or `}` is treated as truncated.
pub fn parse_model_json(text: &str) -> Result<Value> {
    let json = extract_json(text);
    let trimmed = json.trim();
    if !(trimmed.ends_with(']') || trimmed.ends_with('}')) {
        return Err(AnalysisError::response_parse(format!(
            "incomplete JSON (truncated output?): ...{}",
            tail(trimmed, 80)
        )));
    }
    serde_json::from_str(trimmed).map_err(|e| AnalysisError::response_parse(e.to_string()))
}

fn tail(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(max_chars)).collect()
}

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::metrics::NORMALIZER_OUTCOMES;

const CODE_FENCE: &str = "```";

// brace-doubling the model produces when it echoes an escaped schema back
const ARTIFACT_OPEN: &str = "{{";
const ARTIFACT_CLOSE: &str = "}}";

type Step = fn(&str) -> Option<String>;

const STEPS: [(&str, Step); 3] = [
    ("unwrap_envelope", unwrap_envelope),
    ("strip_code_fence", strip_code_fence),
    ("strip_brace_artifact", strip_brace_artifact),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedResponse {
    Parsed(Value),
    Fallback { content: String },
}

impl NormalizedResponse {
    pub fn is_fallback(&self) -> bool {
        matches!(self, NormalizedResponse::Fallback { .. })
    }

    pub fn into_value(self) -> Value {
        match self {
            NormalizedResponse::Parsed(value) => value,
            NormalizedResponse::Fallback { content } => serde_json::json!({ "content": content }),
        }
    }
}

// Each step either rewrites the working string or passes it on untouched.
// Anything that still does not parse comes back as { "content": <raw input> }.
pub fn normalize(raw: &str) -> NormalizedResponse {
    debug!(raw_len = raw.len(), "normalizing upstream response");

    let mut working = raw.to_string();
    for (name, step) in STEPS {
        match step(&working) {
            Some(next) => {
                debug!(step = name, before = working.len(), after = next.len(), "step applied");
                working = next;
            }
            None => debug!(step = name, "step skipped"),
        }
    }

    let outcome = parse_trimmed(&working, raw);
    let label = if outcome.is_fallback() { "fallback" } else { "parsed" };
    NORMALIZER_OUTCOMES.with_label_values(&[label]).inc();
    outcome
}

// {"content": "<string>"} envelope -> the inner string
pub fn unwrap_envelope(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    let content = value.get("content")?.as_str()?;
    debug!(content_len = content.len(), "unwrapped content envelope");
    Some(content.to_string())
}

// fenced reply -> span from first { to last }
pub fn strip_code_fence(text: &str) -> Option<String> {
    if !text.contains(CODE_FENCE) {
        return None;
    }

    let start = text.find('{');
    let end = text.rfind('}');
    debug!(?start, ?end, "code fence found");

    match (start, end) {
        // both braces are single bytes, so these are char boundaries
        (Some(start), Some(end)) if start < end => Some(text[start..=end].to_string()),
        _ => None,
    }
}

// {{ ... }} -> { ... }
pub fn strip_brace_artifact(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix(ARTIFACT_OPEN)?
        .strip_suffix(ARTIFACT_CLOSE)?;
    Some(format!("{{{}}}", inner))
}

fn parse_trimmed(working: &str, raw: &str) -> NormalizedResponse {
    match serde_json::from_str::<Value>(working.trim()) {
        Ok(value) => NormalizedResponse::Parsed(value),
        Err(e) => {
            debug!(error = %e, working_len = working.len(), "falling back to raw content");
            NormalizedResponse::Fallback {
                content: raw.to_string(),
            }
        }
    }
}

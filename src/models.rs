use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::ApiError;

pub const MAX_PROMPT_CHARS: usize = 2000;

// Callable request envelope: {"data": {...}}
#[derive(Debug, Deserialize)]
pub struct CallableRequest {
    #[serde(default)]
    pub data: Value,
}

impl CallableRequest {
    pub fn prompt_text(&self) -> Result<&str, ApiError> {
        validate_prompt(self.data.get("promptText"))
    }
}

pub fn validate_prompt(prompt: Option<&Value>) -> Result<&str, ApiError> {
    let prompt = match prompt {
        None | Some(Value::Null) => {
            return Err(ApiError::invalid_argument("promptText is required"));
        }
        Some(Value::String(prompt)) => prompt.as_str(),
        Some(_) => return Err(ApiError::invalid_argument("promptText must be a string")),
    };

    if prompt.trim().is_empty() {
        return Err(ApiError::invalid_argument("promptText must not be empty"));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ApiError::invalid_argument(format!(
            "promptText must be at most {} characters",
            MAX_PROMPT_CHARS
        )));
    }
    Ok(prompt)
}

// success payload: { success: true, <field>: payload, timestamp }
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResult {
    pub field: &'static str,
    pub payload: Value,
    pub timestamp: String,
}

impl Serialize for EndpointResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry(self.field, &self.payload)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.end()
    }
}

// Callable response envelope: {"result": {...}}
#[derive(Debug, Serialize)]
pub struct CallableResponse {
    pub result: EndpointResult,
}

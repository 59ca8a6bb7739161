//! Request schema for the chat completion call.
//!
//! Only the fields this crate reads are typed; everything else the caller
//! sets is carried through `extra` and lands in the body untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One chat message as sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamMessage {
    pub role: String,
    /// Either a string or an ordered list of content parts.
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UpstreamMessage {
    pub fn new(role: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            reasoning_content: None,
            extra: Map::new(),
        }
    }

    pub fn user(content: impl Into<Value>) -> Self {
        Self::new("user", content)
    }

    /// Text used for signing.
    ///
    /// String content is returned verbatim. A list of parts yields the
    /// concatenated `text` fields, trimmed. Anything else falls back to
    /// `reasoning_content`, then to the empty string.
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            Value::Array(parts) => parts
                .iter()
                .map(|part| part.get("text").and_then(Value::as_str).unwrap_or(""))
                .collect::<String>()
                .trim()
                .to_string(),
            _ => self.reasoning_content.clone().unwrap_or_default(),
        }
    }
}

/// Caller-supplied chat request.
///
/// `params` never reaches the body; its entries become URL query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamRequest {
    #[serde(default)]
    pub messages: Vec<UpstreamMessage>,
    #[serde(default, skip_serializing)]
    pub params: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UpstreamRequest {
    pub fn new(messages: Vec<UpstreamMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Set a pass-through body field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Text of the newest user message, else of the last message, else "".
    pub fn last_user_text(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .or_else(|| self.messages.last())
            .map(UpstreamMessage::text)
            .unwrap_or_default()
    }

    /// Query pairs derived from `params` when it is a JSON object.
    ///
    /// Null values are skipped; strings are used verbatim; integral floats
    /// drop their fraction (`1.0` becomes `1`); other values are rendered as
    /// compact JSON.
    pub fn param_pairs(&self) -> Vec<(String, String)> {
        let Some(Value::Object(params)) = &self.params else {
            return Vec::new();
        };
        params
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    Value::Number(n) => render_number(n),
                    other => other.to_string(),
                };
                Some((key.clone(), rendered))
            })
            .collect()
    }
}

fn render_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            format!("{f:.0}")
        }
        _ => n.to_string(),
    }
}

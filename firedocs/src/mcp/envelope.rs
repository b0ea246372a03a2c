//! The uniform result shape every tool returns

use crate::error::FiredocsError;
use rmcp::model::{Annotated, CallToolResult, RawContent, RawTextContent};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

/// Outcome of one tool call
///
/// Serializes as `{"success": true, ...payload}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEnvelope {
    /// The backend call completed; fields are merged into the envelope
    Success(Map<String, Value>),
    /// The call failed somewhere; the message says where and why
    Failure(String),
}

impl ToolEnvelope {
    /// Wrap a payload
    pub fn success(payload: Map<String, Value>) -> Self {
        Self::Success(payload)
    }

    /// Wrap a failure
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Whether this is a success envelope
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The envelope as a JSON object
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "error": format!("failed to encode result: {e}") })
        })
    }

    /// Render as an MCP tool result whose text is the JSON envelope
    pub fn into_call_tool_result(self) -> CallToolResult {
        let is_error = !self.is_success();
        let text = self.to_value().to_string();
        CallToolResult {
            content: vec![Annotated::new(
                RawContent::Text(RawTextContent { text }),
                None,
            )],
            is_error: Some(is_error),
        }
    }
}

impl From<FiredocsError> for ToolEnvelope {
    fn from(error: FiredocsError) -> Self {
        Self::Failure(error.to_string())
    }
}

impl Serialize for ToolEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(payload) => {
                let fields = payload
                    .iter()
                    .filter(|(key, _)| !matches!(key.as_str(), "success" | "error"));
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &true)?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Failure(message) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_merges_payload() {
        let payload = json!({"uid": "u1", "email": "a@example.com"});
        let envelope = ToolEnvelope::success(payload.as_object().unwrap().clone());
        assert_eq!(
            envelope.to_value(),
            json!({"success": true, "uid": "u1", "email": "a@example.com"})
        );
    }

    #[test]
    fn test_payload_cannot_forge_status_fields() {
        let payload = json!({"success": false, "error": "nope", "path": "a"});
        let envelope = ToolEnvelope::success(payload.as_object().unwrap().clone());
        assert_eq!(envelope.to_value(), json!({"success": true, "path": "a"}));
    }

    #[test]
    fn test_failure_shape_and_tool_result() {
        let envelope = ToolEnvelope::from(FiredocsError::not_found("identity", "no such user"));
        assert_eq!(
            envelope.to_value(),
            json!({"success": false, "error": "identity not found: no such user"})
        );

        let result = envelope.into_call_tool_result();
        assert_eq!(result.is_error, Some(true));
        let RawContent::Text(text) = &result.content[0].raw else {
            panic!("expected text content");
        };
        let decoded: Value = serde_json::from_str(&text.text).unwrap();
        assert_eq!(decoded["success"], json!(false));
    }
}

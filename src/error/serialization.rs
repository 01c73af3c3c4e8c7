use super::ProdigyError;
use serde::{Deserialize, Serialize};

/// Serializable error representation for JSON output
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SerializableError {
    /// Error kind as string
    pub kind: String,
    /// User-facing error message
    pub message: String,
    /// Error code
    pub code: u16,
    /// Context chain (operation history)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    /// Source error if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Box<SerializableError>>,
}

impl From<&ProdigyError> for SerializableError {
    fn from(error: &ProdigyError) -> Self {
        let kind = match error {
            ProdigyError::Config { .. } => "Config",
            ProdigyError::Session { .. } => "Session",
            ProdigyError::Storage { .. } => "Storage",
            ProdigyError::Execution { .. } => "Execution",
            ProdigyError::Workflow { .. } => "Workflow",
            ProdigyError::Git { .. } => "Git",
            ProdigyError::Validation { .. } => "Validation",
            ProdigyError::Other { .. } => "Other",
        }
        .to_string();

        let context: Vec<String> = error.chain().iter().map(|c| c.message.clone()).collect();

        let source = error.error_source().map(|s| Box::new(s.into()));

        Self {
            kind,
            message: error.user_message(),
            code: error.code(),
            context,
            source,
        }
    }
}

impl ProdigyError {
    /// Convert error to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(SerializableError::from(self))
            .unwrap_or_else(|_| serde_json::json!({ "error": "Serialization failed" }))
    }

    /// Convert error to JSON string
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&SerializableError::from(self))
            .unwrap_or_else(|_| r#"{"error":"Serialization failed"}"#.to_string())
    }

    /// Convert error to pretty-printed JSON string
    pub fn to_json_string_pretty(&self) -> String {
        serde_json::to_string_pretty(&SerializableError::from(self))
            .unwrap_or_else(|_| r#"{"error":"Serialization failed"}"#.to_string())
    }
}

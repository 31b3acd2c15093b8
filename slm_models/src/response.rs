use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JSON envelope returned by every SLM action.
///
/// Decoding is strict: a body without a `result` of `"success"` or `"error"`, or an error
/// without a `message`, is rejected. Action specific fields (`status`, `date_expiry`,
/// `error_code`, ...) are kept untouched in `fields`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ServerResponse {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
    Error {
        message: String,
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
}

impl ServerResponse {
    /// An error result produced locally, without the server being involved.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            fields: Map::new(),
        }
    }

    #[must_use]
    pub fn success() -> Self {
        Self::Success {
            message: None,
            fields: Map::new(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } => message.as_deref(),
            Self::Error { message, .. } => Some(message),
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Success { fields, .. } | Self::Error { fields, .. } => fields.get(name),
        }
    }
}

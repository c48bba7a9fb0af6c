use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;
use crate::intent::IntentKind;

/// The one shape every branch (file, memory, shell) returns to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub action: String,
    pub result_text: String,
    pub success: bool,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorKind>,
    /// Structured payload for non-speech consumers (listings, memory dumps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ExecutionResult {
    pub fn ok(action: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            result_text: text.into(),
            success: true,
            blocked: false,
            error_code: None,
            data: None,
        }
    }

    pub fn failed(action: impl Into<String>, text: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            action: action.into(),
            result_text: text.into(),
            success: false,
            blocked: false,
            error_code: Some(kind),
            data: None,
        }
    }

    pub fn blocked(action: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            blocked: true,
            ..Self::failed(action, text, ErrorKind::CommandBlocked)
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// What observers receive after each `execute` call.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionEvent {
    pub timestamp: DateTime<Utc>,
    pub command: String,
    pub intent: Option<IntentKind>,
    pub duration_ms: u64,
    pub result: ExecutionResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_names() {
        let r = ExecutionResult::blocked("Shell Command", "Command blocked: nope");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["resultText"], "Command blocked: nope");
        assert_eq!(v["blocked"], true);
        assert_eq!(v["success"], false);
        assert_eq!(v["errorCode"], "E_COMMAND_BLOCKED");
        assert!(v.get("data").is_none());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::executor::ExecutionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Blocked,
    Error,
}

/// One JSONL line in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub ts: DateTime<Utc>,
    pub command: String,
    pub status: AuditStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorKind>,
}

impl AuditRecord {
    pub fn from_result(command: &str, result: &ExecutionResult) -> Self {
        let status = if result.blocked {
            AuditStatus::Blocked
        } else if result.success {
            AuditStatus::Success
        } else {
            AuditStatus::Error
        };
        Self {
            ts: Utc::now(),
            command: command.to_string(),
            status,
            reason: (!result.success).then(|| result.result_text.clone()),
            error_code: result.error_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_results_keep_reason() {
        let r = ExecutionResult::blocked("Shell Command", "Command blocked: sudo");
        let rec = AuditRecord::from_result("sudo ls", &r);
        assert_eq!(rec.status, AuditStatus::Blocked);
        assert_eq!(rec.reason.as_deref(), Some("Command blocked: sudo"));

        let line = serde_json::to_string(&rec).unwrap();
        assert!(line.contains(r#""status":"blocked""#));
        assert!(line.contains(r#""error_code":"E_COMMAND_BLOCKED""#));
    }

    #[test]
    fn successes_omit_reason() {
        let r = ExecutionResult::ok("Shell Command", "hi");
        let line = serde_json::to_string(&AuditRecord::from_result("echo hi", &r)).unwrap();
        assert!(!line.contains("reason"));
        assert!(line.contains(r#""status":"success""#));
    }
}

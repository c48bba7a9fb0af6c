use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes surfaced to callers in `ExecutionResult::error_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "E_PARSE_ERROR")]
    ParseError,
    #[serde(rename = "E_EMPTY_COMMAND")]
    EmptyCommand,
    #[serde(rename = "E_COMMAND_BLOCKED")]
    CommandBlocked,
    #[serde(rename = "E_COMMAND_NOT_FOUND")]
    CommandNotFound,
    #[serde(rename = "E_PERMISSION_DENIED")]
    PermissionDenied,
    #[serde(rename = "E_COMMAND_TIMEOUT")]
    CommandTimeout,
    #[serde(rename = "E_COMMAND_FAILED")]
    CommandFailed,
    #[serde(rename = "E_FILE_OPERATION_FAILED")]
    FileOperationFailed,
    #[serde(rename = "E_MEMORY_OPERATION_FAILED")]
    MemoryOperationFailed,
    #[serde(rename = "E_UNKNOWN_COMMAND")]
    UnknownCommand,
    #[serde(rename = "E_SYSTEM_ERROR")]
    SystemError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ParseError => "E_PARSE_ERROR",
            ErrorKind::EmptyCommand => "E_EMPTY_COMMAND",
            ErrorKind::CommandBlocked => "E_COMMAND_BLOCKED",
            ErrorKind::CommandNotFound => "E_COMMAND_NOT_FOUND",
            ErrorKind::PermissionDenied => "E_PERMISSION_DENIED",
            ErrorKind::CommandTimeout => "E_COMMAND_TIMEOUT",
            ErrorKind::CommandFailed => "E_COMMAND_FAILED",
            ErrorKind::FileOperationFailed => "E_FILE_OPERATION_FAILED",
            ErrorKind::MemoryOperationFailed => "E_MEMORY_OPERATION_FAILED",
            ErrorKind::UnknownCommand => "E_UNKNOWN_COMMAND",
            ErrorKind::SystemError => "E_SYSTEM_ERROR",
        }
    }

    /// Validation-class errors are the caller's fault, everything else is ours or the command's.
    pub fn is_validation(&self) -> bool {
        matches!(self, ErrorKind::ParseError | ErrorKind::EmptyCommand)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config parse error")]
    ConfigParse(#[source] toml::de::Error),

    #[error("config io error: {path}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policy pattern `{pattern}`")]
    PolicyPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("working directory unavailable: {path}")]
    Workdir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sandbox unavailable")]
    Sandbox(#[from] crate::fileops::SandboxError),

    #[error("plugin error: {0}")]
    Plugin(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("command error: {0}")]
    Command(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `vox_core::api` instead of reaching into internal modules.

pub use crate::audit::{start_audit_log, AuditObserver, AuditRecord, AuditStatus, AuditTx};
pub use crate::config::{
    AppConfig, AuditConfig, HttpServerConfig, LoggingConfig, MemoryConfig, PolicyConfig,
    ShellConfig,
};
pub use crate::error::{CliError, CoreError, ErrorKind};
pub use crate::executor::{
    CommandExecutor, CommandExecutorBuilder, ExecutionEvent, ExecutionObserver, ExecutionResult,
};
pub use crate::fileops::{FileOps, Sandbox};
pub use crate::intent::{IntentKind, IntentParser, ParsedIntent};
pub use crate::memory::{HistoryEntry, InMemoryStore, MemoryBook, MemoryEntry, MemoryStats, MemoryStore};
pub use crate::policy::{PolicyEngine, PolicyRules, PolicyStage, PolicyVerdict};
pub use crate::runner::{
    classify_exit, classify_spawn_error, normalize_exit, ShellFailure, ShellOutcome, ShellRunner,
    SHELL_ACTION,
};

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;

use crate::error::ErrorKind;
use crate::fileops::FileOps;
use crate::intent::{FileFunction, IntentKind, IntentParser, MemoryFunction, ParsedIntent};
use crate::memory::{run_memory_op, HistoryEntry, MemoryStore};
use crate::policy::PolicyEngine;
use crate::runner::{ShellRunner, SHELL_ACTION};

use super::hooks::ExecutionObserver;
use super::types::{ExecutionEvent, ExecutionResult};

pub const VALIDATION_ACTION: &str = "Validation";
pub const SYSTEM_ACTION: &str = "System";

/// Entry point of the core: text in, one [`ExecutionResult`] out, never a panic
/// or error across the boundary.
pub struct CommandExecutor {
    parser: IntentParser,
    policy: Arc<PolicyEngine>,
    files: FileOps,
    shell: Arc<dyn ShellRunner>,
    memory: Option<Arc<dyn MemoryStore>>,
    observers: Vec<Arc<dyn ExecutionObserver>>,
}

pub struct CommandExecutorBuilder {
    policy: Option<Arc<PolicyEngine>>,
    files: FileOps,
    shell: Arc<dyn ShellRunner>,
    memory: Option<Arc<dyn MemoryStore>>,
    observers: Vec<Arc<dyn ExecutionObserver>>,
}

impl CommandExecutorBuilder {
    pub fn policy(mut self, policy: Arc<PolicyEngine>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> CommandExecutor {
        CommandExecutor {
            parser: IntentParser::new(),
            policy: self.policy.unwrap_or_default(),
            files: self.files,
            shell: self.shell,
            memory: self.memory,
            observers: self.observers,
        }
    }
}

impl CommandExecutor {
    pub fn builder(files: FileOps, shell: Arc<dyn ShellRunner>) -> CommandExecutorBuilder {
        CommandExecutorBuilder {
            policy: None,
            files,
            shell,
            memory: None,
            observers: Vec::new(),
        }
    }

    pub fn policy(&self) -> &Arc<PolicyEngine> {
        &self.policy
    }

    pub fn parser(&self) -> &IntentParser {
        &self.parser
    }

    pub fn memory(&self) -> Option<&Arc<dyn MemoryStore>> {
        self.memory.as_ref()
    }

    pub fn files(&self) -> &FileOps {
        &self.files
    }

    pub async fn execute(&self, input: &str) -> ExecutionResult {
        let started = Instant::now();
        let command = input.trim();
        if command.is_empty() {
            let result = ExecutionResult::failed(
                VALIDATION_ACTION,
                "Command cannot be empty",
                ErrorKind::EmptyCommand,
            );
            self.notify(command, None, started, &result).await;
            return result;
        }

        let intent = self.parser.parse(command);
        self.complete(command, intent, started).await
    }

    /// Same as [`execute`](Self::execute) for an untyped transport value.
    pub async fn execute_value(&self, raw: &Value) -> ExecutionResult {
        match raw {
            Value::String(s) => self.execute(s).await,
            other => {
                let started = Instant::now();
                let intent = self.parser.parse_value(other);
                self.complete(&other.to_string(), intent, started).await
            }
        }
    }

    /// Runs an already-classified intent. Shell intents still go through policy.
    pub async fn dispatch(&self, intent: ParsedIntent) -> ExecutionResult {
        match intent {
            ParsedIntent::ParseError { reason } => {
                ExecutionResult::failed(VALIDATION_ACTION, reason, ErrorKind::ParseError)
            }
            ParsedIntent::MemoryOp { function, args } => self.run_memory(function, &args).await,
            ParsedIntent::FileOp { function, args } => self.run_file(function, &args).await,
            ParsedIntent::Shell { command } => self.run_shell(&command).await,
        }
    }

    async fn complete(&self, command: &str, intent: ParsedIntent, started: Instant) -> ExecutionResult {
        let kind = intent.kind();
        tracing::debug!(target: "vox.executor", command = %command, intent = ?kind, "dispatching");

        let result = match AssertUnwindSafe(self.dispatch(intent)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                tracing::error!(
                    target: "vox.executor",
                    command = %command,
                    panic = %panic_message(panic.as_ref()),
                    "executor caught a panic"
                );
                ExecutionResult::failed(
                    SYSTEM_ACTION,
                    "An unexpected error occurred while executing the command",
                    ErrorKind::SystemError,
                )
            }
        };

        if kind != IntentKind::Invalid {
            self.record_history(command, &result).await;
        }
        self.notify(command, Some(kind), started, &result).await;
        result
    }

    async fn run_memory(&self, function: MemoryFunction, args: &[String]) -> ExecutionResult {
        match &self.memory {
            Some(store) => run_memory_op(store.as_ref(), function, args).await,
            None => ExecutionResult::failed(
                function.action(),
                "Memory is not available",
                ErrorKind::MemoryOperationFailed,
            ),
        }
    }

    async fn run_file(&self, function: FileFunction, args: &[String]) -> ExecutionResult {
        let files = &self.files;
        match (function, args) {
            (FileFunction::CreateFile, [name]) => files.create_file(name).await,
            (FileFunction::CreateDirectory, [name]) => files.create_directory(name).await,
            (FileFunction::DeleteFile, [name]) => files.delete_file(name).await,
            (FileFunction::CopyFile, [src, dst]) => files.copy_file(src, dst).await,
            (FileFunction::MoveFile, [src, dst]) => files.move_file(src, dst).await,
            (FileFunction::ListFiles, []) => files.list_files(None).await,
            (FileFunction::ListFiles, [dir]) => files.list_files(Some(dir)).await,
            (function, args) => ExecutionResult::failed(
                function.action(),
                format!(
                    "Unrecognized form of {} with {} argument(s)",
                    function.as_str(),
                    args.len()
                ),
                ErrorKind::UnknownCommand,
            ),
        }
    }

    async fn run_shell(&self, command: &str) -> ExecutionResult {
        let verdict = self.policy.check(command);
        if !verdict.safe {
            let mut text = format!("Command blocked: {}", verdict.reason);
            if let Some(suggestion) = &verdict.suggestion {
                text.push_str(". ");
                text.push_str(suggestion);
            }
            let result = ExecutionResult::blocked(SHELL_ACTION, text);
            return match serde_json::to_value(&verdict) {
                Ok(v) => result.with_data(v),
                Err(_) => result,
            };
        }

        let cwd = self.files.sandbox().root();
        tracing::info!(
            target: "vox.executor",
            runner = self.shell.name(),
            command = %command,
            cwd = %cwd.display(),
            "running shell command"
        );
        let outcome = self.shell.run(command, cwd).await;
        tracing::debug!(
            target: "vox.executor",
            exit_code = ?outcome.exit_code,
            duration_ms = outcome.duration_ms,
            "shell command finished"
        );
        outcome.into_result(command)
    }

    async fn record_history(&self, command: &str, result: &ExecutionResult) {
        let Some(store) = &self.memory else {
            return;
        };
        let entry = HistoryEntry {
            timestamp: Utc::now(),
            command: command.to_string(),
            action: result.action.clone(),
            success: result.success,
        };
        if let Err(e) = store.record_command(entry).await {
            tracing::warn!(target: "vox.executor", error = %e, "failed to record command history");
        }
    }

    async fn notify(
        &self,
        command: &str,
        intent: Option<IntentKind>,
        started: Instant,
        result: &ExecutionResult,
    ) {
        if self.observers.is_empty() {
            return;
        }
        let event = ExecutionEvent {
            timestamp: Utc::now(),
            command: command.to_string(),
            intent,
            duration_ms: started.elapsed().as_millis() as u64,
            result: result.clone(),
        };
        for observer in &self.observers {
            let call = AssertUnwindSafe(observer.on_result(&event)).catch_unwind();
            if let Err(panic) = call.await {
                tracing::error!(
                    target: "vox.executor",
                    observer = observer.name(),
                    panic = %panic_message(panic.as_ref()),
                    "observer panicked"
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

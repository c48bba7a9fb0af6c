//! Memory-intent dispatch: a thin layer that calls the store and phrases the answer.

use crate::error::ErrorKind;
use crate::executor::ExecutionResult;
use crate::intent::MemoryFunction;

use super::helpers::trim_mid;
use super::traits::{MemoryEntry, MemoryStore};

const DEFAULT_HISTORY: usize = 10;
const HISTORY_COMMAND_CHARS: usize = 80;

pub async fn run_memory_op(
    store: &dyn MemoryStore,
    function: MemoryFunction,
    args: &[String],
) -> ExecutionResult {
    let action = function.action();
    match dispatch(store, function, args).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(
                target: "vox.memory",
                store = store.name(),
                function = function.as_str(),
                error = %e,
                "memory operation failed"
            );
            ExecutionResult::failed(
                action,
                format!("Memory operation failed: {e}"),
                ErrorKind::MemoryOperationFailed,
            )
        }
    }
}

async fn dispatch(
    store: &dyn MemoryStore,
    function: MemoryFunction,
    args: &[String],
) -> anyhow::Result<ExecutionResult> {
    let action = function.action();
    let result = match (function, args) {
        (MemoryFunction::SaveMemory, [key, value]) => {
            store.save_memory(key, value).await?;
            let text = if value == "true" {
                format!("I'll remember {key}")
            } else {
                format!("I'll remember that {key} is {value}")
            };
            ExecutionResult::ok(action, text)
        }
        (MemoryFunction::GetMemory, [key]) => match store.get_memory(key).await? {
            Some(entry) => ExecutionResult::ok(action, format!("{key} is {}", entry.value))
                .with_data(serde_json::to_value(&entry)?),
            None => ExecutionResult::ok(action, format!("I don't remember anything about {key}")),
        },
        (MemoryFunction::GetAllMemory, []) => {
            let entries = store.get_all_memory().await?;
            let text = if entries.is_empty() {
                "I don't remember anything yet".to_string()
            } else {
                format!("I remember {} things:\n{}", entries.len(), bullet_list(&entries))
            };
            ExecutionResult::ok(action, text).with_data(serde_json::to_value(&entries)?)
        }
        (MemoryFunction::ClearMemory, []) => {
            let removed = store.clear_memory().await?;
            ExecutionResult::ok(action, format!("Cleared {removed} memories"))
        }
        (MemoryFunction::SearchMemory, [query]) => {
            let entries = store.search_memory(query).await?;
            let text = if entries.is_empty() {
                format!("No memories match '{query}'")
            } else {
                format!(
                    "Found {} matches for '{query}':\n{}",
                    entries.len(),
                    bullet_list(&entries)
                )
            };
            ExecutionResult::ok(action, text).with_data(serde_json::to_value(&entries)?)
        }
        (MemoryFunction::GetMemoryStats, []) => {
            let stats = store.get_memory_stats().await?;
            let last = stats
                .last_updated
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "never".to_string());
            let text = format!(
                "{} memories stored, {} commands in history, last updated {last}",
                stats.total_keys, stats.history_entries
            );
            ExecutionResult::ok(action, text).with_data(serde_json::to_value(&stats)?)
        }
        (MemoryFunction::GetCommandHistory, rest) if rest.len() <= 1 => {
            let limit = rest
                .first()
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_HISTORY);
            let entries = store.get_command_history(limit).await?;
            let text = if entries.is_empty() {
                "No commands in history yet".to_string()
            } else {
                let lines: Vec<String> = entries
                    .iter()
                    .enumerate()
                    .map(|(i, h)| {
                        let mark = if h.success { "ok" } else { "failed" };
                        format!(
                            "{}. [{mark}] {}",
                            i + 1,
                            trim_mid(&h.command, HISTORY_COMMAND_CHARS)
                        )
                    })
                    .collect();
                format!("Last {} commands:\n{}", entries.len(), lines.join("\n"))
            };
            ExecutionResult::ok(action, text).with_data(serde_json::to_value(&entries)?)
        }
        (function, args) => ExecutionResult::failed(
            action,
            format!(
                "Unrecognized form of {} with {} argument(s)",
                function.as_str(),
                args.len()
            ),
            ErrorKind::UnknownCommand,
        ),
    };
    Ok(result)
}

fn bullet_list(entries: &[MemoryEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("- {}: {}", e.key, e.value))
        .collect::<Vec<_>>()
        .join("\n")
}

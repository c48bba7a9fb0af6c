use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub command: String,
    pub action: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_keys: usize,
    pub history_entries: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Persistent key/value memory and command history the executor dispatches to.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    fn name(&self) -> &str;

    async fn save_memory(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn get_memory(&self, key: &str) -> anyhow::Result<Option<MemoryEntry>>;

    async fn get_all_memory(&self) -> anyhow::Result<Vec<MemoryEntry>>;

    /// Returns how many keys were removed.
    async fn clear_memory(&self) -> anyhow::Result<usize>;

    async fn search_memory(&self, query: &str) -> anyhow::Result<Vec<MemoryEntry>>;

    async fn get_memory_stats(&self) -> anyhow::Result<MemoryStats>;

    /// Newest first, at most `limit` entries.
    async fn get_command_history(&self, limit: usize) -> anyhow::Result<Vec<HistoryEntry>>;

    async fn record_command(&self, entry: HistoryEntry) -> anyhow::Result<()>;
}

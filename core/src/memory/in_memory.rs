use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::book::MemoryBook;
use super::traits::{HistoryEntry, MemoryEntry, MemoryStats, MemoryStore};

/// Process-lifetime store; nothing survives a restart.
pub struct InMemoryStore {
    book: Mutex<MemoryBook>,
    history_limit: usize,
}

impl InMemoryStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            book: Mutex::new(MemoryBook::default()),
            history_limit,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn save_memory(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.book.lock().await.save(key, value, Utc::now());
        Ok(())
    }

    async fn get_memory(&self, key: &str) -> anyhow::Result<Option<MemoryEntry>> {
        Ok(self.book.lock().await.get(key))
    }

    async fn get_all_memory(&self) -> anyhow::Result<Vec<MemoryEntry>> {
        Ok(self.book.lock().await.all())
    }

    async fn clear_memory(&self) -> anyhow::Result<usize> {
        Ok(self.book.lock().await.clear())
    }

    async fn search_memory(&self, query: &str) -> anyhow::Result<Vec<MemoryEntry>> {
        Ok(self.book.lock().await.search(query))
    }

    async fn get_memory_stats(&self) -> anyhow::Result<MemoryStats> {
        Ok(self.book.lock().await.stats())
    }

    async fn get_command_history(&self, limit: usize) -> anyhow::Result<Vec<HistoryEntry>> {
        Ok(self.book.lock().await.recent(limit))
    }

    async fn record_command(&self, entry: HistoryEntry) -> anyhow::Result<()> {
        self.book.lock().await.record(entry, self.history_limit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_get() {
        let store = InMemoryStore::default();
        tokio_test::block_on(async {
            store.save_memory("Colour", "blue").await.unwrap();
            let got = store.get_memory("colour").await.unwrap().unwrap();
            assert_eq!(got.value, "blue");
            assert_eq!(store.get_memory_stats().await.unwrap().total_keys, 1);
        });
    }
}

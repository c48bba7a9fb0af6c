use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use vox_core::api::{HistoryEntry, MemoryBook, MemoryEntry, MemoryStats, MemoryStore};

/// Memory store persisted as one JSON document, rewritten after every mutation.
pub struct JsonFileMemory {
    path: PathBuf,
    history_limit: usize,
    book: Mutex<MemoryBook>,
}

impl JsonFileMemory {
    /// Loads `path` if it exists; a missing file starts an empty book.
    pub async fn open(path: impl Into<PathBuf>, history_limit: usize) -> Result<Self> {
        let path = path.into();
        let book = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => MemoryBook::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt memory file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryBook::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("read memory file {}", path.display()))
            }
        };
        tracing::info!(
            target: "vox.memory",
            path = %path.display(),
            keys = book.memory.len(),
            history = book.history.len(),
            "memory loaded"
        );
        Ok(Self {
            path,
            history_limit,
            book: Mutex::new(book),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the book, writes it, and only then makes it current.
    /// A failed write leaves the in-memory book as it was.
    async fn commit<T>(&self, change: impl FnOnce(&mut MemoryBook) -> T) -> Result<T> {
        let mut book = self.book.lock().await;
        let mut next = book.clone();
        let out = change(&mut next);
        self.persist(&next).await?;
        *book = next;
        Ok(out)
    }

    async fn persist(&self, book: &MemoryBook) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let body = serde_json::to_vec_pretty(book)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for JsonFileMemory {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn save_memory(&self, key: &str, value: &str) -> Result<()> {
        self.commit(|book| book.save(key, value, Utc::now())).await
    }

    async fn get_memory(&self, key: &str) -> Result<Option<MemoryEntry>> {
        Ok(self.book.lock().await.get(key))
    }

    async fn get_all_memory(&self) -> Result<Vec<MemoryEntry>> {
        Ok(self.book.lock().await.all())
    }

    async fn clear_memory(&self) -> Result<usize> {
        self.commit(MemoryBook::clear).await
    }

    async fn search_memory(&self, query: &str) -> Result<Vec<MemoryEntry>> {
        Ok(self.book.lock().await.search(query))
    }

    async fn get_memory_stats(&self) -> Result<MemoryStats> {
        Ok(self.book.lock().await.stats())
    }

    async fn get_command_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(self.book.lock().await.recent(limit))
    }

    async fn record_command(&self, entry: HistoryEntry) -> Result<()> {
        let limit = self.history_limit;
        self.commit(|book| book.record(entry, limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memory.json");

        let store = JsonFileMemory::open(&path, 10).await.unwrap();
        store.save_memory("Favourite Colour", "blue").await.unwrap();
        store
            .record_command(HistoryEntry {
                timestamp: Utc::now(),
                command: "ls".into(),
                action: "Shell Command".into(),
                success: true,
            })
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileMemory::open(&path, 10).await.unwrap();
        let got = reopened.get_memory("favourite colour").await.unwrap().unwrap();
        assert_eq!(got.value, "blue");
        assert_eq!(reopened.get_command_history(5).await.unwrap().len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        assert!(JsonFileMemory::open(&path, 10).await.is_err());
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        let store = JsonFileMemory::open(&path, 10).await.unwrap();
        store.save_memory("kept", "1").await.unwrap();

        // A directory where the temp file goes makes every write fail.
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();
        assert!(store.save_memory("lost", "2").await.is_err());
        assert!(store.clear_memory().await.is_err());

        assert!(store.get_memory("lost").await.unwrap().is_none());
        assert_eq!(store.get_memory("kept").await.unwrap().unwrap().value, "1");
        assert_eq!(store.get_all_memory().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        let store = JsonFileMemory::open(&path, 10).await.unwrap();
        store.save_memory("a", "1").await.unwrap();
        assert_eq!(store.clear_memory().await.unwrap(), 1);

        let reopened = JsonFileMemory::open(&path, 10).await.unwrap();
        assert!(reopened.get_all_memory().await.unwrap().is_empty());
    }
}

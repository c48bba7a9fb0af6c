use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::helpers::normalize_key;
use super::traits::{HistoryEntry, MemoryEntry, MemoryStats};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Plain key/value memory plus a bounded command history.
///
/// Stores wrap this in a lock; it carries no synchronisation of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBook {
    #[serde(default)]
    pub memory: BTreeMap<String, StoredValue>,
    #[serde(default)]
    pub history: VecDeque<HistoryEntry>,
}

impl MemoryBook {
    pub fn save(&mut self, key: &str, value: &str, now: DateTime<Utc>) {
        self.memory.insert(
            normalize_key(key),
            StoredValue {
                value: value.trim().to_string(),
                updated_at: now,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<MemoryEntry> {
        let key = normalize_key(key);
        self.memory.get(&key).map(|v| entry(&key, v))
    }

    pub fn all(&self) -> Vec<MemoryEntry> {
        self.memory.iter().map(|(k, v)| entry(k, v)).collect()
    }

    pub fn clear(&mut self) -> usize {
        let n = self.memory.len();
        self.memory.clear();
        n
    }

    /// Case-insensitive substring match over keys and values.
    pub fn search(&self, query: &str) -> Vec<MemoryEntry> {
        let q = query.trim().to_lowercase();
        self.memory
            .iter()
            .filter(|(k, v)| k.contains(&q) || v.value.to_lowercase().contains(&q))
            .map(|(k, v)| entry(k, v))
            .collect()
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            total_keys: self.memory.len(),
            history_entries: self.history.len(),
            last_updated: self.memory.values().map(|v| v.updated_at).max(),
        }
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.history.iter().rev().take(limit).cloned().collect()
    }

    pub fn record(&mut self, item: HistoryEntry, cap: usize) {
        self.history.push_back(item);
        while self.history.len() > cap {
            self.history.pop_front();
        }
    }
}

fn entry(key: &str, v: &StoredValue) -> MemoryEntry {
    MemoryEntry {
        key: key.to_string(),
        value: v.value.clone(),
        updated_at: v.updated_at,
    }
}

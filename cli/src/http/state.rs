//! Shared state for the HTTP handlers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::broadcast;

use vox_core::api::{ExecutionEvent, ExecutionObserver};
use vox_plugins::Services;

#[derive(Debug)]
pub struct ServerStats {
    started_at: Instant,
    pub requests_total: u64,
    pub errors_total: u64,
    pub requests_by_endpoint: HashMap<String, u64>,
    pub commands_succeeded: u64,
    pub commands_blocked: u64,
    pub commands_failed: u64,
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            requests_total: 0,
            errors_total: 0,
            requests_by_endpoint: HashMap::new(),
            commands_succeeded: 0,
            commands_blocked: 0,
            commands_failed: 0,
        }
    }

    pub fn increment_request(&mut self, endpoint: &str) {
        self.requests_total += 1;
        *self
            .requests_by_endpoint
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedStats = Arc<RwLock<ServerStats>>;

/// Counts command outcomes as the executor reports them.
pub struct StatsObserver {
    stats: SharedStats,
}

impl StatsObserver {
    pub fn new(stats: SharedStats) -> Self {
        Self { stats }
    }
}

#[async_trait]
impl ExecutionObserver for StatsObserver {
    fn name(&self) -> &str {
        "http_stats"
    }

    async fn on_result(&self, event: &ExecutionEvent) {
        let mut stats = self.stats.write().unwrap_or_else(|e| e.into_inner());
        if event.result.success {
            stats.commands_succeeded += 1;
        } else if event.result.blocked {
            stats.commands_blocked += 1;
        } else {
            stats.commands_failed += 1;
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session_id: String,
    pub services: Arc<Services>,
    pub stats: SharedStats,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(
        session_id: String,
        services: Services,
        stats: SharedStats,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            session_id,
            services: Arc::new(services),
            stats,
            shutdown_tx,
        }
    }

    pub fn stats(&self) -> RwLockReadGuard<'_, ServerStats> {
        self.stats.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn stats_mut(&self) -> RwLockWriteGuard<'_, ServerStats> {
        self.stats.write().unwrap_or_else(|e| e.into_inner())
    }
}

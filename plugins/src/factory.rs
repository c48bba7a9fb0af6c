use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use vox_core::api::{
    AppConfig, CoreError, FileOps, InMemoryStore, MemoryStore, PolicyEngine, Sandbox, ShellRunner,
};
use vox_core::config::expand_path;

use crate::memory::JsonFileMemory;
use crate::runner::ProcessShellRunner;

pub async fn build_memory(cfg: &AppConfig) -> Result<Arc<dyn MemoryStore>> {
    if !cfg.memory.enabled {
        tracing::info!(target: "vox.memory", "persistent memory disabled, using in-process store");
        return Ok(Arc::new(InMemoryStore::new(cfg.memory.history_limit)));
    }
    let path = expand_path(&cfg.memory.path);
    Ok(Arc::new(
        JsonFileMemory::open(path, cfg.memory.history_limit).await?,
    ))
}

pub fn build_runner(cfg: &AppConfig) -> Arc<dyn ShellRunner> {
    Arc::new(ProcessShellRunner::new(&cfg.shell))
}

pub fn build_policy(cfg: &AppConfig) -> Result<Arc<PolicyEngine>, CoreError> {
    Ok(Arc::new(PolicyEngine::from_config(&cfg.policy)?))
}

pub fn build_file_ops(root: &Path) -> Result<FileOps, CoreError> {
    Ok(FileOps::new(Sandbox::new(root)?))
}

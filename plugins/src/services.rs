//! Wires config into a ready-to-use executor plus the handles the CLI needs.
use std::path::PathBuf;
use std::sync::Arc;

use vox_core::api::{
    start_audit_log, AppConfig, AuditObserver, AuditTx, CommandExecutor, CoreError,
    ExecutionObserver, MemoryStore, PolicyEngine,
};

use crate::factory;
use crate::observer::TracingObserver;

pub struct Services {
    pub executor: Arc<CommandExecutor>,
    pub policy: Arc<PolicyEngine>,
    pub memory: Arc<dyn MemoryStore>,
    pub audit: Option<AuditTx>,
    pub workdir: PathBuf,
}

/// Builds every collaborator from `cfg`. `extra_observers` are attached after
/// the built-in tracing and audit observers.
pub async fn build_services(
    cfg: &AppConfig,
    extra_observers: Vec<Arc<dyn ExecutionObserver>>,
) -> Result<Services, CoreError> {
    let workdir = cfg.ensure_workdir()?;
    let files = factory::build_file_ops(&workdir)?;
    let policy = factory::build_policy(cfg)?;
    let memory = factory::build_memory(cfg).await.map_err(CoreError::Plugin)?;
    let audit = start_audit_log(&cfg.audit).await?;

    let mut builder = CommandExecutor::builder(files, factory::build_runner(cfg))
        .policy(policy.clone())
        .memory(memory.clone())
        .observer(Arc::new(TracingObserver));
    if let Some(tx) = &audit {
        builder = builder.observer(Arc::new(AuditObserver::new(tx.clone())));
    }
    for observer in extra_observers {
        builder = builder.observer(observer);
    }

    tracing::info!(
        target: "vox.executor",
        workdir = %workdir.display(),
        memory = memory.name(),
        audit = audit.is_some(),
        "services ready"
    );

    Ok(Services {
        executor: Arc::new(builder.build()),
        policy,
        memory,
        audit,
        workdir,
    })
}

use async_trait::async_trait;

use vox_core::api::{ExecutionEvent, ExecutionObserver};

/// Logs every finished command under the `vox.executor` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

#[async_trait]
impl ExecutionObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn on_result(&self, event: &ExecutionEvent) {
        let r = &event.result;
        if r.success {
            tracing::info!(
                target: "vox.executor",
                command = %event.command,
                action = %r.action,
                duration_ms = event.duration_ms,
                "command succeeded"
            );
        } else {
            tracing::warn!(
                target: "vox.executor",
                command = %event.command,
                action = %r.action,
                blocked = r.blocked,
                error_code = ?r.error_code,
                duration_ms = event.duration_ms,
                "command failed"
            );
        }
    }
}

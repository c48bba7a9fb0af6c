use async_trait::async_trait;

use super::types::ExecutionEvent;

/// Post-execution hook. The executor calls every registered observer once per
/// `execute`, blocked and failed invocations included, after the result is final.
#[async_trait]
pub trait ExecutionObserver: Send + Sync {
    fn name(&self) -> &str;

    async fn on_result(&self, event: &ExecutionEvent);
}

use async_trait::async_trait;

use super::record::AuditRecord;
use super::writer::AuditTx;
use crate::executor::{ExecutionEvent, ExecutionObserver};
use crate::intent::IntentKind;

/// Writes one audit line per shell or file-op invocation.
///
/// Memory operations and rejected input are not audited.
pub struct AuditObserver {
    tx: AuditTx,
}

impl AuditObserver {
    pub fn new(tx: AuditTx) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ExecutionObserver for AuditObserver {
    fn name(&self) -> &str {
        "audit"
    }

    async fn on_result(&self, event: &ExecutionEvent) {
        if matches!(event.intent, Some(IntentKind::Shell | IntentKind::File)) {
            self.tx
                .record(&AuditRecord::from_result(&event.command, &event.result))
                .await;
        }
    }
}

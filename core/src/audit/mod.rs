mod observer;
mod record;
mod writer;

pub use observer::AuditObserver;
pub use record::{AuditRecord, AuditStatus};
pub use writer::{start_audit_log, AuditTx};

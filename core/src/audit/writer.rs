use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use super::record::AuditRecord;
use crate::config::{expand_path, AuditConfig};
use crate::error::CoreError;

const STDOUT_SINK: &str = "stdout:";

fn audit_preview(s: &str) -> String {
    const MAX: usize = 120;
    if s.len() <= MAX {
        return s.to_string();
    }
    let end = s
        .char_indices()
        .take_while(|(i, _)| *i < MAX)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let mut out = s[..end].to_string();
    out.push('…');
    out
}

/// Cheap-to-clone handle feeding the background audit writer.
#[derive(Clone)]
pub struct AuditTx {
    tx: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
    drop_when_full: bool,
}

impl AuditTx {
    /// Unattached channel; the caller owns the receiving end.
    pub fn channel(capacity: usize, drop_when_full: bool) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
                drop_when_full,
            },
            rx,
        )
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub async fn record(&self, record: &AuditRecord) {
        match serde_json::to_string(record) {
            Ok(line) => self.send_line(line).await,
            Err(e) => tracing::warn!(target: "vox.audit", error = %e, "audit record not serializable"),
        }
    }

    pub async fn send_line(&self, line: String) {
        if self.drop_when_full {
            if self.tx.try_send(line).is_err() {
                let count = self.dropped.fetch_add(1, Ordering::Relaxed);
                if count.is_multiple_of(100) {
                    tracing::warn!(
                        target: "vox.audit",
                        dropped_total = count + 1,
                        "audit channel full, records are being dropped"
                    );
                }
            }
        } else if self.tx.send(line).await.is_err() {
            tracing::debug!(target: "vox.audit", "audit writer closed, send failed");
        }
    }
}

/// Spawns the JSONL writer task. `Ok(None)` means auditing is switched off.
pub async fn start_audit_log(cfg: &AuditConfig) -> Result<Option<AuditTx>, CoreError> {
    if !cfg.enabled {
        tracing::info!(target: "vox.audit", "audit log disabled");
        return Ok(None);
    }
    if cfg.path.trim().is_empty() {
        tracing::warn!(target: "vox.audit", "audit path is empty, audit log disabled");
        return Ok(None);
    }

    let to_stdout = cfg.path == STDOUT_SINK;
    let mut writer: Box<dyn tokio::io::AsyncWrite + Unpin + Send> = if to_stdout {
        Box::new(tokio::io::stdout())
    } else {
        let path = expand_path(&cfg.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CoreError::ConfigIo {
                    path: parent.display().to_string(),
                    source,
                })?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| CoreError::ConfigIo {
                path: path.display().to_string(),
                source,
            })?;
        Box::new(file)
    };

    tracing::info!(
        target: "vox.audit",
        path = %cfg.path,
        channel_capacity = cfg.channel_capacity,
        drop_when_full = cfg.drop_when_full,
        "audit writer started"
    );

    let (handle, mut rx) = AuditTx::channel(cfg.channel_capacity, cfg.drop_when_full);

    tokio::spawn(async move {
        while let Some(mut line) = rx.recv().await {
            if !line.ends_with('\n') {
                line.push('\n');
            }
            tracing::trace!(
                target: "vox.audit",
                bytes = line.len(),
                preview = %audit_preview(line.trim_end())
            );
            if writer.write_all(line.as_bytes()).await.is_err() {
                tracing::error!(target: "vox.audit", "audit write failed, writer task exiting");
                return;
            }
            // One record per command; flush each so a crash loses nothing already audited.
            if writer.flush().await.is_err() {
                tracing::error!(target: "vox.audit", "audit flush failed, writer task exiting");
                return;
            }
        }
        let _ = writer.flush().await;
    });

    Ok(Some(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditStatus;
    use crate::executor::ExecutionResult;

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let p = audit_preview(&long);
        assert!(p.ends_with('…'));
        assert!(p.len() <= 124);
    }

    #[tokio::test]
    async fn full_channel_drops_when_configured() {
        let (tx, mut rx) = AuditTx::channel(1, true);
        tx.send_line("a".into()).await;
        tx.send_line("b".into()).await;
        assert_eq!(tx.dropped_count(), 1);
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn disabled_config_starts_nothing() {
        let cfg = AuditConfig {
            enabled: false,
            ..AuditConfig::default()
        };
        assert!(start_audit_log(&cfg).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_jsonl_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("audit.jsonl");
        let cfg = AuditConfig {
            path: path.display().to_string(),
            ..AuditConfig::default()
        };
        let tx = start_audit_log(&cfg).await.unwrap().unwrap();
        let result = ExecutionResult::ok("Shell Command", "hi");
        tx.record(&AuditRecord::from_result("echo hi", &result)).await;

        let mut content = String::new();
        for _ in 0..50 {
            content = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            if content.ends_with('\n') {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let rec: AuditRecord = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(rec.command, "echo hi");
        assert_eq!(rec.status, AuditStatus::Success);
    }
}

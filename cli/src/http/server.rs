//! HTTP server lifecycle.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::middleware;
use tokio::signal;
use tracing::{info, warn};

use crate::http::{
    middleware::{create_middleware_stack, request_logger},
    routes::create_router,
    AppState,
};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Where to drop the `http-<port>.pid` state file; `None` skips it.
    pub state_dir: Option<PathBuf>,
}

pub async fn start_server(
    config: ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = create_router(state.clone())
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    info!(target: "vox.http", session = %state.session_id, "listening on http://{local}");

    let state_file = match &config.state_dir {
        Some(dir) => Some(write_state_file(dir, &state.session_id, local.port())?),
        None => None,
    };

    let mut shutdown_rx = state.shutdown_tx.subscribe();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = signal::ctrl_c() => info!(target: "vox.http", "received Ctrl+C"),
                _ = shutdown_rx.recv() => info!(target: "vox.http", "received shutdown request"),
                _ = wait_for_sigterm() => info!(target: "vox.http", "received SIGTERM"),
            }
        })
        .await?;

    info!(target: "vox.http", "server stopped");
    if let Some(path) = state_file {
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(target: "vox.http", error = %e, "failed to remove state file");
        }
    }
    Ok(())
}

fn write_state_file(dir: &Path, session_id: &str, port: u16) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("http-{port}.pid"));
    let state = serde_json::json!({
        "session_id": session_id,
        "port": port,
        "pid": std::process::id(),
        "started_at": chrono::Local::now().to_rfc3339(),
    });
    std::fs::write(&path, state.to_string())?;
    info!(target: "vox.http", path = %path.display(), "state file written");
    Ok(path)
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(target: "vox.http", error = %e, "SIGTERM handler unavailable");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::state::ServerStats;
    use std::sync::{Arc, RwLock};
    use std::time::Duration;
    use tokio::sync::broadcast;
    use vox_core::api::AppConfig;
    use vox_plugins::build_services;

    #[test]
    fn test_state_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_state_file(dir.path(), "s-1", 9999).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["session_id"], "s-1");
        assert_eq!(v["port"], 9999);
    }

    #[tokio::test]
    async fn test_server_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.workdir = dir.path().join("ws").display().to_string();
        cfg.memory.enabled = false;
        cfg.audit.enabled = false;

        let services = build_services(&cfg, Vec::new()).await.unwrap();
        let (shutdown_tx, _) = broadcast::channel(1);
        let state = AppState::new(
            "test-lifecycle".into(),
            services,
            Arc::new(RwLock::new(ServerStats::new())),
            shutdown_tx.clone(),
        );
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            state_dir: Some(dir.path().join("servers")),
        };

        let handle = tokio::spawn(async move { start_server(config, state).await.is_ok() });
        tokio::time::sleep(Duration::from_millis(300)).await;
        let _ = shutdown_tx.send(());

        let finished = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(finished, Ok(Ok(true))), "server should shut down gracefully");
        let leftover = std::fs::read_dir(dir.path().join("servers")).unwrap().count();
        assert_eq!(leftover, 0);
    }
}

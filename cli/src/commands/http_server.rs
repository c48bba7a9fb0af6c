//! `vox serve`: builds services and hosts the HTTP API.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use uuid::Uuid;

use vox_core::api::{AppConfig, CliError};
use vox_plugins::build_services;

use crate::commands::cli::HttpServerArgs;
use crate::http::{
    server::{start_server, ServerConfig},
    state::{ServerStats, StatsObserver},
    AppState,
};

pub async fn handle_http_server(args: HttpServerArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let session_id = args
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let host = args.host.unwrap_or_else(|| cfg.http_server.host.clone());
    let port = args.port.unwrap_or(cfg.http_server.port);

    let stats = Arc::new(RwLock::new(ServerStats::new()));
    let services = build_services(cfg, vec![Arc::new(StatsObserver::new(stats.clone()))]).await?;
    let (shutdown_tx, _) = broadcast::channel(1);
    let state = AppState::new(session_id, services, stats, shutdown_tx);

    let config = ServerConfig {
        host,
        port,
        state_dir: dirs::home_dir().map(|h| h.join(".vox").join("servers")),
    };
    start_server(config, state)
        .await
        .map_err(|e| CliError::Command(e.to_string()))?;
    Ok(0)
}

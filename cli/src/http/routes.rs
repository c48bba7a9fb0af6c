//! HTTP route handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde_json::Value;

use vox_core::api::{MemoryEntry, MemoryStats, PolicyVerdict};

use crate::http::{models::*, state::AppState};

const DEFAULT_HISTORY_LIMIT: usize = 10;
const MAX_HISTORY_LIMIT: usize = 1000;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/command", post(command_handler))
        .route("/api/v1/policy/check", post(policy_check_handler))
        .route("/api/v1/memory", get(memory_handler))
        .route("/api/v1/history", get(history_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/shutdown", post(shutdown_handler))
        .with_state(state)
}

/// POST /api/v1/command
async fn command_handler(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Response {
    state.stats_mut().increment_request("/api/v1/command");

    let result = state.services.executor.execute_value(&req.command).await;
    let status = status_for(&result);
    if status.is_server_error() {
        state.stats_mut().increment_error();
    }
    (status, Json(result)).into_response()
}

/// POST /api/v1/policy/check
async fn policy_check_handler(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<PolicyVerdict>, HttpServerError> {
    state.stats_mut().increment_request("/api/v1/policy/check");

    match &req.command {
        Value::String(_) => Ok(Json(state.services.policy.check_value(&req.command))),
        _ => Err(HttpServerError::InvalidRequest(
            "command must be a string".into(),
        )),
    }
}

/// GET /api/v1/memory
async fn memory_handler(
    State(state): State<AppState>,
) -> Result<Json<MemoryResponse>, HttpServerError> {
    state.stats_mut().increment_request("/api/v1/memory");

    match load_memory(&state).await {
        Ok((entries, stats)) => Ok(Json(MemoryResponse { entries, stats })),
        Err(e) => {
            state.stats_mut().increment_error();
            Err(HttpServerError::Memory(e.to_string()))
        }
    }
}

async fn load_memory(state: &AppState) -> anyhow::Result<(Vec<MemoryEntry>, MemoryStats)> {
    let memory = &state.services.memory;
    Ok((memory.get_all_memory().await?, memory.get_memory_stats().await?))
}

/// GET /api/v1/history?limit=N
async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, HttpServerError> {
    state.stats_mut().increment_request("/api/v1/history");

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    match state.services.memory.get_command_history(limit).await {
        Ok(entries) => Ok(Json(HistoryResponse { entries })),
        Err(e) => {
            state.stats_mut().increment_error();
            Err(HttpServerError::Memory(e.to_string()))
        }
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.stats();
    Json(HealthResponse {
        status: "healthy".into(),
        session_id: state.session_id.clone(),
        uptime_seconds: stats.uptime_seconds(),
        requests_handled: stats.requests_total,
        commands_succeeded: stats.commands_succeeded,
        commands_blocked: stats.commands_blocked,
        commands_failed: stats.commands_failed,
        timestamp: Local::now().to_rfc3339(),
    })
}

/// POST /api/v1/shutdown
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.shutdown_tx.send(());
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "message": "Shutdown signal sent"
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::state::{ServerStats, StatsObserver};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::{Arc, RwLock};
    use tokio::sync::broadcast;
    use tower::ServiceExt;
    use vox_core::api::AppConfig;
    use vox_plugins::build_services;

    async fn test_state(dir: &std::path::Path) -> AppState {
        let mut cfg = AppConfig::default();
        cfg.workdir = dir.join("ws").display().to_string();
        cfg.memory.path = dir.join("memory.json").display().to_string();
        cfg.audit.enabled = false;

        let stats = Arc::new(RwLock::new(ServerStats::new()));
        let observer = Arc::new(StatsObserver::new(stats.clone()));
        let services = build_services(&cfg, vec![observer]).await.unwrap();
        let (shutdown_tx, _) = broadcast::channel(1);
        AppState::new("test-session".into(), services, stats, shutdown_tx)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_command_status_codes() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path()).await);

        let ok = app
            .clone()
            .oneshot(post_json("/api/v1/command", serde_json::json!({"command": "create file a.txt"})))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_json(ok).await["action"], "Create File");

        let blocked = app
            .clone()
            .oneshot(post_json("/api/v1/command", serde_json::json!({"command": "rm -rf /"})))
            .await
            .unwrap();
        assert_eq!(blocked.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(blocked).await["errorCode"], "E_COMMAND_BLOCKED");

        let empty = app
            .clone()
            .oneshot(post_json("/api/v1/command", serde_json::json!({"command": "  "})))
            .await
            .unwrap();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let missing = app
            .clone()
            .oneshot(post_json("/api/v1/command", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(missing).await["errorCode"], "E_PARSE_ERROR");

        let dup = app
            .oneshot(post_json("/api/v1/command", serde_json::json!({"command": "create file a.txt"})))
            .await
            .unwrap();
        assert_eq!(dup.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_policy_check() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path()).await);

        let resp = app
            .clone()
            .oneshot(post_json("/api/v1/policy/check", serde_json::json!({"command": "ls && whoami"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = body_json(resp).await;
        assert_eq!(v["safe"], false);
        assert_eq!(v["stage"], "chaining");

        let bad = app
            .oneshot(post_json("/api/v1/policy/check", serde_json::json!({"command": 7})))
            .await
            .unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_memory_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path()).await);

        app.clone()
            .oneshot(post_json("/api/v1/command", serde_json::json!({"command": "remember colour is blue"})))
            .await
            .unwrap();

        let mem = app
            .clone()
            .oneshot(Request::get("/api/v1/memory").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let v = body_json(mem).await;
        assert_eq!(v["entries"][0]["value"], "blue");
        assert_eq!(v["stats"]["total_keys"], 1);

        let hist = app
            .oneshot(Request::get("/api/v1/history?limit=5").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let v = body_json(hist).await;
        assert_eq!(v["entries"][0]["command"], "remember colour is blue");
    }

    #[tokio::test]
    async fn test_health_counts_commands() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path()).await);

        app.clone()
            .oneshot(post_json("/api/v1/command", serde_json::json!({"command": "sudo ls"})))
            .await
            .unwrap();
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let v = body_json(resp).await;
        assert_eq!(v["status"], "healthy");
        assert_eq!(v["session_id"], "test-session");
        assert_eq!(v["commands_blocked"], 1);
    }

    #[tokio::test]
    async fn test_shutdown_broadcasts() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        let mut rx = state.shutdown_tx.subscribe();
        let app = create_router(state);

        let resp = app
            .oneshot(
                Request::post("/api/v1/shutdown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(rx.try_recv().is_ok());
    }
}

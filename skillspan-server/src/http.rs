//! HTTP server exposing the execution sandbox
//!
//! `POST /api/code/execute` accepts `{language, code, stdin?}` and answers
//! with `{success, output, error?}`: 200 for any finished execution, 400 for
//! a rejected request, 500 when the service itself failed.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use skillspan_sandbox::{
    ExecutionRequest, ExecutionResult, ProcessRuntime, ResourceLimits, SandboxError,
    SandboxService,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct AppState {
    sandbox: Arc<SandboxService>,
    /// Bounds how many executions run at once
    permits: Arc<Semaphore>,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(sandbox: SandboxService, max_concurrent_executions: usize) -> Self {
        Self {
            sandbox: Arc::new(sandbox),
            permits: Arc::new(Semaphore::new(max_concurrent_executions)),
            started_at: Utc::now(),
        }
    }

    /// Build a process-backed sandbox from configuration
    pub fn from_config(config: &ServerConfig) -> Self {
        let runtime = if config.sandbox.kill_process_group {
            ProcessRuntime::new()
        } else {
            ProcessRuntime::direct_child_only()
        };
        let mut sandbox = SandboxService::new(runtime).with_limits(config.sandbox.limits.clone());
        if let Some(root) = &config.sandbox.workspace_root {
            sandbox = sandbox.with_workspace_root(root);
        }
        Self::new(sandbox, config.server.max_concurrent_executions)
    }

    pub fn limits(&self) -> &ResourceLimits {
        self.sandbox.limits()
    }
}

/// Create the server router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/code/execute", post(execute_code))
        .route("/api/code/languages", get(list_languages))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn start_server(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(state);

    let bind_addr = listener
        .local_addr()
        .context("Failed to obtain server bind address")?;
    info!("Starting execution server on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Execution server error")?;

    info!("Execution server stopped");
    Ok(())
}

/// Handle POST /api/code/execute
async fn execute_code(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ExecutionResult>, ApiError> {
    let request = parse_request(&body);

    let submission = request.validate().map_err(|e| {
        debug!(reason = %e, "Rejected execute request");
        e
    })?;

    let _permit = state
        .permits
        .acquire()
        .await
        .map_err(|_| SandboxError::Internal("executor is shutting down".to_string()))?;

    let result = state.sandbox.execute_submission(submission).await?;
    Ok(Json(result))
}

/// Anything that is not a JSON object is treated as an empty request
fn parse_request(body: &[u8]) -> ExecutionRequest {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
            debug!("Unusable execute body: {}", e);
            ExecutionRequest::default()
        }),
        Ok(other) => {
            debug!(kind = json_kind(&other), "Execute body is not a JSON object");
            ExecutionRequest::default()
        }
        Err(e) => {
            debug!("Unparseable execute body: {}", e);
            ExecutionRequest::default()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Handle GET /api/code/languages
async fn list_languages(State(state): State<AppState>) -> Json<Value> {
    let languages: Vec<&str> = state
        .sandbox
        .supported_languages()
        .iter()
        .map(|lang| lang.as_str())
        .collect();
    Json(json!({ "languages": languages }))
}

/// Handle GET /health
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "runtime": state.sandbox.runtime_name(),
        "started_at": state.started_at,
        "available_slots": state.permits.available_permits(),
    }))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    debug!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "HTTP request"
    );
    response
}

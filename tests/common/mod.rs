//! Common test utilities shared across integration and E2E tests

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use skillspan_server::{start_server, AppState, ServerConfig};
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Setup logging for tests
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("skillspan_server=debug,skillspan_sandbox=debug")
        .with_test_writer()
        .try_init();
}

/// True when `program` can be launched with the given probe arguments
pub fn toolchain_available(program: &str, probe: &[&str]) -> bool {
    Command::new(program)
        .args(probe)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

pub fn node_available() -> bool {
    toolchain_available("node", &["--version"])
}

pub fn python_available() -> bool {
    toolchain_available("python", &["--version"])
        || toolchain_available("python3", &["--version"])
}

pub fn java_available() -> bool {
    toolchain_available("javac", &["-version"]) && toolchain_available("java", &["-version"])
}

/// Skip the current test when a toolchain is missing
#[macro_export]
macro_rules! require_toolchain {
    ($available:expr, $name:literal) => {
        if !$available {
            eprintln!("skipping: {} toolchain not installed", $name);
            return;
        }
    };
}

/// A real execution server bound to an ephemeral port.
///
/// Workspaces are created under a private root so tests can check that
/// nothing is left behind.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    workspace_root: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(mut config: ServerConfig) -> Result<Self> {
        let workspace_root = tempfile::tempdir().context("Failed to create workspace root")?;
        config.sandbox.workspace_root = Some(workspace_root.path().to_path_buf());
        config.server.port = 0;

        let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();

        let state = AppState::from_config(&config);
        let handle = tokio::spawn(start_server(listener, state, async move {
            let _ = rx.await;
        }));

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()?,
            workspace_root,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body to the execute endpoint
    pub async fn execute(&self, body: Value) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(self.url("/api/code/execute"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// POST raw bytes to the execute endpoint
    pub async fn execute_raw(&self, body: &'static str) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(self.url("/api/code/execute"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        Ok(self
            .client
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    /// Entries currently present under the workspace root
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.workspace_root.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await??;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

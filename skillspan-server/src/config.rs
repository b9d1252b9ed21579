//! Configuration management for the execution server

use serde::{Deserialize, Serialize};
use skillspan_sandbox::ResourceLimits;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub sandbox: SandboxConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Executions allowed to run at once; further requests wait their turn
    pub max_concurrent_executions: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_concurrent_executions: 8,
        }
    }
}

/// Sandbox configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    #[serde(flatten)]
    pub limits: ResourceLimits,
    /// Parent directory for per-request workspaces (system temp dir if unset)
    pub workspace_root: Option<PathBuf>,
    /// Kill the program's whole process group on timeout and exit, not just the child
    pub kill_process_group: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            limits: ResourceLimits::default(),
            workspace_root: None,
            kill_process_group: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: String,
    /// Optional log file, written in addition to stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Values taken from the command line or environment, applied last
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout: Option<Duration>,
    pub max_concurrent_executions: Option<usize>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the given file when present
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(timeout) = overrides.timeout {
            self.sandbox.limits.timeout = timeout;
        }
        if let Some(max) = overrides.max_concurrent_executions {
            self.server.max_concurrent_executions = max;
        }
        if overrides.log_file.is_some() {
            self.logging.file = overrides.log_file;
        }
        if overrides.verbose {
            self.logging.level = "debug".to_string();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_concurrent_executions == 0 {
            return Err(ConfigError::Invalid(
                "server.max_concurrent_executions must be at least 1".to_string(),
            ));
        }
        if self.sandbox.limits.timeout.is_zero() || self.sandbox.limits.compile_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "sandbox timeouts must be greater than zero".to_string(),
            ));
        }
        if self.sandbox.limits.max_output_bytes == 0 {
            return Err(ConfigError::Invalid(
                "sandbox.max_output_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

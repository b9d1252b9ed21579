//! Core types for sandbox execution

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ValidationError;
use crate::language::{CommandCandidate, Language};

/// Reported output for a successful run that printed nothing
pub const NO_OUTPUT: &str = "No output";

/// Appended to the output when a stream exceeded the capture limit
pub const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// Inbound request to execute code, as received from the web layer.
///
/// Fields stay loosely typed so that validation, not deserialization,
/// decides which rejection the caller sees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionRequest {
    #[serde(default)]
    pub language: Option<Value>,

    #[serde(default)]
    pub code: Option<Value>,

    #[serde(default)]
    pub stdin: Option<Value>,
}

impl ExecutionRequest {
    /// Create a simple execution request
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: Some(Value::String(language.into())),
            code: Some(Value::String(code.into())),
            stdin: None,
        }
    }

    /// Set standard input
    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(Value::String(stdin.into()));
        self
    }

    /// Check the request in order: language, code, stdin
    pub fn validate(&self) -> Result<Submission, ValidationError> {
        let language = match &self.language {
            Some(Value::String(name)) => name.parse::<Language>()?,
            _ => return Err(ValidationError::UnsupportedLanguage),
        };

        let source = match &self.code {
            Some(Value::String(code)) if !code.trim().is_empty() => code.clone(),
            _ => return Err(ValidationError::CodeRequired),
        };

        let stdin = match &self.stdin {
            None => String::new(),
            Some(Value::String(stdin)) => stdin.clone(),
            Some(_) => return Err(ValidationError::StdinNotString),
        };

        Ok(Submission {
            language,
            source,
            stdin,
        })
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub language: Language,
    pub source: String,
    pub stdin: String,
}

impl Submission {
    pub fn new(language: Language, source: impl Into<String>) -> Self {
        Self {
            language,
            source: source.into(),
            stdin: String::new(),
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }
}

/// One process launch handed to a [`crate::Runtime`]
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: CommandCandidate,
    pub working_dir: PathBuf,
    pub stdin: String,
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl Invocation {
    /// Launch settings with the command left to be filled per candidate
    pub fn template(
        working_dir: impl Into<PathBuf>,
        stdin: impl Into<String>,
        timeout: Duration,
        max_output_bytes: usize,
    ) -> Self {
        Self {
            command: CommandCandidate::default(),
            working_dir: working_dir.into(),
            stdin: stdin.into(),
            timeout,
            max_output_bytes,
        }
    }

    /// Same settings, different command
    pub fn with_command(&self, command: CommandCandidate) -> Self {
        Self {
            command,
            ..self.clone()
        }
    }
}

/// Raw result of one process invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub ok: bool,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process never started or was killed by a signal
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub duration_ms: u64,
    /// Whether either stream exceeded the capture limit
    #[serde(default)]
    pub truncated: bool,
}

impl ExecutionOutcome {
    /// Outcome of a process that ran to exit or was killed on timeout.
    /// A timed-out process is never ok, whatever its exit status.
    pub fn finished(
        exit_code: Option<i32>,
        timed_out: bool,
        stdout: String,
        stderr: String,
        duration_ms: u64,
    ) -> Self {
        Self {
            ok: exit_code == Some(0) && !timed_out,
            stdout,
            stderr,
            exit_code,
            timed_out,
            duration_ms,
            truncated: false,
        }
    }

    /// Outcome of a process that could not be launched
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            stderr: message.into(),
            ..Self::default()
        }
    }

    /// Outcome when a language has no candidate left to try
    pub fn runtime_not_found() -> Self {
        Self::launch_failure("No executable runtime found for this language")
    }

    /// Human-readable failure reason; always non-empty
    pub fn failure_message(&self) -> String {
        if self.timed_out {
            return "Execution timed out".to_string();
        }

        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }

        "Execution failed".to_string()
    }
}

/// Caller-facing result of an execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Map the final outcome of the pipeline to the public shape
    pub fn from_outcome(outcome: &ExecutionOutcome) -> Self {
        let mut output = if outcome.ok && outcome.stdout.is_empty() {
            NO_OUTPUT.to_string()
        } else {
            outcome.stdout.clone()
        };
        if outcome.truncated {
            output.push_str(TRUNCATION_MARKER);
        }

        if outcome.ok {
            Self {
                success: true,
                output,
                error: None,
            }
        } else {
            Self {
                success: false,
                output,
                error: Some(outcome.failure_message()),
            }
        }
    }
}

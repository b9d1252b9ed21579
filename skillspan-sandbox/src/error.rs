//! Error types for the execution dispatcher

use thiserror::Error;

/// Reasons a request is rejected before any workspace is allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported language")]
    UnsupportedLanguage,

    #[error("Code is required")]
    CodeRequired,

    #[error("stdin must be a string")]
    StdinNotString,
}

/// Errors surfaced by [`crate::SandboxService::execute`].
///
/// A user program failing (compile error, crash, timeout, missing toolchain)
/// is *not* an error here; it is reported through a normal
/// [`crate::ExecutionResult`] with `success == false`.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Execution service failed: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("Execution service failed: {0}")]
    Internal(String),
}

impl SandboxError {
    /// Whether this error originates in the dispatcher's own plumbing
    pub fn is_service_fault(&self) -> bool {
        !matches!(self, SandboxError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;

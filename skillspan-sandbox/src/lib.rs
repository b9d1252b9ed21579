//! SkillSpan Sandbox - remote code execution for interview sessions
//!
//! Accepts untrusted source code in one of a few languages, compiles and runs
//! it in a throwaway workspace with a wall-clock budget, and reports a
//! normalized `{success, output, error}` result.

mod candidates;
mod error;
mod execution;
mod language;
mod limits;
mod runtime;
mod service;
#[cfg(test)]
mod testing;
mod types;
mod workspace;

pub use candidates::{is_missing_executable, run_candidates};
pub use error::{Result, SandboxError, ValidationError};
pub use execution::{ExecutionId, ExecutionStage, ExecutionState};
pub use language::{CommandCandidate, Language, LanguageStrategy};
pub use limits::{ResourceLimits, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};
pub use runtime::{ProcessRuntime, Runtime};
pub use service::SandboxService;
pub use types::{
    ExecutionOutcome, ExecutionRequest, ExecutionResult, Invocation, Submission, NO_OUTPUT,
    TRUNCATION_MARKER,
};
pub use workspace::{Workspace, WORKSPACE_PREFIX};

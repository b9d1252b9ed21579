//! Sandbox service - main entry point

use crate::candidates::run_candidates;
use crate::error::Result;
use crate::execution::{ExecutionId, ExecutionStage, ExecutionState};
use crate::language::Language;
use crate::limits::ResourceLimits;
use crate::runtime::{ProcessRuntime, Runtime};
use crate::types::{ExecutionOutcome, ExecutionRequest, ExecutionResult, Invocation, Submission};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;

/// Execution dispatcher.
///
/// Holds only read-only configuration, so one instance can be shared
/// behind an `Arc` by any number of concurrent requests.
pub struct SandboxService {
    runtime: Arc<dyn Runtime>,
    limits: ResourceLimits,
    workspace_root: PathBuf,
}

impl SandboxService {
    /// Create a new sandbox service with the given runtime
    pub fn new(runtime: impl Runtime + 'static) -> Self {
        Self::from_arc(Arc::new(runtime))
    }

    /// Create a sandbox service around an already shared runtime
    pub fn from_arc(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            runtime,
            limits: ResourceLimits::default(),
            workspace_root: std::env::temp_dir(),
        }
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Directory under which per-request workspaces are created
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Get the runtime name
    pub fn runtime_name(&self) -> &str {
        self.runtime.name()
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        &Language::ALL
    }

    /// Validate and execute a request.
    ///
    /// `Err` means the request was rejected or the service itself failed;
    /// a failing user program is an `Ok` result with `success == false`.
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult> {
        let id = ExecutionId::new();
        let span = tracing::info_span!("execution", execution_id = %id);

        async move {
            let mut state = ExecutionState::new(id);
            let submission = match request.validate() {
                Ok(submission) => submission,
                Err(e) => {
                    state.advance(ExecutionStage::Rejected);
                    tracing::info!(reason = %e, "Request rejected");
                    return Err(e.into());
                }
            };
            self.dispatch(&mut state, submission).await
        }
        .instrument(span)
        .await
    }

    /// Execute an already validated submission
    pub async fn execute_submission(&self, submission: Submission) -> Result<ExecutionResult> {
        let id = ExecutionId::new();
        let span = tracing::info_span!("execution", execution_id = %id);

        async move {
            let mut state = ExecutionState::new(id);
            self.dispatch(&mut state, submission).await
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        state: &mut ExecutionState,
        submission: Submission,
    ) -> Result<ExecutionResult> {
        tracing::info!(
            language = %submission.language,
            runtime = self.runtime.name(),
            code_len = submission.source.len(),
            stdin_len = submission.stdin.len(),
            "Executing code"
        );

        let workspace = Workspace::create(&self.workspace_root).await?;
        state.advance(ExecutionStage::WorkspaceReady);

        // Dropping the workspace on an early exit still removes it
        let outcome = self.run_in_workspace(state, &workspace, &submission).await;

        state.advance(ExecutionStage::CleaningUp);
        workspace.close().await;
        state.advance(ExecutionStage::Done);

        let outcome = outcome?;
        let result = ExecutionResult::from_outcome(&outcome);
        tracing::info!(
            success = result.success,
            exit_code = ?outcome.exit_code,
            timed_out = outcome.timed_out,
            duration_ms = outcome.duration_ms,
            truncated = outcome.truncated,
            "Execution finished"
        );
        Ok(result)
    }

    async fn run_in_workspace(
        &self,
        state: &mut ExecutionState,
        workspace: &Workspace,
        submission: &Submission,
    ) -> Result<ExecutionOutcome> {
        let strategy = submission.language.strategy();
        let dir = workspace.path();
        workspace
            .write_source(strategy.source_file(), &submission.source)
            .await?;

        if let Some(compile) = strategy.compile_candidates(dir) {
            state.advance(ExecutionStage::Compiling);
            let template = Invocation::template(
                dir,
                "",
                self.limits.compile_timeout,
                self.limits.max_output_bytes,
            );
            let outcome = run_candidates(self.runtime.as_ref(), &compile, &template).await;
            if !outcome.ok {
                tracing::info!(
                    exit_code = ?outcome.exit_code,
                    timed_out = outcome.timed_out,
                    "Compilation failed, skipping run"
                );
                state.advance(finished_stage(&outcome));
                return Ok(outcome);
            }
        }

        state.advance(ExecutionStage::Running);
        let template = Invocation::template(
            dir,
            submission.stdin.as_str(),
            self.limits.timeout,
            self.limits.max_output_bytes,
        );
        let outcome = run_candidates(
            self.runtime.as_ref(),
            &strategy.run_candidates(dir),
            &template,
        )
        .await;
        state.advance(finished_stage(&outcome));
        Ok(outcome)
    }
}

impl Default for SandboxService {
    fn default() -> Self {
        Self::new(ProcessRuntime::new())
    }
}

fn finished_stage(outcome: &ExecutionOutcome) -> ExecutionStage {
    if outcome.timed_out {
        ExecutionStage::TimedOut
    } else {
        ExecutionStage::Completed
    }
}

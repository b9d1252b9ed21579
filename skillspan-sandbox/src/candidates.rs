//! Ordered command-candidate fallback

use regex::Regex;
use std::sync::OnceLock;

use crate::language::CommandCandidate;
use crate::runtime::Runtime;
use crate::types::{ExecutionOutcome, Invocation};

fn missing_executable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)not recognized|enoent|cannot find|command not found|no such file or directory \(os error 2\)",
        )
        .expect("missing-executable pattern is valid")
    })
}

/// Whether a launch error says the executable does not exist
pub fn is_missing_executable(stderr: &str) -> bool {
    missing_executable_pattern().is_match(stderr)
}

/// Where the fallback loop stands after one attempt
#[derive(Debug)]
enum Attempt {
    /// The executable ran (successfully or not); stop here
    Found(ExecutionOutcome),
    /// The executable is absent; try the next candidate
    Missing(ExecutionOutcome),
}

impl Attempt {
    /// Only a tool that never started counts as missing; anything with an
    /// exit status or a timeout ran and its outcome is final.
    fn classify(outcome: ExecutionOutcome) -> Self {
        let never_started = outcome.exit_code.is_none() && !outcome.timed_out;
        if !outcome.ok && never_started && is_missing_executable(&outcome.stderr) {
            Attempt::Missing(outcome)
        } else {
            Attempt::Found(outcome)
        }
    }
}

/// Try `candidates` strictly in order.
///
/// Success or any failure other than "executable not found" is terminal.
/// When no candidate could be launched the result is
/// [`ExecutionOutcome::runtime_not_found`].
pub async fn run_candidates(
    runtime: &dyn Runtime,
    candidates: &[CommandCandidate],
    template: &Invocation,
) -> ExecutionOutcome {
    for candidate in candidates {
        let invocation = template.with_command(candidate.clone());
        match Attempt::classify(runtime.invoke(&invocation).await) {
            Attempt::Found(outcome) => return outcome,
            Attempt::Missing(outcome) => {
                tracing::debug!(
                    program = %candidate.program,
                    stderr = %outcome.stderr.trim(),
                    "Executable not found, trying next candidate"
                );
            }
        }
    }

    tracing::warn!(candidates = candidates.len(), "No executable runtime found");
    ExecutionOutcome::runtime_not_found()
}

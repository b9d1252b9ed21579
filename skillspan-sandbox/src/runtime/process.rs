//! Process-based runtime

use crate::types::{ExecutionOutcome, Invocation};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// How long to wait for output pipes to close once the process is gone
const DRAIN_GRACE: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 8 * 1024;

/// Process-based runtime - launches toolchains directly, without a shell
pub struct ProcessRuntime {
    kill_process_group: bool,
}

impl ProcessRuntime {
    pub fn new() -> Self {
        Self {
            kill_process_group: true,
        }
    }

    /// Only signal the direct child on timeout, leaving its descendants alone
    pub fn direct_child_only() -> Self {
        Self {
            kill_process_group: false,
        }
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.command.program);
        command
            .args(&invocation.command.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so the whole tree can be signalled at once
        #[cfg(unix)]
        if self.kill_process_group {
            command.process_group(0);
        }

        command
    }
}

impl Default for ProcessRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::Runtime for ProcessRuntime {
    async fn invoke(&self, invocation: &Invocation) -> ExecutionOutcome {
        let start = Instant::now();
        let program = &invocation.command.program;

        let mut child = match self.command(invocation).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(program = %program, error = %e, "Failed to spawn process");
                return ExecutionOutcome::launch_failure(format!(
                    "Failed to spawn `{}`: {}",
                    program, e
                ));
            }
        };

        // `Child::id` is gone once the child has been reaped
        let pid = child.id();
        tracing::debug!(pid, command = %invocation.command, "Process spawned");

        // Feed stdin from its own task so a child that never reads can't stall us
        if let Some(mut stdin) = child.stdin.take() {
            let input = invocation.stdin.clone().into_bytes();
            tokio::spawn(async move {
                if !input.is_empty() {
                    let _ = stdin.write_all(&input).await;
                }
                let _ = stdin.shutdown().await;
            });
        }

        let limit = invocation.max_output_bytes;
        let stdout_task = tokio::spawn(capture(child.stdout.take(), limit));
        let stderr_task = tokio::spawn(capture(child.stderr.take(), limit));

        let mut timed_out = false;
        let mut wait_error = None;

        let exit_code = match tokio::time::timeout(invocation.timeout, child.wait()).await {
            Ok(Ok(status)) => status.code(),
            Ok(Err(e)) => {
                wait_error = Some(format!("Process wait error: {}", e));
                None
            }
            Err(_) => {
                // Timeout - kill the process tree, then reap the child
                timed_out = true;
                tracing::warn!(
                    pid,
                    timeout_ms = invocation.timeout.as_millis() as u64,
                    "Process timed out, killing"
                );
                if self.kill_process_group {
                    kill_process_group(pid);
                }
                let _ = child.kill().await;
                None
            }
        };

        // Reap anything the program left running in its group
        if self.kill_process_group {
            kill_process_group(pid);
        }

        let stdout = drain(stdout_task).await;
        let stderr = drain(stderr_task).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let mut stderr_text = String::from_utf8_lossy(&stderr.bytes).into_owned();
        if let Some(message) = wait_error {
            if !stderr_text.is_empty() && !stderr_text.ends_with('\n') {
                stderr_text.push('\n');
            }
            stderr_text.push_str(&message);
        }

        let mut outcome = ExecutionOutcome::finished(
            exit_code,
            timed_out,
            String::from_utf8_lossy(&stdout.bytes).into_owned(),
            stderr_text,
            duration_ms,
        );
        outcome.truncated = stdout.truncated || stderr.truncated;

        tracing::debug!(
            pid,
            exit_code = ?outcome.exit_code,
            timed_out,
            duration_ms,
            stdout_len = outcome.stdout.len(),
            stderr_len = outcome.stderr.len(),
            "Process finished"
        );

        outcome
    }

    fn name(&self) -> &str {
        "process"
    }
}

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Read a stream to EOF, keeping at most `limit` bytes.
///
/// Bytes past the limit are still read and discarded so the writer never
/// blocks on a full pipe.
async fn capture<R: AsyncRead + Unpin>(stream: Option<R>, limit: usize) -> Captured {
    let mut captured = Captured::default();
    let Some(mut stream) = stream else {
        return captured;
    };

    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = limit.saturating_sub(captured.bytes.len());
                if n > room {
                    captured.truncated = true;
                }
                captured.bytes.extend_from_slice(&buf[..n.min(room)]);
            }
        }
    }
    captured
}

async fn drain(task: tokio::task::JoinHandle<Captured>) -> Captured {
    let abort = task.abort_handle();
    match tokio::time::timeout(DRAIN_GRACE, task).await {
        Ok(Ok(captured)) => captured,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Output reader task failed");
            Captured::default()
        }
        Err(_) => {
            tracing::warn!("Output pipe still open after process exit, giving up");
            abort.abort();
            Captured::default()
        }
    }
}

/// Kill the entire process group led by `pid` via `killpg(SIGKILL)`.
///
/// No-op if the group is already gone or the PID cannot be represented as `i32`.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) {
        let pgid = nix::unistd::Pid::from_raw(pid);
        let _ = nix::sys::signal::killpg(pgid, nix::sys::signal::Signal::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

//! Runtime trait and implementations

mod process;

use crate::types::{ExecutionOutcome, Invocation};
use async_trait::async_trait;

pub use process::ProcessRuntime;

/// Runtime abstraction for launching one toolchain process.
///
/// Implementations are total: launch errors, crashes and timeouts are all
/// reported inside the returned [`ExecutionOutcome`], never as `Err`.
#[async_trait]
pub trait Runtime: Send + Sync {
    /// Run the invocation to completion, timeout or launch failure
    async fn invoke(&self, invocation: &Invocation) -> ExecutionOutcome;

    /// Get runtime name
    fn name(&self) -> &str;
}

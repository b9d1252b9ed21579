//! Execution identity and lifecycle stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique execution identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub uuid::Uuid);

impl ExecutionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage of a single request's linear pass through the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStage {
    Validating,
    Rejected,
    WorkspaceReady,
    Compiling,
    Running,
    TimedOut,
    Completed,
    CleaningUp,
    Done,
}

impl ExecutionStage {
    fn rank(self) -> u8 {
        match self {
            ExecutionStage::Validating => 0,
            ExecutionStage::Rejected => 1,
            ExecutionStage::WorkspaceReady => 1,
            ExecutionStage::Compiling => 2,
            ExecutionStage::Running => 3,
            ExecutionStage::TimedOut | ExecutionStage::Completed => 4,
            ExecutionStage::CleaningUp => 5,
            ExecutionStage::Done => 6,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStage::Rejected | ExecutionStage::Done)
    }

    /// Whether `next` may follow `self`; stages are never re-entered
    pub fn can_advance_to(self, next: ExecutionStage) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// Tracks and logs the stage of one execution
#[derive(Debug)]
pub struct ExecutionState {
    pub id: ExecutionId,
    stage: ExecutionStage,
}

impl ExecutionState {
    pub fn new(id: ExecutionId) -> Self {
        Self {
            id,
            stage: ExecutionStage::Validating,
        }
    }

    pub fn stage(&self) -> ExecutionStage {
        self.stage
    }

    pub fn advance(&mut self, next: ExecutionStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "out-of-order stage transition {:?} -> {:?}",
            self.stage,
            next
        );
        if !self.stage.can_advance_to(next) {
            tracing::warn!(
                execution_id = %self.id,
                from = ?self.stage,
                to = ?next,
                "Out-of-order execution stage transition"
            );
        }
        tracing::debug!(execution_id = %self.id, from = ?self.stage, to = ?next, "Stage transition");
        self.stage = next;
    }
}

//! In-memory runtime double for dispatcher tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::runtime::Runtime;
use crate::types::{ExecutionOutcome, Invocation};

/// What the scripted runtime saw for one call
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    pub invocation: Invocation,
    /// Files present in the working directory at launch time
    pub files: Vec<String>,
}

/// Runtime returning canned outcomes per program name.
///
/// Programs with no script left behave like a missing executable.
#[derive(Default)]
pub struct ScriptedRuntime {
    scripts: Mutex<HashMap<String, VecDeque<ExecutionOutcome>>>,
    calls: Mutex<Vec<RecordedInvocation>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next launch of `program`
    pub fn on(self, program: &str, outcome: ExecutionOutcome) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<RecordedInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn invoked_programs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.invocation.command.program)
            .collect()
    }

    pub fn working_dirs(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .map(|call| call.invocation.working_dir)
            .collect()
    }
}

#[async_trait]
impl Runtime for ScriptedRuntime {
    async fn invoke(&self, invocation: &Invocation) -> ExecutionOutcome {
        let mut files: Vec<String> = std::fs::read_dir(&invocation.working_dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        files.sort();

        self.calls.lock().unwrap().push(RecordedInvocation {
            invocation: invocation.clone(),
            files,
        });

        let program = &invocation.command.program;
        self.scripts
            .lock()
            .unwrap()
            .get_mut(program)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                ExecutionOutcome::launch_failure(format!(
                    "Failed to spawn `{}`: No such file or directory (os error 2)",
                    program
                ))
            })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

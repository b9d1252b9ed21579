//! Supported languages and their toolchain invocation strategies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::ValidationError;

/// Languages the sandbox can compile and run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Java,
}

impl Language {
    /// The supported set, in display order
    pub const ALL: [Language; 3] = [Language::JavaScript, Language::Python, Language::Java];

    /// Wire name used by the HTTP surface
    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
        }
    }

    /// Invocation strategy for this language
    pub fn strategy(self) -> LanguageStrategy {
        match self {
            Language::JavaScript => LanguageStrategy {
                source_file: "main.js",
                compile: None,
                run: vec![CommandTemplate::new("node", &[SOURCE])],
            },
            Language::Python => LanguageStrategy {
                source_file: "main.py",
                compile: None,
                run: vec![
                    CommandTemplate::new("python", &[SOURCE]),
                    CommandTemplate::new("py", &["-3", SOURCE]),
                    CommandTemplate::new("python3", &[SOURCE]),
                ],
            },
            Language::Java => LanguageStrategy {
                source_file: "Solution.java",
                compile: Some(vec![CommandTemplate::new("javac", &[SOURCE])]),
                run: vec![CommandTemplate::new(
                    "java",
                    &["-cp", WORKSPACE, "Solution"],
                )],
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or(ValidationError::UnsupportedLanguage)
    }
}

/// Placeholder replaced with the absolute source file path
const SOURCE: &str = "{source}";
/// Placeholder replaced with the workspace directory
const WORKSPACE: &str = "{workspace}";

/// One concrete way to invoke a toolchain: executable plus arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandCandidate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandCandidate {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Static command shape, resolved against a workspace at execution time
#[derive(Debug, Clone, Copy)]
struct CommandTemplate {
    program: &'static str,
    args: &'static [&'static str],
}

impl CommandTemplate {
    const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }

    fn resolve(&self, workspace: &Path, source: &Path) -> CommandCandidate {
        let args = self.args.iter().map(|arg| match *arg {
            SOURCE => source.to_string_lossy().into_owned(),
            WORKSPACE => workspace.to_string_lossy().into_owned(),
            other => other.to_string(),
        });
        CommandCandidate::new(self.program, args)
    }
}

/// Per-language strategy: fixed source filename, optional compile step, run candidates
#[derive(Debug, Clone)]
pub struct LanguageStrategy {
    source_file: &'static str,
    compile: Option<Vec<CommandTemplate>>,
    run: Vec<CommandTemplate>,
}

impl LanguageStrategy {
    /// Fixed filename the source is written to; never derived from user input
    pub fn source_file(&self) -> &'static str {
        self.source_file
    }

    pub fn requires_compilation(&self) -> bool {
        self.compile.is_some()
    }

    /// Compile candidates for a workspace, if the language has a compile step
    pub fn compile_candidates(&self, workspace: &Path) -> Option<Vec<CommandCandidate>> {
        let source = workspace.join(self.source_file);
        self.compile.as_ref().map(|templates| {
            templates
                .iter()
                .map(|t| t.resolve(workspace, &source))
                .collect()
        })
    }

    /// Run candidates for a workspace, in fallback order
    pub fn run_candidates(&self, workspace: &Path) -> Vec<CommandCandidate> {
        let source = workspace.join(self.source_file);
        self.run
            .iter()
            .map(|t| t.resolve(workspace, &source))
            .collect()
    }
}

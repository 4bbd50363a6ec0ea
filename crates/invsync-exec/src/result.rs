//! Command description and result types

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Result of a command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// Exit status code (0 for success, -1 when killed by a signal)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Combine stdout and stderr
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// A program invocation: path, arguments and the exact environment it sees.
///
/// The environment is never inherited implicitly; callers pass whatever they
/// want the child to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to launch
    pub program: PathBuf,
    /// Arguments
    pub args: Vec<String>,
    /// Complete environment of the child process
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a spec with no arguments and an empty environment
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace the environment
    #[must_use]
    pub fn env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output() {
        let result = CommandResult {
            status: 1,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
            duration: Duration::from_millis(1),
        };
        assert!(!result.success());
        assert_eq!(result.combined_output(), "out\nerr");
    }

    #[test]
    fn test_spec_builder() {
        let spec = CommandSpec::new("/bin/echo")
            .arg("hi")
            .env(vec![("A".to_string(), "1".to_string())]);
        assert_eq!(spec.program, PathBuf::from("/bin/echo"));
        assert_eq!(spec.args, vec!["hi"]);
        assert_eq!(spec.env.len(), 1);
    }
}

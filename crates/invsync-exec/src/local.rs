//! Local command execution using `tokio::process`

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument};

use crate::error::ExecError;
use crate::result::{CommandResult, CommandSpec};
use crate::traits::CommandExecutor;

/// Local command executor
///
/// Launches the program directly (no shell) with exactly the environment
/// given in the [`CommandSpec`].
#[derive(Debug, Clone)]
pub struct LocalExecutor;

impl LocalExecutor {
    /// Create a new local executor
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, spec), fields(program = %spec.program.display()), level = "debug")]
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        debug!(args = ?spec.args, "executing local command");

        let child = Command::new(&spec.program)
            .args(&spec.args)
            .env_clear()
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::SpawnError(e.to_string()))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let duration = start.elapsed();

        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(status = status, duration = ?duration, "command completed");

        if !output.status.success() {
            error!(status = status, stderr = %stderr, "command failed");
        }

        Ok(CommandResult {
            status,
            stdout,
            stderr,
            duration,
        })
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for LocalExecutor {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, ExecError> {
        self.execute(spec).await
    }

    async fn run_with_timeout(
        &self,
        spec: &CommandSpec,
        timeout_duration: Duration,
    ) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        match timeout(timeout_duration, self.execute(spec)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    program = %spec.program.display(),
                    timeout = ?timeout_duration,
                    elapsed = ?start.elapsed(),
                    "command timed out"
                );
                Err(ExecError::Timeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    fn executor_type(&self) -> &'static str {
        "local"
    }
}

/// Check that `path` is a regular file its owner may execute.
///
/// # Errors
/// Returns `NotFound` if the file is missing and `NotExecutable` if the owner
/// execute bit is clear.
pub fn ensure_executable(path: &Path) -> Result<(), ExecError> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExecError::NotFound(path.to_path_buf()),
        _ => ExecError::IoError(e.to_string()),
    })?;

    if !metadata.is_file() {
        return Err(ExecError::NotExecutable(path.to_path_buf()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if metadata.permissions().mode() & 0o100 == 0 {
            return Err(ExecError::NotExecutable(path.to_path_buf()));
        }
    }

    Ok(())
}

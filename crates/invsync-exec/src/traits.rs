//! Command executor trait

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::{CommandResult, CommandSpec};

/// Something that can run a program and capture its output.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the command to completion.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, ExecError>;

    /// Run the command, giving up after `timeout`.
    async fn run_with_timeout(
        &self,
        spec: &CommandSpec,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;

    /// Short name of the executor, for logs.
    fn executor_type(&self) -> &'static str;
}

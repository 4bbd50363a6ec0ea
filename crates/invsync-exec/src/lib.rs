//! invsync-exec: local process execution
//!
//! Provides the executor trait used to launch scan scripts, and a
//! `tokio::process` implementation of it.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::{CommandResult, CommandSpec};
pub use traits::CommandExecutor;

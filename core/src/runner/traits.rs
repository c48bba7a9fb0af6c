use std::path::Path;

use async_trait::async_trait;

use super::types::ShellOutcome;

/// Spawns a command that has already been approved by the policy engine.
///
/// Implementations pin the working directory to `cwd`, enforce their own
/// wall-clock and output limits, and report every failure through
/// [`ShellOutcome::failure`] instead of returning an error.
#[async_trait]
pub trait ShellRunner: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, command: &str, cwd: &Path) -> ShellOutcome;
}

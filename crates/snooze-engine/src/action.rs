//! The quiesce action — the power-management side effect.

use std::future::Future;
use std::path::PathBuf;

use tracing::info;

/// Contract for the side effect fired after sustained quiescence.
///
/// Injectable so tests substitute a recording stub. A failure is
/// logged by the engine, never retried, and never crashes the process.
pub trait ActionTrigger: Send + Sync {
    fn execute(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Suspends the host by writing `mem` to the kernel power-state file.
pub struct SuspendAction {
    state_path: PathBuf,
}

impl SuspendAction {
    pub fn new() -> Self {
        Self {
            state_path: PathBuf::from("/sys/power/state"),
        }
    }

    /// Override the power-state path (dry runs and tests).
    pub fn with_state_path(path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: path.into(),
        }
    }
}

impl Default for SuspendAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionTrigger for SuspendAction {
    async fn execute(&self) -> anyhow::Result<()> {
        info!(path = ?self.state_path, "suspending host");
        tokio::fs::write(&self.state_path, b"mem").await?;
        Ok(())
    }
}

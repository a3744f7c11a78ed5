//! Optional downstream notification hook.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

const HOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Best-effort external command fired after each successful emission.
///
/// The emitted file path is appended to the configured argv. Non-zero
/// exits, spawn failures and timeouts are logged and never affect the
/// run loop.
#[derive(Debug, Clone)]
pub struct NotifyHook {
    argv: Vec<String>,
}

impl NotifyHook {
    /// Build a hook from a configured argv; `None` when empty.
    pub fn new(argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            None
        } else {
            Some(Self { argv })
        }
    }

    pub async fn fire(&self, emitted_path: &Path) {
        let mut command = Command::new(&self.argv[0]);
        command
            .args(&self.argv[1..])
            .arg(emitted_path)
            .kill_on_drop(true);

        let run = async {
            match command.status().await {
                Ok(status) if status.success() => {
                    tracing::debug!("Notify command succeeded for {}", emitted_path.display());
                }
                Ok(status) => {
                    tracing::warn!("Notify command exited with {}", status);
                }
                Err(e) => {
                    tracing::warn!("Notify command failed to run: {}", e);
                }
            }
        };

        if tokio::time::timeout(HOOK_TIMEOUT, run).await.is_err() {
            tracing::warn!("Notify command timed out after {:?}", HOOK_TIMEOUT);
        }
    }
}

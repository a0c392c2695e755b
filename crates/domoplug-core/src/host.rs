// ── Host collaborator traits ──
//
// The embedding host injects these capabilities into the dispatcher.
// Local command execution in particular is never an ambient OS call: it
// only happens through an explicitly provided CommandRunner, behind the
// same authorization gate as network control.

use async_trait::async_trait;
use tracing::debug;

use crate::error::CoreError;

/// The host's printer connection, as seen by the dispatcher.
#[async_trait]
pub trait PrinterHost: Send + Sync {
    /// `true` if the printer is currently disconnected or in an error
    /// state (candidate for auto-reconnect after power-on).
    fn is_disconnected_or_errored(&self) -> bool;

    /// `true` while a print job is running.
    fn is_print_active(&self) -> bool;

    async fn connect(&self);

    async fn disconnect(&self);
}

/// Printer stub for consumers without a printer (e.g. the CLI).
/// Never printing, never in need of a reconnect.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPrinter;

#[async_trait]
impl PrinterHost for NoopPrinter {
    fn is_disconnected_or_errored(&self) -> bool {
        false
    }

    fn is_print_active(&self) -> bool {
        false
    }

    async fn connect(&self) {}

    async fn disconnect(&self) {}
}

/// Capability to run operator-configured local commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> Result<(), CoreError>;
}

/// Runs commands through `sh -c`, capturing the exit status.
/// Spawn failures and non-zero exits are reported as errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellCommandRunner;

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command: &str) -> Result<(), CoreError> {
        debug!(command, "running local command");

        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .await
            .map_err(|e| CoreError::Command {
                message: format!("failed to spawn `{command}`: {e}"),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CoreError::Command {
                message: format!("`{command}` exited with {status}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shell_runner_reports_nonzero_exit() {
        let result = ShellCommandRunner.run("exit 3").await;
        assert!(matches!(result, Err(CoreError::Command { .. })));
    }

    #[tokio::test]
    async fn shell_runner_ok_on_success() {
        ShellCommandRunner.run("true").await.unwrap();
    }
}

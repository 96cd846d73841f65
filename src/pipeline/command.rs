//! External process execution with an enforced timeout.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Captured stdout/stderr of an external command.
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Both channels concatenated for diagnostics. Interleaving is not
    /// preserved.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(&self.stderr);
        }
        combined
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture output of `{tool}`")]
    Capture { tool: String },

    #[error("failed to wait for `{tool}`: {source}")]
    Wait {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool}` did not finish within {timeout:?} and was killed")]
    TimedOut {
        tool: String,
        timeout: Duration,
        output: CommandOutput,
    },

    #[error("`{tool}` exited with {status}")]
    Failed {
        tool: String,
        status: ExitStatus,
        output: CommandOutput,
    },
}

impl CommandError {
    /// Whatever the process wrote before it ended, when it got far enough
    /// to write anything.
    pub fn output(&self) -> String {
        match self {
            CommandError::TimedOut { output, .. } | CommandError::Failed { output, .. } => {
                output.combined()
            }
            _ => String::new(),
        }
    }
}

/// Run `cmd` to completion, killing it if it exceeds `timeout`.
///
/// The child is always reaped before this returns: it either exited on its
/// own or was killed and waited on. stdout and stderr are captured in full;
/// stdin is closed. A non-zero exit is an error carrying the captured
/// output.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    let tool = tool_name(&cmd);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // Reaped by the runtime even if the request future is dropped
        // mid-wait.
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
        tool: tool.clone(),
        source,
    })?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| CommandError::Capture { tool: tool.clone() })?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| CommandError::Capture { tool: tool.clone() })?;

    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();

    let waited = tokio::time::timeout(timeout, async {
        let _ = tokio::join!(
            stdout.read_to_end(&mut stdout_buf),
            stderr.read_to_end(&mut stderr_buf),
        );
        child.wait().await
    })
    .await;

    match waited {
        Ok(Ok(status)) => {
            let output = capture(stdout_buf, stderr_buf);
            if status.success() {
                Ok(output)
            } else {
                Err(CommandError::Failed {
                    tool,
                    status,
                    output,
                })
            }
        }
        Ok(Err(source)) => Err(CommandError::Wait { tool, source }),
        Err(_elapsed) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            Err(CommandError::TimedOut {
                tool,
                timeout,
                output: capture(stdout_buf, stderr_buf),
            })
        }
    }
}

fn tool_name(cmd: &Command) -> String {
    cmd.as_std().get_program().to_string_lossy().into_owned()
}

fn capture(stdout: Vec<u8>, stderr: Vec<u8>) -> CommandOutput {
    CommandOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[tokio::test]
    async fn captures_both_channels_on_success() {
        let output = run_with_timeout(sh("echo out; echo err >&2"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(output.combined().contains("out"));
        assert!(output.combined().contains("err"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_an_error_with_output() {
        let error = run_with_timeout(sh("echo boom >&2; exit 3"), Duration::from_secs(5))
            .await
            .unwrap_err();

        match &error {
            CommandError::Failed { status, .. } => assert_eq!(status.code(), Some(3)),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(error.output().contains("boom"));
    }

    #[tokio::test]
    async fn runaway_process_is_killed_promptly() {
        let start = Instant::now();
        let error = run_with_timeout(sh("sleep 30"), Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(error, CommandError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_tool_fails_to_spawn() {
        let cmd = Command::new("definitely-not-a-real-tool");
        let error = run_with_timeout(cmd, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(error, CommandError::Spawn { .. }));
        assert!(error.output().is_empty());
    }
}

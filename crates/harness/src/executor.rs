//! Runner execution - spawning the parser against one test case

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::EnvOverride;
use crate::discovery::TestCase;
use crate::error::{HarnessError, HarnessResult};

/// How the runner process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum ExitOutcome {
    /// Process exited with this status code
    Exited(i32),
    /// Process was terminated by a signal
    Signaled,
    /// Deadline passed before the process and its output were done
    TimedOut,
    /// Waiting on the process failed; its status is unknown
    WaitFailed,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }
}

/// Captured result of one runner invocation
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Combined stdout and stderr in arrival order
    pub output: String,
    pub outcome: ExitOutcome,
    pub elapsed: Duration,
}

/// Parameters shared by every invocation in a run
#[derive(Debug, Clone)]
pub struct Executor {
    runner: String,
    env: EnvOverride,
    timeout: Duration,
}

enum Waited {
    Exited(std::process::ExitStatus),
    Lost,
    TimedOut,
}

impl Executor {
    pub fn new(runner: impl AsRef<Path>, env: EnvOverride, timeout: Duration) -> Self {
        Self {
            runner: runner.as_ref().to_string_lossy().into_owned(),
            env,
            timeout,
        }
    }

    /// Run `<runner> <test>/project.xml` and capture its output.
    ///
    /// Only a spawn failure is returned as an error; timeouts and non-zero
    /// exits are part of the returned `ExecutionResult`.
    pub async fn execute(&self, test: &TestCase) -> HarnessResult<ExecutionResult> {
        let start = Instant::now();
        let descriptor = test.descriptor();

        debug!("Running {} {}", self.runner, descriptor.display());

        let mut cmd = Command::new(&self.runner);
        cmd.arg(&descriptor)
            .env(&self.env.key, &self.env.value)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| HarnessError::Spawn {
            runner: self.runner.clone(),
            source,
        })?;

        // Both pipes feed one channel so the output keeps arrival order
        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward(stderr, tx.clone()));
        }
        drop(tx);

        let deadline = tokio::time::Instant::now() + self.timeout;
        let mut output = Vec::new();
        let mut streams_open = true;

        let waited = loop {
            tokio::select! {
                chunk = rx.recv(), if streams_open => match chunk {
                    Some(chunk) => output.extend_from_slice(&chunk),
                    None => streams_open = false,
                },
                status = child.wait() => match status {
                    Ok(status) => break Waited::Exited(status),
                    Err(e) => {
                        warn!("Failed waiting for runner on {}: {}", test, e);
                        break Waited::Lost;
                    }
                },
                _ = tokio::time::sleep_until(deadline) => break Waited::TimedOut,
            }
        };

        let outcome = match waited {
            Waited::Exited(status) => {
                // Drain whatever is still buffered in the pipes, bounded by the deadline
                let drain = async {
                    while let Some(chunk) = rx.recv().await {
                        output.extend_from_slice(&chunk);
                    }
                };
                if tokio::time::timeout_at(deadline, drain).await.is_err() {
                    // A leftover child of the runner still holds the pipes
                    warn!("Output of {} still open at the deadline after runner exit", test);
                    ExitOutcome::TimedOut
                } else {
                    match status.code() {
                        Some(code) => ExitOutcome::Exited(code),
                        None => ExitOutcome::Signaled,
                    }
                }
            }
            Waited::Lost => {
                if let Err(e) = child.start_kill() {
                    debug!("Kill after failed wait failed for {}: {}", test, e);
                }
                ExitOutcome::WaitFailed
            }
            Waited::TimedOut => {
                if let Err(e) = child.start_kill() {
                    debug!("Kill after timeout failed for {}: {}", test, e);
                }
                while let Ok(chunk) = rx.try_recv() {
                    output.extend_from_slice(&chunk);
                }
                warn!("Runner timed out after {:?} on {}", self.timeout, test);
                ExitOutcome::TimedOut
            }
        };

        Ok(ExecutionResult {
            output: String::from_utf8_lossy(&output).into_owned(),
            outcome,
            elapsed: start.elapsed(),
        })
    }
}

/// Copy a pipe into the shared channel until EOF
async fn forward<R>(mut reader: R, tx: mpsc::UnboundedSender<Vec<u8>>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Pipe read error: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_outcome_success() {
        assert!(ExitOutcome::Exited(0).success());
        assert!(!ExitOutcome::Exited(1).success());
        assert!(!ExitOutcome::Signaled.success());
        assert!(!ExitOutcome::TimedOut.success());
        assert!(!ExitOutcome::WaitFailed.success());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let executor = Executor::new(
            "/nonexistent/svparse-runner",
            EnvOverride::default(),
            Duration::from_secs(5),
        );
        let err = executor.execute(&TestCase::new("missing")).await.unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }
}

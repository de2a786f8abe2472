//! Running external programs with a deadline.
//!
//! A hung binary must not stall resolution, so every run is bounded by a
//! timeout and the child is killed when the deadline passes.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

/// Captured result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("{program} exited with {}: {stderr}", describe_exit(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    }
}

/// Process-execution seam. Production code uses [`SystemRunner`]; tests can
/// substitute canned output.
pub trait ProcessRunner {
    fn run(
        &self,
        program: &Path,
        args: &[&str],
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn run(
        &self,
        program: &Path,
        args: &[&str],
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send {
        (**self).run(program, args)
    }
}

/// Runs real processes via `tokio::process`.
#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        program: &Path,
        args: &[&str],
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send {
        let name = program.display().to_string();
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        configure_no_window(&mut cmd);
        let timeout = self.timeout;

        async move {
            tracing::debug!("running {} {:?}", name, cmd.as_std().get_args().collect::<Vec<_>>());
            let output = match tokio::time::timeout(timeout, cmd.output()).await {
                Err(_) => return Err(ProcessError::Timeout { program: name, timeout }),
                Ok(Err(source)) => return Err(ProcessError::Spawn { program: name, source }),
                Ok(Ok(output)) => output,
            };
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if !output.status.success() {
                return Err(ProcessError::NonZeroExit {
                    program: name,
                    code: output.status.code(),
                    stderr,
                });
            }
            Ok(ProcessOutput { stdout, stderr })
        }
    }
}

/// Keeps a console window from flashing up on Windows.
fn configure_no_window(cmd: &mut tokio::process::Command) {
    #[cfg(target_os = "windows")]
    {
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

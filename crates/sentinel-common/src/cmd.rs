//! External collector process execution for sentinel probes.
//!
//! Probes gather most of their raw data by running userspace collector
//! utilities (`ausearch` over the auditd log) and parsing their output.
//! Commands are spawned directly with an argv vector, never through a
//! shell, and standard error is discarded: collector diagnostics are not
//! part of the record stream.
//!
//! # Example
//!
//! ```ignore
//! use sentinel_common::cmd::{self, AUSEARCH_CMD};
//!
//! let result = cmd::run_capture(AUSEARCH_CMD, &["-m", "USER_AUTH", "-ts", "today"]).await?;
//! for line in result.stdout_lines() {
//!     // parse one audit record line
//! }
//! ```

use std::process::Stdio;
use tokio::process::Command;

use crate::error::{SentinelError, SentinelResult};

/// Name of the auditd search utility, resolved via `$PATH`.
pub const AUSEARCH_CMD: &str = "ausearch";

/// Result of a collector command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The captured stdout output.
    pub stdout: String,
}

impl ExecResult {
    /// Returns true if the command exited with code 0.
    ///
    /// Note that `ausearch` exits non-zero when no records match, so
    /// collector callers usually consume [`stdout_lines`](Self::stdout_lines)
    /// regardless of the exit code.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the captured output as owned lines, dropping empty ones.
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect()
    }
}

/// Runs a collector command and captures its stdout.
///
/// Standard error is discarded. The exit code is reported but not treated
/// as an error; only a spawn failure (binary missing, fork failure)
/// produces `Err`.
pub async fn run_capture(program: &str, args: &[&str]) -> SentinelResult<ExecResult> {
    tracing::debug!(command = %program, ?args, "Running collector command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| SentinelError::CommandSpawn {
            command: program.to_string(),
            source: e,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

    if exit_code != 0 {
        tracing::trace!(
            command = %program,
            exit_code = exit_code,
            "Collector exited non-zero (usually: no matching records)"
        );
    }

    Ok(ExecResult { exit_code, stdout })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_result_success() {
        let result = ExecResult {
            exit_code: 0,
            stdout: "output".to_string(),
        };
        assert!(result.success());
    }

    #[test]
    fn test_stdout_lines_drops_blank() {
        let result = ExecResult {
            exit_code: 0,
            stdout: "one\n\n  \ntwo\n".to_string(),
        };
        assert_eq!(result.stdout_lines(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_run_capture_echo() {
        let result = run_capture("echo", &["hello"]).await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout_lines(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_run_capture_nonzero_exit() {
        let result = run_capture("false", &[]).await.unwrap();
        assert!(!result.success());
        assert!(result.stdout_lines().is_empty());
    }

    #[tokio::test]
    async fn test_run_capture_missing_binary() {
        let result = run_capture("sentinel-no-such-binary", &[]).await;
        match result {
            Err(SentinelError::CommandSpawn { command, .. }) => {
                assert_eq!(command, "sentinel-no-such-binary");
            }
            other => panic!("Expected CommandSpawn error, got {:?}", other.map(|r| r.exit_code)),
        }
    }
}

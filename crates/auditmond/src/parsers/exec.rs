//! Execution-location monitoring.
//!
//! Payloads staged by an intruder usually run from world-writable volatile
//! filesystems. Anything executed out of `/tmp` or `/dev/shm` is counted,
//! as is every shell spawn in the window.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::source::{AuditQuery, RecordFilter, RecordSource};
use crate::types::AuditSummary;

static SHELL_EXEC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"name=.*/bin/(ba)?sh").expect("invalid shell pattern"));

/// Counts executions from volatile filesystems and shell spawns.
pub async fn parse_exec_events(source: &dyn RecordSource, summary: &mut AuditSummary) {
    let query = AuditQuery::interpreted(RecordFilter::Syscall("execve"));

    for line in source.fetch(&query).await {
        if line.contains("/tmp/") {
            summary.tmp_executions += 1;
        }
        if line.contains("/dev/shm/") {
            summary.devshm_executions += 1;
        }
    }

    let lines = source.fetch(&query).await;
    summary.shell_spawns = lines.iter().filter(|l| SHELL_EXEC_RE.is_match(l)).count() as u32;

    if summary.tmp_executions > 0 || summary.devshm_executions > 0 {
        tracing::warn!(
            tmp = summary.tmp_executions,
            devshm = summary.devshm_executions,
            "Executions from volatile filesystems"
        );
    }
}

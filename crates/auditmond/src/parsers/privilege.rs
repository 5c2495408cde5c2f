//! Privilege escalation counting.

use crate::source::{AuditQuery, RecordFilter, RecordSource};
use crate::types::AuditSummary;

const SUDO_EXE: &str = r#"exe="/usr/bin/sudo""#;
const SU_EXE: &str = r#"exe="/usr/bin/su""#;

/// Counts sudo and su command records in the window.
pub async fn parse_priv_events(source: &dyn RecordSource, summary: &mut AuditSummary) {
    let query = AuditQuery::raw(RecordFilter::MessageType("USER_CMD"));

    let lines = source.fetch(&query).await;
    summary.sudo_count = lines.iter().filter(|l| l.contains(SUDO_EXE)).count() as u32;

    let lines = source.fetch(&query).await;
    summary.su_count = lines.iter().filter(|l| l.contains(SU_EXE)).count() as u32;
}

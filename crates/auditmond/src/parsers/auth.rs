//! Authentication event aggregation.

use crate::hash;
use crate::record;
use crate::source::{AuditQuery, RecordFilter, RecordSource};
use crate::types::{AuditSummary, HashedUser, BRUTE_FORCE_THRESHOLD, MAX_AUDIT_USERS};

/// Most recent result lines considered per window.
const AUTH_TAIL_LINES: usize = 100;

fn note_failure_user(summary: &mut AuditSummary, username: &str) {
    let tag = hash::hash_username(username);
    if let Some(user) = summary.failure_users.iter_mut().find(|u| u.hash == tag) {
        user.count += 1;
        return;
    }
    if summary.failure_users.len() < MAX_AUDIT_USERS {
        summary.failure_users.push(HashedUser { hash: tag, count: 1 });
    }
    // At capacity the aggregate failure count still carries the event
}

/// Aggregates `USER_AUTH` results: failure and success counts, per-user
/// failure tags, and the brute-force heuristic.
pub async fn parse_auth_events(source: &dyn RecordSource, summary: &mut AuditSummary) {
    let query = AuditQuery::raw(RecordFilter::MessageType("USER_AUTH"));
    let lines = source.fetch(&query).await;

    let results: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|l| l.contains("res=success") || l.contains("res=failed"))
        .collect();
    let tail_start = results.len().saturating_sub(AUTH_TAIL_LINES);

    for &line in &results[tail_start..] {
        if line.contains("res=failed") {
            summary.auth_failures += 1;
            if let Some(acct) = record::quoted_field(line, "acct") {
                if !acct.is_empty() {
                    note_failure_user(summary, acct);
                }
            }
        } else if line.contains("res=success") {
            summary.auth_successes += 1;
        }
    }

    summary.brute_force_detected = summary.auth_failures > BRUTE_FORCE_THRESHOLD;
    if summary.brute_force_detected {
        tracing::warn!(
            failures = summary.auth_failures,
            users = summary.failure_users.len(),
            "Auth failures above brute-force threshold"
        );
    }
}

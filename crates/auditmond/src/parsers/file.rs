//! Sensitive-file access correlation.
//!
//! Watch rules on identity files emit `PATH` records; the process that
//! touched the file lives in the sibling `SYSCALL` record. This parser
//! joins the two through the event-context cache and attaches process
//! ancestry to every new path.

use crate::context::EventContextCache;
use crate::process::{self, ProcessChain};
use crate::record;
use crate::source::{AuditQuery, RecordFilter, RecordSource};
use crate::types::{AuditSummary, FileAccess, MAX_AUDIT_FILES};

/// Aggregates watched-file hits, correlated with process identity.
pub async fn parse_file_events(
    source: &dyn RecordSource,
    cache: &EventContextCache,
    summary: &mut AuditSummary,
) {
    let query = AuditQuery::raw(RecordFilter::Key("identity"));

    for line in source.fetch(&query).await {
        // Only the actual file object; parent-directory PATH records carry
        // nametype=PARENT
        if !line.contains("type=PATH") || !line.contains("nametype=NORMAL") {
            continue;
        }

        let ctx = record::event_serial(&line).and_then(|serial| cache.lookup(serial));

        let Some(path) = record::quoted_field(&line, "name") else {
            continue;
        };
        if path.len() <= 5 || path.ends_with('/') {
            continue;
        }

        if let Some(existing) = summary.sensitive_files.iter_mut().find(|f| f.path == path) {
            existing.count += 1;
            continue;
        }
        if summary.sensitive_files.len() >= MAX_AUDIT_FILES {
            continue;
        }

        let mut access = FileAccess::new(path);

        if let Some(ctx) = ctx {
            if !ctx.comm.is_empty() {
                access.process = ctx.comm.clone();

                // First hop comes from the audit record itself: the audited
                // process may already be gone. The live walk starts at its
                // parent.
                access.chain = ProcessChain::seed(&ctx.comm);
                if ctx.ppid > 1 {
                    process::build_process_chain(ctx.ppid, &mut access.chain);
                }

                if let Some(reason) = process::is_suspicious_chain(&access.chain) {
                    tracing::warn!(
                        path = %access.path,
                        process = %access.process,
                        reason,
                        "Suspicious process chain on watched file"
                    );
                    access.suspicious = true;
                    summary.suspicious_exec_count += 1;
                }
            }
        }

        // Shadow and sudoers access is flagged regardless of provenance
        if access.path.contains("shadow") || access.path.contains("sudoers") {
            access.suspicious = true;
        }

        summary.sensitive_files.push(access);
    }
}

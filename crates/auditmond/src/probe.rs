//! Probe orchestration.
//!
//! One probe is one synchronous pass over the window: prime the
//! correlation cache from SYSCALL records, run the domain parsers in
//! order, compare against the persisted baseline, and score the result.
//! The summary is returned owned; the caller decides what to report and
//! whether to fold the sample into the baseline.

use chrono::Utc;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::anomaly;
use crate::baseline::BaselineStore;
use crate::context::{self, EventContextCache};
use crate::parsers;
use crate::risk;
use crate::source::RecordSource;
use crate::types::AuditSummary;

/// Path probed to decide whether auditd data is available at all.
pub const AUDIT_LOG_PATH: &str = "/var/log/audit/audit.log";

/// One-shot audit probe over a record source.
///
/// Owns the event-context cache (cleared at both ends of every probe) and
/// the baseline store. Not meant to be shared: concurrent probes need
/// independent instances.
pub struct AuditProbe<S: RecordSource> {
    source: S,
    cache: EventContextCache,
    store: BaselineStore,
    audit_log: PathBuf,
}

impl<S: RecordSource> AuditProbe<S> {
    /// Probe over the standard audit log and baseline locations.
    pub fn new(source: S) -> Self {
        Self::with_store(source, BaselineStore::default_paths())
    }

    /// Probe with an explicit baseline store.
    pub fn with_store(source: S, store: BaselineStore) -> Self {
        Self {
            source,
            cache: EventContextCache::new(),
            store,
            audit_log: PathBuf::from(AUDIT_LOG_PATH),
        }
    }

    /// Overrides the audit log availability probe, for replay analysis of
    /// captured logs.
    pub fn with_audit_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_log = path.into();
        self
    }

    /// Runs one complete probe over the current window.
    pub async fn probe(&mut self, window_seconds: i64) -> AuditSummary {
        let mut summary = AuditSummary::new(window_seconds, Utc::now().timestamp());

        if !readable(&self.audit_log) {
            tracing::info!(path = %self.audit_log.display(), "Audit log not readable, probe disabled");
            summary.enabled = false;
            return summary;
        }

        // SYSCALL context first: the file parser joins against it
        self.cache.clear();
        context::parse_syscall_context(&self.source, &mut self.cache).await;

        parsers::parse_auth_events(&self.source, &mut summary).await;
        parsers::parse_priv_events(&self.source, &mut summary).await;
        parsers::parse_file_events(&self.source, &self.cache, &mut summary).await;
        parsers::parse_exec_events(&self.source, &mut summary).await;
        parsers::check_security_framework(&self.source, &mut summary).await;

        self.cache.clear();

        if let Some(baseline) = self.store.load() {
            anomaly::detect_anomalies(&mut summary, &baseline);
        }

        risk::calculate_risk_score(&mut summary);

        tracing::debug!(
            auth_failures = summary.auth_failures,
            sudo = summary.sudo_count,
            files = summary.sensitive_files.len(),
            anomalies = summary.anomalies.len(),
            score = summary.risk_score,
            level = %summary.risk_level,
            "Probe complete"
        );

        summary
    }

    /// The baseline store this probe compares against.
    pub fn store(&self) -> &BaselineStore {
        &self.store
    }
}

fn readable(path: &Path) -> bool {
    File::open(path).is_ok()
}

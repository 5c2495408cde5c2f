//! auditmond - audit-trail analysis for Sentinel host security monitoring.
//!
//! Correlates the day's auditd records into a structured activity summary,
//! compares it against a persisted behavioral baseline, and produces a
//! deterministic risk score and classification.
//!
//! The pipeline for one probe:
//!
//! 1. [`source`] runs `ausearch` queries and yields raw record lines
//! 2. [`context`] joins SYSCALL records into a serial-keyed identity cache
//! 3. [`parsers`] aggregate auth, privilege, file, exec, and security
//!    framework activity into an [`AuditSummary`]
//! 4. [`baseline`] + [`anomaly`] compare counters against the host's
//!    exponential moving averages
//! 5. [`risk`] folds everything into a score and level

pub mod anomaly;
pub mod baseline;
pub mod context;
pub mod hash;
pub mod parsers;
pub mod probe;
pub mod process;
pub mod record;
pub mod risk;
pub mod source;
pub mod types;

pub use baseline::{AuditBaseline, BaselineStore};
pub use probe::AuditProbe;
pub use process::ProcessChain;
pub use source::{AuditQuery, Ausearch, RecordFilter, RecordSource, ReplaySource};
pub use types::{AuditSummary, Anomaly, FileAccess, HashedUser, RiskLevel, Severity};

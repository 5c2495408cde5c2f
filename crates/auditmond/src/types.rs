//! Type definitions for audit probe summaries.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::process::ProcessChain;

/// Per-user failure tags retained per window.
pub const MAX_AUDIT_USERS: usize = 10;

/// Distinct watched files retained per window.
pub const MAX_AUDIT_FILES: usize = 20;

/// Findings retained per window.
pub const MAX_AUDIT_ANOMALIES: usize = 10;

/// Brute-force heuristic: more than this many auth failures in one window.
pub const BRUTE_FORCE_THRESHOLD: u32 = 5;

/// A pseudonymized account that failed authentication.
///
/// Two users with the same tag are identical for all purposes; the mapping
/// back to the plaintext account name requires the hashing salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedUser {
    /// Stable tag of the form `user_XXXX`.
    pub hash: String,
    /// Failures attributed to this tag in the window.
    pub count: u32,
}

/// One watched file observed in the window, with process provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAccess {
    /// Absolute path of the watched file.
    pub path: String,
    /// Access classification. Currently always `"write"`: the watch rules
    /// fire on modification and no read/write split is made yet.
    pub access_type: String,
    /// Times the path was hit in the window.
    pub count: u32,
    /// Set for hits with a suspicious process chain or a high-value target
    /// path (shadow, sudoers).
    pub suspicious: bool,
    /// `comm` of the audited process, when correlation succeeded.
    pub process: String,
    /// Ancestry of the audited process.
    pub chain: ProcessChain,
}

impl FileAccess {
    /// First observation of a path in the window.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            access_type: "write".to_string(),
            count: 1,
            suspicious: false,
            process: String::new(),
            chain: ProcessChain::new(),
        }
    }
}

/// Finding severity, ordered from routine to critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Normal,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Normal => write!(f, "NORMAL"),
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// One behavioral finding attached to a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// Short machine tag, e.g. `auth_failure_spike`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description.
    pub description: String,
    pub severity: Severity,
    pub current_value: f32,
    pub baseline_avg: f32,
    pub deviation_pct: f32,
    /// Unix seconds at detection time.
    pub timestamp: i64,
}

/// Overall risk classification, a total function of the risk score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Maps a risk score to its level.
    pub fn from_score(score: u32) -> Self {
        if score >= 31 {
            RiskLevel::Critical
        } else if score >= 16 {
            RiskLevel::High
        } else if score >= 6 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// The structured output of one audit probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    /// False when the audit log was not readable; all other fields are
    /// zero/empty in that case.
    pub enabled: bool,
    /// Window length the caller asked for.
    pub period_seconds: i64,
    /// Unix seconds at probe start.
    pub capture_time: i64,

    // Authentication
    pub auth_failures: u32,
    pub auth_successes: u32,
    pub failure_users: Vec<HashedUser>,
    pub brute_force_detected: bool,

    // Privilege escalation
    pub sudo_count: u32,
    pub su_count: u32,

    // File integrity
    pub sensitive_files: Vec<FileAccess>,
    /// Reserved: not populated by any parser yet, still weighed by the
    /// risk scorer.
    pub permission_changes: u32,
    /// Reserved, see `permission_changes`.
    pub ownership_changes: u32,

    // Process activity
    pub tmp_executions: u32,
    pub devshm_executions: u32,
    pub shell_spawns: u32,
    pub suspicious_exec_count: u32,

    // Security framework
    pub selinux_enforcing: bool,
    pub selinux_avc_denials: u32,
    pub apparmor_denials: u32,

    // Baseline comparison
    pub auth_baseline_avg: f32,
    pub auth_deviation_pct: f32,
    pub sudo_baseline_avg: f32,
    pub sudo_deviation_pct: f32,

    // Findings
    pub anomalies: Vec<Anomaly>,

    // Risk
    pub risk_score: u32,
    pub risk_level: RiskLevel,
}

impl AuditSummary {
    /// Zeroed summary for a live probe.
    pub fn new(period_seconds: i64, capture_time: i64) -> Self {
        Self {
            enabled: true,
            period_seconds,
            capture_time,
            ..Default::default()
        }
    }

    /// Distinct watched paths observed in the window.
    pub fn sensitive_file_count(&self) -> u32 {
        self.sensitive_files.len() as u32
    }
}

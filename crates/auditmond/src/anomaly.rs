//! Baseline deviation analysis.

use chrono::Utc;

use crate::baseline::{AuditBaseline, MIN_BASELINE_SAMPLES};
use crate::types::{Anomaly, AuditSummary, Severity, MAX_AUDIT_ANOMALIES};

/// Deviation of `current` from `baseline_avg`, in percent.
///
/// A near-zero baseline would divide away; instead any activity against it
/// reads as a flat 100% event, which makes "first ever occurrence"
/// significant without being off the scale.
pub fn deviation_pct(current: f32, baseline_avg: f32) -> f32 {
    if baseline_avg < 0.1 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - baseline_avg) / baseline_avg * 100.0
    }
}

/// Severity ladder for a deviation percentage.
pub fn deviation_significance(deviation_pct: f32) -> Severity {
    if deviation_pct > 500.0 {
        Severity::Critical
    } else if deviation_pct > 200.0 {
        Severity::High
    } else if deviation_pct > 100.0 {
        Severity::Medium
    } else if deviation_pct > 50.0 {
        Severity::Low
    } else {
        Severity::Normal
    }
}

fn push_anomaly(
    summary: &mut AuditSummary,
    kind: &str,
    description: String,
    severity: Severity,
    current: f32,
    baseline_avg: f32,
    deviation: f32,
) {
    if summary.anomalies.len() >= MAX_AUDIT_ANOMALIES {
        return;
    }
    if severity >= Severity::High {
        tracing::warn!(kind, %severity, description = %description, "Audit anomaly");
    }
    summary.anomalies.push(Anomaly {
        kind: kind.to_string(),
        description,
        severity,
        current_value: current,
        baseline_avg,
        deviation_pct: deviation,
        timestamp: Utc::now().timestamp(),
    });
}

/// Compares the summary's counters against the baseline and attaches
/// findings.
///
/// A baseline with fewer than [`MIN_BASELINE_SAMPLES`] folded probes is
/// still warming up: the deviation fields stay zero and nothing is
/// emitted.
pub fn detect_anomalies(summary: &mut AuditSummary, baseline: &AuditBaseline) {
    if baseline.sample_count < MIN_BASELINE_SAMPLES {
        tracing::debug!(
            samples = baseline.sample_count,
            "Baseline still warming up, skipping anomaly detection"
        );
        return;
    }

    let auth_failures = summary.auth_failures as f32;
    let auth_deviation = deviation_pct(auth_failures, baseline.avg_auth_failures);
    summary.auth_baseline_avg = baseline.avg_auth_failures;
    summary.auth_deviation_pct = auth_deviation;

    if auth_deviation > 100.0 {
        let description = format!(
            "{} auth failures ({auth_deviation:.0}% above baseline)",
            summary.auth_failures
        );
        push_anomaly(
            summary,
            "auth_failure_spike",
            description,
            deviation_significance(auth_deviation),
            auth_failures,
            baseline.avg_auth_failures,
            auth_deviation,
        );
    }

    let sudo_count = summary.sudo_count as f32;
    let sudo_deviation = deviation_pct(sudo_count, baseline.avg_sudo_count);
    summary.sudo_baseline_avg = baseline.avg_sudo_count;
    summary.sudo_deviation_pct = sudo_deviation;

    if sudo_deviation > 200.0 {
        let description = format!(
            "{} sudo commands ({sudo_deviation:.0}% above baseline)",
            summary.sudo_count
        );
        push_anomaly(
            summary,
            "sudo_spike",
            description,
            deviation_significance(sudo_deviation),
            sudo_count,
            baseline.avg_sudo_count,
            sudo_deviation,
        );
    }

    // Executions from volatile filesystems are findings at any rate
    let tmp_executions = summary.tmp_executions;
    if tmp_executions > 0 {
        let description = format!("{tmp_executions} executions from /tmp");
        push_anomaly(
            summary,
            "tmp_execution",
            description,
            Severity::High,
            tmp_executions as f32,
            0.0,
            100.0,
        );
    }

    let devshm_executions = summary.devshm_executions;
    if devshm_executions > 0 {
        let description = format!("{devshm_executions} executions from /dev/shm");
        push_anomaly(
            summary,
            "devshm_execution",
            description,
            Severity::Critical,
            devshm_executions as f32,
            0.0,
            100.0,
        );
    }
}

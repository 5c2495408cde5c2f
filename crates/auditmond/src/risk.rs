//! Weighted risk aggregation.

use crate::types::{AuditSummary, RiskLevel};

/// Computes the overall risk score and level for a completed summary.
///
/// The auth-deviation multiplier scales the accumulator as it stands after
/// the authentication terms, including the brute-force bonus. The ordering
/// is part of the model: moving the multiplier changes every downstream
/// score.
pub fn calculate_risk_score(summary: &mut AuditSummary) {
    let mut score: u32 = 0;

    // Authentication
    score += summary.auth_failures;
    if summary.brute_force_detected {
        score += 10;
    }

    score = if summary.auth_deviation_pct > 500.0 {
        score * 5
    } else if summary.auth_deviation_pct > 200.0 {
        score * 3
    } else if summary.auth_deviation_pct > 100.0 {
        score * 2
    } else {
        score
    };

    // Privilege escalation: sudo itself is routine, a large deviation is not
    if summary.sudo_deviation_pct > 200.0 {
        score += 5;
    }
    score += summary.su_count * 2;

    // File integrity
    score += (summary.permission_changes + summary.ownership_changes) * 3;
    for file in &summary.sensitive_files {
        score += 2;
        if file.suspicious {
            score += 5;
        }
    }

    // Process activity
    score += summary.tmp_executions * 4;
    score += summary.devshm_executions * 6;
    score += summary.suspicious_exec_count * 10;

    // Security framework
    score += summary.selinux_avc_denials + summary.apparmor_denials;

    summary.risk_score = score;
    summary.risk_level = RiskLevel::from_score(score);
}

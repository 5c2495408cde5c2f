//! Security framework posture: SELinux and AppArmor.

use std::fs;
use std::path::Path;

use crate::source::{AuditQuery, RecordFilter, RecordSource};
use crate::types::AuditSummary;

/// SELinux enforcement knob; absent on hosts without SELinux.
pub const SELINUX_ENFORCE_PATH: &str = "/sys/fs/selinux/enforce";

/// Reads SELinux/AppArmor posture and denial counts.
///
/// A host without the framework leaves the fields at zero/false.
pub async fn check_security_framework(source: &dyn RecordSource, summary: &mut AuditSummary) {
    check_with_enforce_path(source, summary, Path::new(SELINUX_ENFORCE_PATH)).await;
}

pub(crate) async fn check_with_enforce_path(
    source: &dyn RecordSource,
    summary: &mut AuditSummary,
    enforce_path: &Path,
) {
    if let Ok(content) = fs::read_to_string(enforce_path) {
        summary.selinux_enforcing = content.trim() == "1";

        let query = AuditQuery::plain(RecordFilter::MessageType("AVC"));
        summary.selinux_avc_denials = source
            .fetch(&query)
            .await
            .iter()
            .filter(|l| l.contains("denied"))
            .count() as u32;
    }

    let query = AuditQuery::plain(RecordFilter::MessageType("APPARMOR_DENIED"));
    summary.apparmor_denials = source.fetch(&query).await.len() as u32;
}

//! End-to-end probe scenarios over replayed audit records.
//!
//! Each scenario drives the full pipeline (correlation cache, domain
//! parsers, baseline comparison, risk scoring) through a `ReplaySource`,
//! with the audit log and baseline redirected into a temp directory.

use std::fs;
use tempfile::TempDir;

use sentinel_auditmond::baseline::BASELINE_MAGIC;
use sentinel_auditmond::hash::hash_username;
use sentinel_auditmond::types::Severity;
use sentinel_auditmond::{
    AuditBaseline, AuditProbe, BaselineStore, RecordFilter, ReplaySource, RiskLevel,
};

struct Harness {
    _dir: TempDir,
    store: BaselineStore,
    audit_log: std::path::PathBuf,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let audit_log = dir.path().join("audit.log");
        fs::write(&audit_log, "").unwrap();
        let store = BaselineStore::at(dir.path().join("audit_baseline.dat"), None);
        Self {
            _dir: dir,
            store,
            audit_log,
        }
    }

    fn probe(&self, source: ReplaySource) -> AuditProbe<ReplaySource> {
        AuditProbe::with_store(source, self.store.clone()).with_audit_log(&self.audit_log)
    }
}

fn auth_line(serial: u32, acct: &str, res: &str) -> String {
    format!(
        r#"type=USER_AUTH msg=audit(1767386347.120:{serial}): pid=812 uid=0 auid=1000 ses=3 msg='op=PAM:authentication grantors=pam_unix acct="{acct}" exe="/usr/sbin/sshd" hostname=10.0.0.5 addr=10.0.0.5 terminal=ssh res={res}'"#
    )
}

/// Warm baseline: enough samples for anomaly detection.
fn warm_baseline(avg_auth_failures: f32) -> AuditBaseline {
    AuditBaseline {
        version: 1,
        created: 1_767_000_000,
        updated: 1_767_300_000,
        sample_count: 10,
        avg_auth_failures,
        ..Default::default()
    }
}

// S1: repeated failures for one account trip the brute-force heuristic and
// aggregate under a single pseudonymized tag.
#[tokio::test]
async fn scenario_brute_force_detection() {
    let harness = Harness::new();

    let mut lines: Vec<String> = (0..7).map(|i| auth_line(100 + i, "alice", "failed")).collect();
    lines.push(auth_line(200, "alice", "success"));
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let source = ReplaySource::new().with_records(RecordFilter::MessageType("USER_AUTH"), &refs);

    let summary = harness.probe(source).probe(86_400).await;

    assert!(summary.enabled);
    assert_eq!(summary.auth_failures, 7);
    assert_eq!(summary.auth_successes, 1);
    assert!(summary.brute_force_detected);

    assert_eq!(summary.failure_users.len(), 1);
    let user = &summary.failure_users[0];
    assert_eq!(user.hash, hash_username("alice"));
    assert_eq!(user.hash.len(), 9);
    assert!(user.hash.starts_with("user_"));
    assert_eq!(user.count, 7);

    // 7 failures + brute-force bonus, no baseline so no multiplier
    assert_eq!(summary.risk_score, 17);
    assert_eq!(summary.risk_level, RiskLevel::High);
}

// S2: a 900% auth-failure deviation emits a critical spike finding and the
// multiplier scales the accumulator including the brute-force bonus.
#[tokio::test]
async fn scenario_deviation_multiplier() {
    let harness = Harness::new();
    assert!(harness.store.save(&warm_baseline(2.0)));

    let lines: Vec<String> = (0..20).map(|i| auth_line(i, "alice", "failed")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let source = ReplaySource::new().with_records(RecordFilter::MessageType("USER_AUTH"), &refs);

    let summary = harness.probe(source).probe(86_400).await;

    assert_eq!(summary.auth_failures, 20);
    assert_eq!(summary.auth_baseline_avg, 2.0);
    assert_eq!(summary.auth_deviation_pct, 900.0);

    let spike = summary
        .anomalies
        .iter()
        .find(|a| a.kind == "auth_failure_spike")
        .expect("auth spike finding");
    assert_eq!(spike.severity, Severity::Critical);
    assert_eq!(spike.current_value, 20.0);
    assert_eq!(spike.baseline_avg, 2.0);

    // (20 + 10) * 5
    assert_eq!(summary.risk_score, 150);
    assert_eq!(summary.risk_level, RiskLevel::Critical);
}

// S3: one execution from /dev/shm against a quiet warm baseline is a
// critical finding on its own.
#[tokio::test]
async fn scenario_devshm_execution() {
    let harness = Harness::new();
    assert!(harness.store.save(&warm_baseline(0.0)));

    let source = ReplaySource::new().with_records(
        RecordFilter::Syscall("execve"),
        &[r#"type=PATH msg=audit(01/02/2026 14:02:11.410:56) : item=0 name="/dev/shm/x" inode=43 nametype=NORMAL"#],
    );

    let summary = harness.probe(source).probe(86_400).await;

    assert_eq!(summary.devshm_executions, 1);
    assert_eq!(summary.tmp_executions, 0);

    assert_eq!(summary.anomalies.len(), 1);
    let finding = &summary.anomalies[0];
    assert_eq!(finding.kind, "devshm_execution");
    assert_eq!(finding.severity, Severity::Critical);
    assert_eq!(finding.deviation_pct, 100.0);

    assert_eq!(summary.risk_score, 6);
    assert_eq!(summary.risk_level, RiskLevel::Medium);
}

// S4: a PATH record joins its SYSCALL sibling through the event serial,
// picking up process identity and a seeded ancestry chain.
#[tokio::test]
async fn scenario_file_correlation() {
    let harness = Harness::new();

    let source = ReplaySource::new()
        .with_records(
            RecordFilter::MessageType("SYSCALL"),
            &[r#"type=SYSCALL msg=audit(1767386347.120:42): arch=c000003e syscall=257 success=yes exit=3 ppid=1000 pid=999 auid=1000 uid=0 comm="vim" exe="/usr/bin/vim" key="identity""#],
        )
        .with_records(
            RecordFilter::Key("identity"),
            &[r#"type=PATH msg=audit(1767386347.120:42): item=0 name="/etc/shadow" inode=131 dev=fd:00 mode=0100640 ouid=0 ogid=42 nametype=NORMAL"#],
        );

    let summary = harness.probe(source).probe(86_400).await;

    assert_eq!(summary.sensitive_files.len(), 1);
    let access = &summary.sensitive_files[0];
    assert_eq!(access.path, "/etc/shadow");
    assert_eq!(access.process, "vim");
    assert_eq!(access.chain.names[0], "vim");
    assert!(access.chain.depth() >= 1);
    assert!(access.suspicious);
    assert_eq!(access.count, 1);
}

// S5: the first folded sample seeds every average verbatim and the saved
// record leads with the magic.
#[tokio::test]
async fn scenario_first_sample_baseline_seeding() {
    let harness = Harness::new();

    let auth: Vec<String> = (0..3).map(|i| auth_line(i, "alice", "failed")).collect();
    let auth_refs: Vec<&str> = auth.iter().map(String::as_str).collect();
    let source = ReplaySource::new()
        .with_records(RecordFilter::MessageType("USER_AUTH"), &auth_refs)
        .with_records(
            RecordFilter::MessageType("USER_CMD"),
            &[r#"type=USER_CMD msg=audit(1.0:300): pid=900 msg='cwd="/root" cmd=6C73 exe="/usr/bin/sudo" terminal=pts/0 res=success'"#],
        );

    let summary = harness.probe(source).probe(86_400).await;
    assert_eq!(summary.auth_failures, 3);
    assert_eq!(summary.sudo_count, 1);

    let mut baseline = harness.store.load().unwrap_or_default();
    assert_eq!(baseline.sample_count, 0);
    baseline.update(&summary);

    assert_eq!(baseline.sample_count, 1);
    assert_eq!(baseline.version, 1);
    assert_eq!(baseline.avg_auth_failures, 3.0);
    assert_eq!(baseline.avg_sudo_count, 1.0);

    assert!(harness.store.save(&baseline));
    let bytes = fs::read(harness._dir.path().join("audit_baseline.dat")).unwrap();
    assert_eq!(&bytes[..8], BASELINE_MAGIC);
    assert_eq!(harness.store.load().unwrap(), baseline);
}

// S6: a file with the wrong magic loads as "no baseline" and the probe
// proceeds without findings.
#[tokio::test]
async fn scenario_load_rejects_garbage() {
    let harness = Harness::new();
    let path = harness._dir.path().join("audit_baseline.dat");

    let mut bytes = warm_baseline(2.0).encode();
    bytes[..8].copy_from_slice(b"GARBAGE!");
    fs::write(&path, &bytes).unwrap();

    assert!(harness.store.load().is_none());

    let lines: Vec<String> = (0..20).map(|i| auth_line(i, "alice", "failed")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let source = ReplaySource::new().with_records(RecordFilter::MessageType("USER_AUTH"), &refs);

    let summary = harness.probe(source).probe(86_400).await;

    // Counters are live, baseline comparison is not
    assert_eq!(summary.auth_failures, 20);
    assert!(summary.anomalies.is_empty());
    assert_eq!(summary.auth_deviation_pct, 0.0);
    assert_eq!(summary.auth_baseline_avg, 0.0);
}

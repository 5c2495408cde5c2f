//! Event-context correlation cache.
//!
//! A logical audit event is spread across several records sharing one
//! serial: the `SYSCALL` record carries process identity, the `PATH`
//! records carry the affected filenames. The cache maps serial to process
//! identity so the file parser can attach provenance to each path it sees.
//!
//! The cache is owned by the orchestrator, primed once per probe, and
//! cleared at both ends. It is capacity-bounded; lookups are linear scans,
//! which the bound keeps cheap.

use crate::record;
use crate::source::{AuditQuery, RecordFilter, RecordSource};

/// Correlation slots available per probe; events beyond this are dropped.
pub const MAX_EVENT_CONTEXTS: usize = 256;

const COMM_MAX: usize = 31;
const EXE_MAX: usize = 255;

/// Process identity extracted from one event's SYSCALL record.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    pub event_id: i64,
    pub pid: i32,
    /// Parent pid, the starting point for ancestry walks.
    pub ppid: i32,
    pub comm: String,
    pub exe: String,
}

/// Bounded serial-to-identity cache.
#[derive(Debug, Default)]
pub struct EventContextCache {
    entries: Vec<EventContext>,
}

impl EventContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Finds the slot for `event_id`.
    pub fn lookup(&self, event_id: i64) -> Option<&EventContext> {
        self.entries.iter().find(|e| e.event_id == event_id)
    }

    /// Finds or creates the slot for `event_id`. Returns `None` once the
    /// cache is full; later events are silently dropped.
    pub fn get_or_create(&mut self, event_id: i64) -> Option<&mut EventContext> {
        if let Some(idx) = self.entries.iter().position(|e| e.event_id == event_id) {
            return self.entries.get_mut(idx);
        }
        if self.entries.len() >= MAX_EVENT_CONTEXTS {
            return None;
        }
        self.entries.push(EventContext {
            event_id,
            ..Default::default()
        });
        self.entries.last_mut()
    }
}

/// Primes the cache from the window's SYSCALL records.
///
/// Later records overwrite earlier ones for the same serial: the last
/// SYSCALL observation wins.
pub async fn parse_syscall_context(source: &dyn RecordSource, cache: &mut EventContextCache) {
    let query = AuditQuery::raw(RecordFilter::MessageType("SYSCALL"));
    for line in source.fetch(&query).await {
        let Some(serial) = record::event_serial(&line) else {
            continue;
        };
        let Some(ctx) = cache.get_or_create(serial) else {
            continue;
        };
        if let Some(pid) = record::numeric_field(&line, "pid") {
            ctx.pid = pid as i32;
        }
        if let Some(ppid) = record::numeric_field(&line, "ppid") {
            ctx.ppid = ppid as i32;
        }
        if let Some(comm) = record::quoted_field(&line, "comm") {
            ctx.comm = record::clamp_len(comm, COMM_MAX).to_string();
        }
        if let Some(exe) = record::quoted_field(&line, "exe") {
            ctx.exe = record::clamp_len(exe, EXE_MAX).to_string();
        }
    }
    tracing::debug!(contexts = cache.len(), "Event correlation cache primed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReplaySource;

    #[test]
    fn test_get_or_create_reuses_slot() {
        let mut cache = EventContextCache::new();
        cache.get_or_create(42).unwrap().pid = 7;
        cache.get_or_create(42).unwrap().ppid = 8;

        assert_eq!(cache.len(), 1);
        let ctx = cache.lookup(42).unwrap();
        assert_eq!(ctx.pid, 7);
        assert_eq!(ctx.ppid, 8);
    }

    #[test]
    fn test_capacity_bound() {
        let mut cache = EventContextCache::new();
        for id in 0..MAX_EVENT_CONTEXTS as i64 {
            assert!(cache.get_or_create(id).is_some());
        }
        assert!(cache.get_or_create(9999).is_none());
        // Existing slots stay reachable at capacity
        assert!(cache.get_or_create(0).is_some());
        assert_eq!(cache.len(), MAX_EVENT_CONTEXTS);
    }

    #[test]
    fn test_clear() {
        let mut cache = EventContextCache::new();
        cache.get_or_create(1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.lookup(1).is_none());
    }

    #[tokio::test]
    async fn test_parse_syscall_context_fills_identity() {
        let source = ReplaySource::new().with_records(
            RecordFilter::MessageType("SYSCALL"),
            &[
                r#"type=SYSCALL msg=audit(1767386347.120:42): arch=c000003e syscall=257 ppid=1000 pid=999 comm="vim" exe="/usr/bin/vim""#,
                r#"type=SYSCALL msg=audit(1767386349.001:43): arch=c000003e syscall=59 ppid=1 pid=500 comm="cron" exe="/usr/sbin/cron""#,
            ],
        );

        let mut cache = EventContextCache::new();
        parse_syscall_context(&source, &mut cache).await;

        assert_eq!(cache.len(), 2);
        let ctx = cache.lookup(42).unwrap();
        assert_eq!(ctx.pid, 999);
        assert_eq!(ctx.ppid, 1000);
        assert_eq!(ctx.comm, "vim");
        assert_eq!(ctx.exe, "/usr/bin/vim");
    }

    #[tokio::test]
    async fn test_parse_syscall_context_last_observation_wins() {
        let source = ReplaySource::new().with_records(
            RecordFilter::MessageType("SYSCALL"),
            &[
                r#"type=SYSCALL msg=audit(1767386347.120:42): ppid=10 pid=11 comm="first" exe="/bin/first""#,
                r#"type=SYSCALL msg=audit(1767386347.130:42): ppid=20 pid=21 comm="second" exe="/bin/second""#,
            ],
        );

        let mut cache = EventContextCache::new();
        parse_syscall_context(&source, &mut cache).await;

        assert_eq!(cache.len(), 1);
        let ctx = cache.lookup(42).unwrap();
        assert_eq!(ctx.comm, "second");
        assert_eq!(ctx.pid, 21);
    }

    #[tokio::test]
    async fn test_parse_syscall_context_skips_malformed() {
        let source = ReplaySource::new().with_records(
            RecordFilter::MessageType("SYSCALL"),
            &["garbage without a serial", r#"type=SYSCALL msg=audit(1.0:7): pid=3"#],
        );

        let mut cache = EventContextCache::new();
        parse_syscall_context(&source, &mut cache).await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(7).unwrap().pid, 3);
    }
}

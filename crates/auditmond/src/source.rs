//! Event-source adapter over the auditd search utility.
//!
//! `ausearch` does the heavy lifting of filtering and formatting the audit
//! trail; the adapter turns one query into one subprocess invocation and
//! hands back the emitted lines. A missing collector, a failed spawn, or an
//! empty match set all yield an empty sequence — callers never see an
//! error, they see no records.

use async_trait::async_trait;

use sentinel_common::cmd::{self, AUSEARCH_CMD};

/// Record filter for one collector query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    /// Audit message type (`-m`), e.g. `USER_AUTH`.
    MessageType(&'static str),
    /// Watch-rule key (`-k`), e.g. `identity`.
    Key(&'static str),
    /// Syscall name (`-sc`), e.g. `execve`.
    Syscall(&'static str),
}

/// Output format requested from the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `--format raw`: stable field grammar, quoted strings.
    Raw,
    /// `-i`: numeric fields resolved to names.
    Interpreted,
    /// Collector default formatting.
    Default,
}

/// Time window selector. Probes currently always cover the current day;
/// the variant exists so a narrower window can be added without touching
/// the query sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Today,
}

/// One collector query: filter, window, and output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditQuery {
    pub filter: RecordFilter,
    pub window: TimeWindow,
    pub format: OutputFormat,
}

impl AuditQuery {
    /// Raw-format query over the current window.
    pub fn raw(filter: RecordFilter) -> Self {
        Self {
            filter,
            window: TimeWindow::Today,
            format: OutputFormat::Raw,
        }
    }

    /// Interpreted-format query over the current window.
    pub fn interpreted(filter: RecordFilter) -> Self {
        Self {
            filter,
            window: TimeWindow::Today,
            format: OutputFormat::Interpreted,
        }
    }

    /// Default-format query over the current window.
    pub fn plain(filter: RecordFilter) -> Self {
        Self {
            filter,
            window: TimeWindow::Today,
            format: OutputFormat::Default,
        }
    }

    /// Renders the collector argv for this query.
    pub fn to_args(&self) -> Vec<&'static str> {
        let mut args = Vec::with_capacity(6);
        match self.filter {
            RecordFilter::MessageType(msgtype) => {
                args.push("-m");
                args.push(msgtype);
            }
            RecordFilter::Key(key) => {
                args.push("-k");
                args.push(key);
            }
            RecordFilter::Syscall(syscall) => {
                args.push("-sc");
                args.push(syscall);
            }
        }
        match self.window {
            TimeWindow::Today => {
                args.push("-ts");
                args.push("today");
            }
        }
        match self.format {
            OutputFormat::Raw => {
                args.push("--format");
                args.push("raw");
            }
            OutputFormat::Interpreted => args.push("-i"),
            OutputFormat::Default => {}
        }
        args
    }
}

/// A source of raw audit record lines.
///
/// One `fetch` is one collector invocation: a finite sequence of lines,
/// no retries, no surfaced errors.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, query: &AuditQuery) -> Vec<String>;
}

/// The production source: spawns `ausearch` from `$PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ausearch;

#[async_trait]
impl RecordSource for Ausearch {
    async fn fetch(&self, query: &AuditQuery) -> Vec<String> {
        let args = query.to_args();
        match cmd::run_capture(AUSEARCH_CMD, &args).await {
            Ok(result) => result.stdout_lines(),
            Err(e) => {
                tracing::debug!(error = %e, ?query, "Collector unavailable, no records");
                Vec::new()
            }
        }
    }
}

/// Replays canned record lines per filter.
///
/// Backs the scenario tests and offline analysis of captured logs: every
/// query whose filter matches a registered set gets those lines back,
/// regardless of format.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    responses: Vec<(RecordFilter, Vec<String>)>,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the lines returned for queries with `filter`.
    pub fn with_records(mut self, filter: RecordFilter, lines: &[&str]) -> Self {
        self.responses
            .push((filter, lines.iter().map(|l| l.to_string()).collect()));
        self
    }
}

#[async_trait]
impl RecordSource for ReplaySource {
    async fn fetch(&self, query: &AuditQuery) -> Vec<String> {
        self.responses
            .iter()
            .filter(|(filter, _)| *filter == query.filter)
            .flat_map(|(_, lines)| lines.iter().cloned())
            .collect()
    }
}

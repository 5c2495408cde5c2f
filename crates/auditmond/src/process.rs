//! Process ancestry chains for correlated audit events.
//!
//! A chain records the `comm` names from an audited process up through its
//! ancestry. The first entry always comes from the audit record itself (the
//! audited process may already be gone); the rest are walked live from
//! `/proc` starting at the recorded parent pid.

use serde::{Deserialize, Serialize};
use std::fs;

/// Maximum ancestry depth recorded per chain.
pub const MAX_CHAIN_DEPTH: usize = 16;

/// Shell binaries whose appearance under a service daemon is a red flag.
const SHELL_NAMES: &[&str] = &["sh", "bash", "dash", "zsh"];

/// Network-facing daemons that should not be spawning interactive shells.
const NETWORK_DAEMONS: &[&str] = &[
    "nginx",
    "apache2",
    "httpd",
    "php-fpm",
    "mysqld",
    "mariadbd",
    "postgres",
    "redis-server",
];

/// Tools whose presence in an ancestry usually means a staged connection
/// or download rather than normal administration.
const REMOTE_TOOLS: &[&str] = &["nc", "ncat", "socat"];

/// Ordered process names, audited process first, ancestors following.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessChain {
    pub names: Vec<String>,
}

impl ProcessChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain whose first hop is the audited process itself.
    pub fn seed(comm: &str) -> Self {
        Self {
            names: vec![comm.to_string()],
        }
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// Appends an ancestor, refusing once the depth cap is reached.
    pub fn push(&mut self, comm: &str) -> bool {
        if self.names.len() >= MAX_CHAIN_DEPTH {
            return false;
        }
        self.names.push(comm.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Reads `(comm, ppid)` for one pid from `/proc/<pid>/stat`.
///
/// The comm field is parenthesized and may itself contain spaces or
/// parentheses, so the parse anchors on the last closing parenthesis.
fn read_stat(pid: i32) -> Option<(String, i32)> {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    let comm = stat.get(open + 1..close)?.to_string();
    let mut fields = stat.get(close + 1..)?.split_whitespace();
    let _state = fields.next()?;
    let ppid = fields.next()?.parse().ok()?;
    Some((comm, ppid))
}

/// Walks process ancestry upward from `pid`, appending comm names.
///
/// The walk stops at pid 1, at the depth cap, or at the first process that
/// can no longer be read: short-lived parents are often already gone, and a
/// partial chain is still useful.
pub fn build_process_chain(pid: i32, chain: &mut ProcessChain) {
    let mut current = pid;
    while current > 1 && chain.depth() < MAX_CHAIN_DEPTH {
        let Some((comm, ppid)) = read_stat(current) else {
            tracing::trace!(pid = current, "Ancestor no longer present, chain truncated");
            break;
        };
        if !chain.push(&comm) {
            break;
        }
        current = ppid;
    }
}

/// Checks a chain for shapes that indicate abuse rather than
/// administration. Returns the reason when suspicious.
pub fn is_suspicious_chain(chain: &ProcessChain) -> Option<&'static str> {
    let has_shell = chain
        .names
        .iter()
        .any(|n| SHELL_NAMES.contains(&n.as_str()));
    let has_daemon = chain
        .names
        .iter()
        .any(|n| NETWORK_DAEMONS.contains(&n.as_str()));

    if has_shell && has_daemon {
        return Some("shell spawned under a network-facing service");
    }
    if chain
        .names
        .iter()
        .any(|n| REMOTE_TOOLS.contains(&n.as_str()))
    {
        return Some("remote-connection tool in process ancestry");
    }
    None
}

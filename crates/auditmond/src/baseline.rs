//! Persisted behavioral baseline.
//!
//! The baseline is an exponential moving average of key activity counters,
//! folded in once per probe and persisted as a small fixed-size binary
//! record. The on-disk layout is explicit little-endian so a baseline
//! written on one architecture loads on another:
//!
//! ```text
//! offset  size  field
//!      0     8  magic "SNTLAUDT"
//!      8     4  version (u32)
//!     12     8  created (i64 unix seconds)
//!     20     8  updated (i64 unix seconds)
//!     28     4  sample_count (u32)
//!     32     4  avg_auth_failures (f32)
//!     36     4  avg_sudo_count (f32)
//!     40     4  avg_sensitive_access (f32)
//!     44     4  avg_tmp_executions (f32)
//!     48     4  avg_shell_spawns (f32)
//! ```
//!
//! Anything that is not a well-formed current-version record — missing
//! file, short read, bad magic, unknown version — loads as "no baseline":
//! anomaly detection is skipped and the next update re-seeds the record.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Cursor, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use sentinel_common::{SentinelError, SentinelResult};

use crate::types::AuditSummary;

/// File magic, first 8 bytes of every baseline record.
pub const BASELINE_MAGIC: &[u8; 8] = b"SNTLAUDT";

/// Current record version.
pub const BASELINE_VERSION: u32 = 1;

/// EMA smoothing factor: a new sample carries 20% weight.
pub const EMA_ALPHA: f32 = 0.2;

/// Anomaly detection needs at least this many folded samples.
pub const MIN_BASELINE_SAMPLES: u32 = 5;

/// System-wide baseline location, used when the daemon runs as root.
pub const SYSTEM_BASELINE_PATH: &str = "/var/lib/sentinel/audit_baseline.dat";

const USER_BASELINE_DIR: &str = ".sentinel";
const USER_BASELINE_FILE: &str = "audit_baseline.dat";

/// Encoded record size in bytes.
pub const BASELINE_RECORD_LEN: usize = 8 + 4 + 8 + 8 + 4 + 5 * 4;

/// Running averages of the tracked activity counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditBaseline {
    pub version: u32,
    /// Unix seconds when the record was first seeded.
    pub created: i64,
    /// Unix seconds of the last fold.
    pub updated: i64,
    /// Probes folded in; a true count, never smoothed.
    pub sample_count: u32,
    pub avg_auth_failures: f32,
    pub avg_sudo_count: f32,
    pub avg_sensitive_access: f32,
    pub avg_tmp_executions: f32,
    pub avg_shell_spawns: f32,
}

fn ema(sample: f32, avg: f32) -> f32 {
    sample * EMA_ALPHA + avg * (1.0 - EMA_ALPHA)
}

impl AuditBaseline {
    /// Folds one probe's counters into the averages.
    ///
    /// The first sample seeds every average verbatim; later samples are
    /// smoothed with [`EMA_ALPHA`].
    pub fn update(&mut self, sample: &AuditSummary) {
        let now = Utc::now().timestamp();
        if self.sample_count == 0 {
            self.version = BASELINE_VERSION;
            self.created = now;
            self.avg_auth_failures = sample.auth_failures as f32;
            self.avg_sudo_count = sample.sudo_count as f32;
            self.avg_sensitive_access = sample.sensitive_file_count() as f32;
            self.avg_tmp_executions = sample.tmp_executions as f32;
            self.avg_shell_spawns = sample.shell_spawns as f32;
        } else {
            self.avg_auth_failures = ema(sample.auth_failures as f32, self.avg_auth_failures);
            self.avg_sudo_count = ema(sample.sudo_count as f32, self.avg_sudo_count);
            self.avg_sensitive_access =
                ema(sample.sensitive_file_count() as f32, self.avg_sensitive_access);
            self.avg_tmp_executions = ema(sample.tmp_executions as f32, self.avg_tmp_executions);
            self.avg_shell_spawns = ema(sample.shell_spawns as f32, self.avg_shell_spawns);
        }
        self.sample_count += 1;
        self.updated = now;
    }

    fn write_record<W: Write>(&self, mut w: W) -> io::Result<()> {
        w.write_all(BASELINE_MAGIC)?;
        w.write_u32::<LittleEndian>(self.version)?;
        w.write_i64::<LittleEndian>(self.created)?;
        w.write_i64::<LittleEndian>(self.updated)?;
        w.write_u32::<LittleEndian>(self.sample_count)?;
        w.write_f32::<LittleEndian>(self.avg_auth_failures)?;
        w.write_f32::<LittleEndian>(self.avg_sudo_count)?;
        w.write_f32::<LittleEndian>(self.avg_sensitive_access)?;
        w.write_f32::<LittleEndian>(self.avg_tmp_executions)?;
        w.write_f32::<LittleEndian>(self.avg_shell_spawns)?;
        Ok(())
    }

    /// Encodes the record to its on-disk byte layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(BASELINE_RECORD_LEN);
        // Writing into a Vec cannot fail
        let _ = self.write_record(&mut buf);
        buf
    }

    /// Decodes an on-disk record, validating length, magic, and version.
    pub fn decode(bytes: &[u8], origin: &Path) -> SentinelResult<Self> {
        if bytes.len() < BASELINE_RECORD_LEN {
            return Err(SentinelError::baseline_format(origin, "short read"));
        }
        if &bytes[..8] != BASELINE_MAGIC {
            return Err(SentinelError::baseline_format(origin, "bad magic"));
        }

        let mut cursor = Cursor::new(&bytes[8..]);
        let short = |_: io::Error| SentinelError::baseline_format(origin, "short read");

        let version = cursor.read_u32::<LittleEndian>().map_err(short)?;
        if version != BASELINE_VERSION {
            return Err(SentinelError::baseline_format(
                origin,
                format!("unsupported version {version}"),
            ));
        }

        Ok(Self {
            version,
            created: cursor.read_i64::<LittleEndian>().map_err(short)?,
            updated: cursor.read_i64::<LittleEndian>().map_err(short)?,
            sample_count: cursor.read_u32::<LittleEndian>().map_err(short)?,
            avg_auth_failures: cursor.read_f32::<LittleEndian>().map_err(short)?,
            avg_sudo_count: cursor.read_f32::<LittleEndian>().map_err(short)?,
            avg_sensitive_access: cursor.read_f32::<LittleEndian>().map_err(short)?,
            avg_tmp_executions: cursor.read_f32::<LittleEndian>().map_err(short)?,
            avg_shell_spawns: cursor.read_f32::<LittleEndian>().map_err(short)?,
        })
    }
}

/// Resolves and persists the baseline across its candidate locations.
///
/// Load order is system path then user path; save tries the system path
/// and falls back to the user path, creating `~/.sentinel` on demand.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    system_path: PathBuf,
    user_path: Option<PathBuf>,
}

impl BaselineStore {
    /// Store over the standard system and per-user locations.
    pub fn default_paths() -> Self {
        let user_path = env::var_os("HOME").map(|home| {
            Path::new(&home)
                .join(USER_BASELINE_DIR)
                .join(USER_BASELINE_FILE)
        });
        Self {
            system_path: PathBuf::from(SYSTEM_BASELINE_PATH),
            user_path,
        }
    }

    /// Store over explicit locations, for tests and offline analysis.
    pub fn at(system_path: impl Into<PathBuf>, user_path: Option<PathBuf>) -> Self {
        Self {
            system_path: system_path.into(),
            user_path,
        }
    }

    /// Loads the baseline from the first location with a usable record.
    pub fn load(&self) -> Option<AuditBaseline> {
        let mut candidates = vec![self.system_path.as_path()];
        if let Some(user) = &self.user_path {
            candidates.push(user.as_path());
        }

        for path in candidates {
            match read_baseline(path) {
                Ok(baseline) => {
                    tracing::debug!(path = %path.display(), samples = baseline.sample_count, "Loaded baseline");
                    return Some(baseline);
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "No usable baseline here");
                }
            }
        }
        None
    }

    /// Persists the baseline. Returns false on failure; never raises.
    pub fn save(&self, baseline: &AuditBaseline) -> bool {
        if write_baseline(&self.system_path, baseline) {
            return true;
        }

        let Some(user_path) = &self.user_path else {
            tracing::warn!("Baseline not saved: system path unwritable and no home directory");
            return false;
        };

        if let Some(dir) = user_path.parent() {
            if fs::create_dir_all(dir).is_err() {
                tracing::warn!(dir = %dir.display(), "Could not create baseline directory");
                return false;
            }
            let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
        }

        write_baseline(user_path, baseline)
    }
}

fn read_baseline(path: &Path) -> SentinelResult<AuditBaseline> {
    let bytes = fs::read(path).map_err(|e| SentinelError::BaselineIo {
        path: path.to_path_buf(),
        source: e,
    })?;
    AuditBaseline::decode(&bytes, path)
}

fn write_baseline(path: &Path, baseline: &AuditBaseline) -> bool {
    let file = match fs::File::create(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Baseline path unwritable");
            return false;
        }
    };

    if let Err(e) = baseline.write_record(&file) {
        tracing::warn!(path = %path.display(), error = %e, "Baseline write failed");
        return false;
    }

    // Owner-only: the record pseudonymizes users but still profiles the host
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::debug!(path = %path.display(), error = %e, "Could not restrict baseline permissions");
    }
    true
}

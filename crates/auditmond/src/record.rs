//! Field extraction from raw audit record lines.
//!
//! Audit records are flat `field=value` text. Numeric fields are bare
//! digits; string fields are double-quoted in raw format. All records of
//! one logical event share a serial number carried in
//! `msg=audit(<secs>.<frac>:<serial>)`.
//!
//! Extraction never fails loudly: a malformed or truncated line simply
//! yields `None` and the caller skips it.

use once_cell::sync::Lazy;
use regex::Regex;

static EVENT_SERIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"msg=audit\(\d+\.\d+:(\d+)\)").expect("invalid serial pattern"));

/// Extracts the event serial: `msg=audit(1767386347.120:631)` -> 631.
pub fn event_serial(line: &str) -> Option<i64> {
    let caps = EVENT_SERIAL_RE.captures(line)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Extracts a numeric field `<name>=<digits>`.
///
/// The needle is space-prefixed so that `pid=` does not match inside
/// `ppid=`, `auid=` inside `uid=`, and so on.
pub fn numeric_field(line: &str, name: &str) -> Option<i64> {
    let needle = format!(" {name}=");
    let start = line.find(&needle)? + needle.len();
    let rest = line.get(start..)?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse().ok()
}

/// Extracts a double-quoted string field `<name>="..."`, space-prefixed
/// like [`numeric_field`]. Unquoted values (hex-encoded names, `(null)`)
/// yield `None`.
pub fn quoted_field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {name}=\"");
    let start = line.find(&needle)? + needle.len();
    let rest = line.get(start..)?;
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Truncates to at most `max` bytes without splitting a character.
pub fn clamp_len(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

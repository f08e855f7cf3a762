//! Token aggregation over append-only session logs.
//!
//! Scanning never fails: unreadable directories, files, and lines are
//! skipped and the caller gets whatever could be counted.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::source::{LogFormat, LogSource};
use super::stats::{RecordKind, TokenStats};

/// Aggregate usage from every log file under `roots` written at or after `since`
pub fn aggregate(roots: &[PathBuf], format: &dyn LogFormat, since: DateTime<Utc>) -> TokenStats {
    let cutoff = mtime_cutoff(since);
    let mut stats = TokenStats::default();

    for root in roots {
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(format.extension()) {
                continue;
            }
            // Append-only files: an mtime before the window means no record inside it
            if let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) {
                if modified < cutoff {
                    trace!("Skipping {:?}: modified before window", path);
                    continue;
                }
            }
            stats += scan_file(path, format, since);
        }
    }

    stats
}

/// Start of a window of length `window` ending at `now`, clamped to the
/// earliest representable instant
pub fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// `since` as a file time; instants the platform cannot represent fall back to the epoch
fn mtime_cutoff(since: DateTime<Utc>) -> SystemTime {
    let secs = since.timestamp();
    let offset = Duration::from_secs(secs.unsigned_abs());
    let cutoff = if secs >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    };
    cutoff.unwrap_or(UNIX_EPOCH)
}

/// Aggregate several ecosystems and sum them category-wise
pub fn aggregate_sources(sources: &[LogSource], since: DateTime<Utc>) -> TokenStats {
    sources
        .iter()
        .map(|source| {
            let stats = aggregate(&source.roots, source.format.as_ref(), since);
            debug!(
                "Token scan [{}]: {} roots, {} tokens",
                source.name(),
                source.roots.len(),
                stats.total()
            );
            stats
        })
        .sum()
}

/// Scan one file, keeping only the last record per message identity
pub fn scan_file(path: &Path, format: &dyn LogFormat, since: DateTime<Utc>) -> TokenStats {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            debug!("Failed to open {:?}: {}", path, e);
            return TokenStats::default();
        }
    };
    scan_lines(BufReader::new(file), format, since)
}

pub(crate) fn scan_lines<R: BufRead>(
    mut reader: R,
    format: &dyn LogFormat,
    since: DateTime<Utc>,
) -> TokenStats {
    let mut latest: HashMap<String, TokenStats> = HashMap::new();
    let mut anonymous = TokenStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // A failing read does not advance; keep what was counted so far
            Err(e) => {
                debug!("Stopping scan after read error: {}", e);
                break;
            }
        }
        // Invalid UTF-8: skip the line, keep going
        let Ok(line) = std::str::from_utf8(&buf) else {
            continue;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(record) = format.parse_record(trimmed) else {
            continue;
        };
        if record.kind != RecordKind::AssistantMessage || record.timestamp < since {
            continue;
        }
        match record.message_id {
            Some(id) => {
                latest.insert(id, record.usage);
            }
            None => anonymous += record.usage,
        }
    }

    latest.into_values().sum::<TokenStats>() + anonymous
}

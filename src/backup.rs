//! Backup snapshots of the live hosts file.
//!
//! A snapshot is a byte copy named `<hosts file name>.bak_YYYYMMDD_HHMMSS`
//! (with `_N` appended when several land in the same second). Names are
//! claimed with `create_new`, so an existing snapshot is never overwritten.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::{HostsError, Result};
use crate::model::BackupInfo;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;
const MAX_SAME_SECOND: u32 = 1000;

/// Filename prefix for snapshots of `hosts_path`, e.g. `hosts.bak_`.
pub fn backup_prefix(hosts_path: &Path) -> String {
    let name = hosts_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hosts".to_string());
    format!("{name}.bak_")
}

/// Timestamp embedded in a snapshot filename, if it is one.
pub fn parse_backup_name(prefix: &str, filename: &str) -> Option<String> {
    let rest = filename.strip_prefix(prefix)?;
    let ts = rest.get(..TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()?;
    let suffix = &rest[TIMESTAMP_LEN..];
    let suffix_ok = suffix.is_empty()
        || suffix
            .strip_prefix('_')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    suffix_ok.then(|| ts.to_string())
}

/// Copy the current bytes of `hosts_path` into a new snapshot in `backup_dir`.
pub fn snapshot(hosts_path: &Path, backup_dir: &Path) -> Result<PathBuf> {
    let content = fs::read(hosts_path).map_err(|e| HostsError::from_io(hosts_path, e))?;
    fs::create_dir_all(backup_dir).map_err(|e| HostsError::from_io(backup_dir, e))?;

    let prefix = backup_prefix(hosts_path);
    let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

    for n in 0..MAX_SAME_SECOND {
        let filename = if n == 0 {
            format!("{prefix}{stamp}")
        } else {
            format!("{prefix}{stamp}_{n}")
        };
        let path = backup_dir.join(&filename);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(HostsError::from_io(&path, e)),
        };
        let written = file
            .write_all(&content)
            .and_then(|_| file.sync_all())
            .map_err(|e| HostsError::from_io(&path, e));
        if let Err(e) = written {
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        tracing::info!(path = %path.display(), bytes = content.len(), "hosts backup created");
        return Ok(path);
    }

    Err(HostsError::Io {
        path: backup_dir.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::AlreadyExists,
            "too many backups within one second",
        ),
    })
}

/// Snapshots in `backup_dir`, newest first; ties broken by filename.
pub fn list(hosts_path: &Path, backup_dir: &Path) -> Result<Vec<BackupInfo>> {
    let prefix = backup_prefix(hosts_path);
    let dir = match fs::read_dir(backup_dir) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(HostsError::from_io(backup_dir, e)),
    };

    let mut backups = Vec::new();
    for entry in dir {
        let entry = entry.map_err(|e| HostsError::from_io(backup_dir, e))?;
        let filename = entry.file_name().to_string_lossy().into_owned();
        let Some(timestamp) = parse_backup_name(&prefix, &filename) else {
            continue;
        };
        let meta = entry
            .metadata()
            .map_err(|e| HostsError::from_io(&entry.path(), e))?;
        if !meta.is_file() {
            continue;
        }
        backups.push(BackupInfo {
            filename,
            path: entry.path(),
            timestamp,
            size: meta.len(),
        });
    }

    backups.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| natural_suffix(&b.filename).cmp(&natural_suffix(&a.filename)))
            .then_with(|| b.filename.cmp(&a.filename))
    });
    Ok(backups)
}

/// Same-second counter, so `_10` sorts after `_9`.
fn natural_suffix(filename: &str) -> u32 {
    filename
        .rsplit_once('_')
        .and_then(|(_, n)| if n.len() < 6 { n.parse().ok() } else { None })
        .unwrap_or(0)
}

/// Whether `path` names a snapshot of `hosts_path` inside `backup_dir`.
pub fn is_backup_of(hosts_path: &Path, backup_dir: &Path, path: &Path) -> bool {
    let prefix = backup_prefix(hosts_path);
    let in_dir = path.parent().is_some_and(|p| same_dir(p, backup_dir));
    let named = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| parse_backup_name(&prefix, n).is_some());
    in_dir && named
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

//! Shared test helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Hosts file the integration tests start from.
pub const SAMPLE_HOSTS: &str = "\
127.0.0.1\tlocalhost
::1\tlocalhost

# === Work ===
# Staging API
10.0.0.5\tapi.work.test
10.0.0.8\tweb.work.test # frontend [work, web]
# 10.0.0.6\told.work.test
10.0.0.7\tdb.work.test db2.work.test

# [off] === Legacy ===
192.168.1.20\tlegacy.test
";

/// Create a temp directory for use as EASYHOSTS_HOME.
/// Uses current dir (workspace) so sandbox allows full access.
pub fn temp_home() -> TempDir {
    tempfile::Builder::new()
        .prefix("easyhosts_test_")
        .tempdir_in(std::env::current_dir().unwrap_or_else(|_| Path::new(".").into()))
        .expect("temp dir")
}

/// Write `content` to `<dir>/hosts` and return its path.
pub fn write_hosts(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("hosts");
    std::fs::write(&path, content).expect("write hosts");
    path
}

/// Backup files in `dir`, sorted by name.
pub fn backup_files(dir: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("hosts.bak_"))
        })
        .collect();
    out.sort();
    out
}

/// `easyhosts` binary pointed at a temp home and hosts file.
pub fn cli(home: &Path, hosts: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("easyhosts").expect("binary");
    cmd.env("EASYHOSTS_HOME", home)
        .env("EASYHOSTS_HOSTS_FILE", hosts)
        .env_remove("EASYHOSTS_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a closure with EASYHOSTS_HOME set to the given path.
pub fn with_test_env<F, R>(home: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    let prev = std::env::var_os("EASYHOSTS_HOME");
    std::env::set_var("EASYHOSTS_HOME", home);
    let r = f();
    match prev {
        Some(v) => std::env::set_var("EASYHOSTS_HOME", v),
        None => std::env::remove_var("EASYHOSTS_HOME"),
    }
    r
}

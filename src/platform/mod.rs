//! Platform abstraction for the live hosts file, privilege and name lookups.

use std::fs;
use std::io::Write;
use std::net::{IpAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

use serde::{Deserialize, Serialize};

use crate::backup;
use crate::error::{HostsError, Result};
use crate::model::BackupInfo;
use crate::validate;

/// Environment override for the live hosts file (tests, containers).
pub const HOSTS_FILE_ENV: &str = "EASYHOSTS_HOSTS_FILE";

/// Backup-aware access to the live hosts file.
///
/// `write_live` never touches the live file unless a snapshot of its
/// current bytes was written first.
pub trait HostsStore: Send + Sync {
    /// Path of the live hosts file.
    fn hosts_path(&self) -> &Path;
    /// Raw bytes of the live hosts file. Decoding is left to the caller.
    fn read_live(&self) -> Result<Vec<u8>>;
    /// Back up the live file, then replace it with `data`. Returns the backup path.
    fn write_live(&self, data: &[u8]) -> Result<PathBuf>;
    /// Existing backups, newest first.
    fn list_backups(&self) -> Result<Vec<BackupInfo>>;
    /// Write a backup's bytes back through `write_live`, unchanged.
    fn restore_backup(&self, path: &Path) -> Result<PathBuf>;
    /// Remove a backup file.
    fn delete_backup(&self, path: &Path) -> Result<()>;
}

/// Whether the current process may write the system hosts file.
pub trait Privilege: Send + Sync {
    fn is_elevated(&self) -> bool;
}

/// Forward lookup used to pre-fill an entry's IP.
pub trait Resolver: Send + Sync {
    fn lookup_address(&self, domain: &str) -> Result<String>;
}

/// Informational reachability result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_rtt_ms: Option<f64>,
    pub message: String,
}

/// Reachability probe. Never affects stored data.
pub trait Prober: Send + Sync {
    fn ping(&self, domain: &str) -> PingResult;
}

/// Platform default location of the system hosts file.
pub fn system_hosts_path() -> PathBuf {
    #[cfg(unix)]
    return PathBuf::from(unix::HOSTS_PATH);

    #[cfg(windows)]
    return windows::hosts_path();
}

/// Stock hosts file content for `reset`.
pub fn default_hosts_content() -> &'static str {
    #[cfg(unix)]
    return unix::DEFAULT_HOSTS;

    #[cfg(windows)]
    return windows::DEFAULT_HOSTS;
}

/// Get platform Privilege implementation.
pub fn default_privilege() -> Box<dyn Privilege> {
    #[cfg(unix)]
    return Box::new(unix::UnixPrivilege);

    #[cfg(windows)]
    return Box::new(windows::WindowsPrivilege::new(system_hosts_path()));
}

/// HostsStore backed by a hosts file and a backup directory.
#[derive(Debug, Clone)]
pub struct FileHostsStore {
    hosts_path: PathBuf,
    backup_dir: PathBuf,
}

impl FileHostsStore {
    pub fn new(hosts_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            hosts_path: hosts_path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Store that keeps backups next to the hosts file.
    pub fn beside(hosts_path: impl Into<PathBuf>) -> Self {
        let hosts_path = hosts_path.into();
        let backup_dir = parent_dir(&hosts_path);
        Self {
            hosts_path,
            backup_dir,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    fn ensure_backup(&self, path: &Path) -> Result<()> {
        if backup::is_backup_of(&self.hosts_path, &self.backup_dir, path) {
            Ok(())
        } else {
            Err(HostsError::NotABackup {
                path: path.to_path_buf(),
            })
        }
    }
}

impl HostsStore for FileHostsStore {
    fn hosts_path(&self) -> &Path {
        &self.hosts_path
    }

    fn read_live(&self) -> Result<Vec<u8>> {
        let bytes =
            fs::read(&self.hosts_path).map_err(|e| HostsError::from_io(&self.hosts_path, e))?;
        tracing::debug!(path = %self.hosts_path.display(), bytes = bytes.len(), "read hosts file");
        Ok(bytes)
    }

    fn write_live(&self, data: &[u8]) -> Result<PathBuf> {
        let backup_path = backup::snapshot(&self.hosts_path, &self.backup_dir)?;
        write_atomic(&self.hosts_path, data)?;
        tracing::info!(
            path = %self.hosts_path.display(),
            bytes = data.len(),
            backup = %backup_path.display(),
            "hosts file written"
        );
        Ok(backup_path)
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        backup::list(&self.hosts_path, &self.backup_dir)
    }

    fn restore_backup(&self, path: &Path) -> Result<PathBuf> {
        self.ensure_backup(path)?;
        let bytes = fs::read(path).map_err(|e| HostsError::from_io(path, e))?;
        let backup_path = self.write_live(&bytes)?;
        tracing::info!(from = %path.display(), "hosts file restored from backup");
        Ok(backup_path)
    }

    fn delete_backup(&self, path: &Path) -> Result<()> {
        self.ensure_backup(path)?;
        fs::remove_file(path).map_err(|e| HostsError::from_io(path, e))?;
        tracing::info!(path = %path.display(), "backup deleted");
        Ok(())
    }
}

/// Resolver using the system's name service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup_address(&self, domain: &str) -> Result<String> {
        let domain = validate::sanitize(domain);
        validate::check_domain(&domain)?;
        let resolve_err = |source: std::io::Error| HostsError::Resolve {
            domain: domain.clone(),
            source,
        };
        let addrs: Vec<IpAddr> = (domain.as_str(), 0)
            .to_socket_addrs()
            .map_err(resolve_err)?
            .map(|a| a.ip())
            .collect();
        // Prefer IPv4, as hosts entries for local development usually are.
        let ip = addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .map(IpAddr::to_string)
            .ok_or_else(|| resolve_err(std::io::Error::from(std::io::ErrorKind::NotFound)))?;
        validate::check_ip(&ip)?;
        Ok(ip)
    }
}

/// Reachability by TCP connect, averaged over a few attempts.
#[derive(Debug, Clone)]
pub struct TcpProber {
    pub port: u16,
    pub timeout: Duration,
    pub attempts: u32,
}

impl Default for TcpProber {
    fn default() -> Self {
        Self {
            port: 80,
            timeout: Duration::from_secs(2),
            attempts: 3,
        }
    }
}

impl Prober for TcpProber {
    fn ping(&self, domain: &str) -> PingResult {
        let addr = match (domain, self.port).to_socket_addrs().map(|mut a| a.next()) {
            Ok(Some(addr)) => addr,
            Ok(None) => {
                return PingResult {
                    success: false,
                    avg_rtt_ms: None,
                    message: format!("{domain} has no addresses"),
                }
            }
            Err(e) => {
                return PingResult {
                    success: false,
                    avg_rtt_ms: None,
                    message: format!("cannot resolve {domain}: {e}"),
                }
            }
        };

        let mut rtts = Vec::new();
        let mut last_err = None;
        for _ in 0..self.attempts.max(1) {
            let start = Instant::now();
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => rtts.push(start.elapsed().as_secs_f64() * 1000.0),
                Err(e) => last_err = Some(e),
            }
        }

        if rtts.is_empty() {
            let reason = last_err.map(|e| e.to_string()).unwrap_or_default();
            return PingResult {
                success: false,
                avg_rtt_ms: None,
                message: format!("{addr} unreachable: {reason}"),
            };
        }
        let avg = rtts.iter().sum::<f64>() / rtts.len() as f64;
        PingResult {
            success: true,
            avg_rtt_ms: Some(avg),
            message: format!("{addr} reachable ({}/{} connects, avg {avg:.1} ms)", rtts.len(), self.attempts.max(1)),
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replace `path` with `data` via a temp file in the same directory and a rename.
///
/// Falls back to an in-place overwrite with read-back verification when the
/// rename is refused (a bind-mounted file cannot be renamed over).
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    let perms = fs::metadata(path).map(|m| m.permissions()).ok();

    let mut tmp =
        tempfile::NamedTempFile::new_in(&dir).map_err(|e| HostsError::from_io(path, e))?;
    tmp.write_all(data)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| HostsError::from_io(tmp.path(), e))?;
    if let Some(perms) = perms {
        fs::set_permissions(tmp.path(), perms).map_err(|e| HostsError::from_io(tmp.path(), e))?;
    }

    match tmp.persist(path) {
        Ok(_) => {
            sync_dir(&dir);
            Ok(())
        }
        Err(e) if rename_refused(&e.error) => {
            tracing::warn!(
                path = %path.display(),
                error = %e.error,
                "rename over hosts file refused, writing in place"
            );
            drop(e.file);
            write_in_place(path, data)
        }
        Err(e) => Err(HostsError::from_io(path, e.error)),
    }
}

fn write_in_place(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| HostsError::from_io(path, e))?;
    file.write_all(data)
        .and_then(|_| file.sync_all())
        .map_err(|e| HostsError::from_io(path, e))?;
    let written = fs::read(path).map_err(|e| HostsError::from_io(path, e))?;
    if written != data {
        return Err(HostsError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "hosts file content differs after write",
            ),
        });
    }
    Ok(())
}

fn rename_refused(err: &std::io::Error) -> bool {
    #[cfg(unix)]
    return unix::rename_refused(err);

    #[cfg(windows)]
    return windows::rename_refused(err);
}

fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Ok(d) = fs::File::open(dir) {
        let _ = d.sync_all();
    }
    #[cfg(windows)]
    let _ = dir;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        fs::write(&path, "old\n").unwrap();
        write_atomic(&path, b"new\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn parent_of_bare_name_is_cwd() {
        assert_eq!(parent_dir(Path::new("hosts")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/etc/hosts")), PathBuf::from("/etc"));
    }

    #[test]
    fn tcp_probe_reaches_local_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let prober = TcpProber {
            port: listener.local_addr().unwrap().port(),
            timeout: Duration::from_secs(1),
            attempts: 2,
        };
        let result = prober.ping("127.0.0.1");
        assert!(result.success, "{}", result.message);
        assert!(result.avg_rtt_ms.is_some());
    }

    #[test]
    fn tcp_probe_reports_refusal() {
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let prober = TcpProber {
            port,
            timeout: Duration::from_millis(500),
            attempts: 1,
        };
        let result = prober.ping("127.0.0.1");
        assert!(!result.success);
        assert!(result.avg_rtt_ms.is_none());
    }

    #[test]
    fn resolver_rejects_invalid_domain() {
        assert!(matches!(
            SystemResolver.lookup_address("bad_domain!"),
            Err(HostsError::Validation(_))
        ));
    }
}

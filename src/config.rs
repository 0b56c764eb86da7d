//! Configuration loading and path resolution.
//!
//! Supports EASYHOSTS_HOME env var override for testing.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::merge::MergeMode;
use crate::platform;

pub const HOME_ENV: &str = "EASYHOSTS_HOME";

/// Paths for the easyhosts data store.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub settings_file: PathBuf,
}

impl AppPaths {
    /// Build paths from base directory (e.g. ProjectDirs data dir or EASYHOSTS_HOME).
    pub fn from_base(base: PathBuf) -> Self {
        let config_file = base.join("config.toml");
        let settings_file = base.join("settings.json");
        Self {
            config_dir: base,
            config_file,
            settings_file,
        }
    }

    /// Paths for testing: use a temp dir as base.
    pub fn for_test(base: impl AsRef<Path>) -> Self {
        Self::from_base(base.as_ref().to_path_buf())
    }

    /// Get default paths (respects EASYHOSTS_HOME).
    pub fn default_paths() -> Self {
        let base = if let Ok(home) = std::env::var(HOME_ENV) {
            PathBuf::from(home)
        } else if let Some(dirs) = directories::ProjectDirs::from("com", "easyhosts", "easyhosts")
        {
            dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".easyhosts")
        };
        Self::from_base(base)
    }
}

/// Main config.toml structure.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Edit this file instead of the system hosts file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts_file: Option<PathBuf>,
    /// Where backups go. Defaults to the hosts file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
    #[serde(default)]
    pub default_merge_mode: MergeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

/// Resolved hosts file location and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsLocation {
    pub hosts_path: PathBuf,
    pub backup_dir: PathBuf,
    /// True when the path came from EASYHOSTS_HOSTS_FILE or config, not the OS default.
    pub overridden: bool,
}

impl Config {
    /// Load config from paths (with shared lock when file exists).
    pub fn load(paths: &AppPaths) -> Result<Config> {
        if paths.config_file.is_file() {
            let mut file = fs::OpenOptions::new()
                .read(true)
                .open(&paths.config_file)
                .with_context(|| format!("open {}", paths.config_file.display()))?;
            fs2::FileExt::lock_shared(&file)?;
            use std::io::Read;
            let mut s = String::new();
            file.read_to_string(&mut s)?;
            let cfg: Config = toml::from_str(&s)
                .with_context(|| format!("parse {}", paths.config_file.display()))?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to paths (with exclusive lock). Creates parent dirs if needed.
    pub fn save(&self, paths: &AppPaths) -> Result<()> {
        if let Some(p) = paths.config_file.parent() {
            fs::create_dir_all(p)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&paths.config_file)?;
        fs2::FileExt::lock_exclusive(&file)?;
        let s = toml::to_string_pretty(self)?;
        use std::io::Write;
        file.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Hosts file: EASYHOSTS_HOSTS_FILE, then `hosts_file`, then the OS default.
    pub fn hosts_location(&self) -> HostsLocation {
        let env_path = std::env::var_os(platform::HOSTS_FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let (hosts_path, overridden) = match env_path.or_else(|| self.hosts_file.clone()) {
            Some(p) => (p, true),
            None => (platform::system_hosts_path(), false),
        };
        let backup_dir = match &self.backup_dir {
            Some(dir) => dir.clone(),
            None => hosts_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        HostsLocation {
            hosts_path,
            backup_dir,
            overridden,
        }
    }
}

/// Path to config.toml (respects EASYHOSTS_HOME).
pub fn config_path() -> PathBuf {
    AppPaths::default_paths().config_file
}

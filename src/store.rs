//! Key-value settings store and data directory layout.
//!
//! Settings live in `settings.json` as one JSON object. Profiles, remote
//! sources and SSID rules are persisted through this store under fixed keys.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::{AppPaths, Config};

pub const KEY_PROFILES: &str = "profiles";
pub const KEY_ACTIVE_PROFILE: &str = "activeProfileId";
pub const KEY_REMOTE_SOURCES: &str = "remoteSources";
pub const KEY_SSID_RULES: &str = "ssidProfileRules";
pub const KEY_DARK_MODE: &str = "darkMode";
pub const KEY_AUTO_FLUSH: &str = "autoFlush";

/// Injected settings storage.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read `key` and deserialize it, falling back to `T::default()` when absent.
pub fn get_or_default<T>(store: &dyn SettingsStore, key: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match store.get(key)? {
        Some(v) => serde_json::from_value(v).with_context(|| format!("decode setting {key}")),
        None => Ok(T::default()),
    }
}

/// Serialize `value` and store it under `key`.
pub fn put<T: serde::Serialize>(store: &dyn SettingsStore, key: &str, value: &T) -> Result<()> {
    let v = serde_json::to_value(value).with_context(|| format!("encode setting {key}"))?;
    store.set(key, v)
}

/// Settings persisted to a JSON file (shared lock to read, exclusive to write).
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(paths: &AppPaths) -> Self {
        Self::new(paths.settings_file.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.is_file() {
            return Ok(Map::new());
        }
        let mut file = fs::OpenOptions::new()
            .read(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        fs2::FileExt::lock_shared(&file)?;
        let mut s = String::new();
        file.read_to_string(&mut s)?;
        parse_object(&s, &self.path)
    }

    /// Read-modify-write under one exclusive lock.
    fn update(&self, f: impl FnOnce(&mut Map<String, Value>)) -> Result<()> {
        if let Some(p) = self.path.parent() {
            fs::create_dir_all(p)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        fs2::FileExt::lock_exclusive(&file)?;
        let mut s = String::new();
        file.read_to_string(&mut s)?;
        let mut map = parse_object(&s, &self.path)?;
        f(&mut map);
        let out = serde_json::to_string_pretty(&Value::Object(map))?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(out.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

fn parse_object(s: &str, path: &Path) -> Result<Map<String, Value>> {
    if s.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(s).with_context(|| format!("parse {}", path.display()))? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{} does not contain a JSON object", path.display()),
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

/// In-memory settings (tests, ephemeral sessions).
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

/// Ensure the data directory exists.
pub fn ensure_dirs(paths: &AppPaths) -> Result<()> {
    std::fs::create_dir_all(&paths.config_dir)?;
    Ok(())
}

/// Load config from store.
pub fn load_config(paths: &AppPaths) -> Result<Config> {
    Config::load(paths)
}

/// Save config to store.
pub fn save_config(paths: &AppPaths, config: &Config) -> Result<()> {
    Config::save(config, paths)
}

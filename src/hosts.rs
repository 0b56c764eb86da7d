//! Document-level operations on the live hosts file.

use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::Result;
use crate::model::HostsDocument;
use crate::platform::{self, HostsStore};

/// Read and decode the live hosts file. Non-UTF-8 content is a `ParseError`.
pub fn load_document(store: &dyn HostsStore) -> Result<HostsDocument> {
    let bytes = store.read_live()?;
    Ok(codec::decode_bytes(&bytes)?)
}

/// Encode `doc` and write it through the backup-first gateway.
pub fn save_document(store: &dyn HostsStore, doc: &HostsDocument) -> Result<PathBuf> {
    store.write_live(codec::encode(doc).as_bytes())
}

/// Decode a backup without touching the live file.
pub fn preview_backup(path: &Path) -> Result<HostsDocument> {
    let bytes = std::fs::read(path).map_err(|e| crate::error::HostsError::from_io(path, e))?;
    Ok(codec::decode_bytes(&bytes)?)
}

/// Restore a backup; the content it replaces is backed up first.
pub fn restore(store: &dyn HostsStore, path: &Path) -> Result<PathBuf> {
    store.restore_backup(path)
}

/// Overwrite the live file with the platform's stock content.
pub fn reset_to_default(store: &dyn HostsStore) -> Result<PathBuf> {
    let backup = store.write_live(platform::default_hosts_content().as_bytes())?;
    tracing::info!(path = %store.hosts_path().display(), "hosts file reset to default");
    Ok(backup)
}

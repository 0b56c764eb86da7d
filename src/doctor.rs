//! Doctor command: health checks for the hosts file and its backups.

use crate::codec;
use crate::config::HostsLocation;
use crate::conflicts::detect_duplicates;
use crate::platform::{HostsStore, Privilege};
use crate::validate::validate_entry;

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub ok: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Run all doctor checks.
pub fn run_checks(
    location: &HostsLocation,
    store: &dyn HostsStore,
    privilege: &dyn Privilege,
) -> Vec<CheckResult> {
    let mut results = Vec::new();
    let path = store.hosts_path().display().to_string();

    // 1. Write access
    if location.overridden {
        results.push(CheckResult::pass(format!(
            "Using hosts file override {path}; no elevation needed."
        )));
    } else if privilege.is_elevated() {
        results.push(CheckResult::pass("Running with elevated privileges."));
    } else {
        results.push(CheckResult::fail(
            "Not elevated. Read-only until run as administrator/root.",
        ));
    }

    // 2. Readable and decodable
    let bytes = match store.read_live() {
        Ok(b) => b,
        Err(e) => {
            results.push(CheckResult::fail(format!("Cannot read {path}: {e}")));
            return results;
        }
    };
    let doc = match codec::decode_bytes(&bytes) {
        Ok(d) => d,
        Err(e) => {
            results.push(CheckResult::fail(format!("{path} is not a hosts file: {e}")));
            return results;
        }
    };
    results.push(CheckResult::pass(format!(
        "{path}: {} entries ({} enabled), {} sections",
        doc.entries.len(),
        doc.enabled_count(),
        doc.sections.len()
    )));

    // 3. Conflicting mappings
    let dups = detect_duplicates(&doc);
    if dups.is_empty() {
        results.push(CheckResult::pass("No conflicting domain mappings."));
    }
    for dup in &dups {
        let ips: Vec<&str> = dup.entries.iter().map(|o| o.ip.as_str()).collect();
        results.push(CheckResult::fail(format!(
            "[{}] mapped to several addresses: {}",
            dup.domain,
            ips.join(", ")
        )));
    }

    // 4. Entries that would be rejected on edit
    for (i, entry) in doc.entries.iter().enumerate() {
        if let Err(e) = validate_entry(entry) {
            results.push(CheckResult::fail(format!("Entry {}: {e}", i + 1)));
        }
    }

    // 5. Backups
    match store.list_backups() {
        Ok(b) if b.is_empty() => results.push(CheckResult::pass(
            "No backups yet; one is created before every write.",
        )),
        Ok(b) => results.push(CheckResult::pass(format!(
            "{} backup(s), newest {}",
            b.len(),
            b[0].filename
        ))),
        Err(e) => results.push(CheckResult::fail(format!("Cannot list backups: {e}"))),
    }

    results
}

//! Structured hosts document: entries, sections and derived views.

use serde::{Deserialize, Serialize};

/// Tag every untagged entry is presented under. Never persisted.
pub const DEFAULT_TAG: &str = "etc";

/// One IP mapped to one or more hostnames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub enabled: bool,
    pub ip: String,
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl HostEntry {
    pub fn new(ip: impl Into<String>, domains: Vec<String>) -> Self {
        Self {
            enabled: true,
            ip: ip.into(),
            domains,
            comment: None,
            tags: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Tags as every reader sees them: the stored tags, or `["etc"]` when none.
    pub fn effective_tags(&self) -> Vec<&str> {
        match &self.tags {
            Some(tags) if !tags.is_empty() => tags.iter().map(String::as_str).collect(),
            _ => vec![DEFAULT_TAG],
        }
    }
}

/// Named, toggleable banner. `position` is the number of entries that precede it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub enabled: bool,
    #[serde(default)]
    pub position: usize,
}

impl Section {
    pub fn new(title: impl Into<String>, position: usize) -> Self {
        Self {
            title: title.into(),
            enabled: true,
            position,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostsDocument {
    #[serde(default)]
    pub entries: Vec<HostEntry>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl HostsDocument {
    pub fn new(entries: Vec<HostEntry>, sections: Vec<Section>) -> Self {
        Self { entries, sections }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.sections.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.enabled).count()
    }

    /// Flip an entry's enabled flag. Returns None when `index` is out of range.
    pub fn toggle_entry(&self, index: usize) -> Option<HostsDocument> {
        let mut next = self.clone();
        let entry = next.entries.get_mut(index)?;
        entry.enabled = !entry.enabled;
        Some(next)
    }

    /// Set an entry's enabled flag explicitly.
    pub fn set_entry_enabled(&self, index: usize, enabled: bool) -> Option<HostsDocument> {
        let mut next = self.clone();
        next.entries.get_mut(index)?.enabled = enabled;
        Some(next)
    }

    /// Remove an entry. Sections after it move up one slot.
    pub fn remove_entry(&self, index: usize) -> Option<HostsDocument> {
        if index >= self.entries.len() {
            return None;
        }
        let mut next = self.clone();
        next.entries.remove(index);
        for s in &mut next.sections {
            if s.position > index {
                s.position -= 1;
            }
        }
        Some(next)
    }

    /// Replace the entry at `index`, or append when `index` is None.
    pub fn upsert_entry(&self, index: Option<usize>, entry: HostEntry) -> Option<HostsDocument> {
        let mut next = self.clone();
        match index {
            Some(i) => *next.entries.get_mut(i)? = entry,
            None => next.entries.push(entry),
        }
        Some(next)
    }

    pub fn toggle_section(&self, index: usize) -> Option<HostsDocument> {
        let mut next = self.clone();
        let section = next.sections.get_mut(index)?;
        section.enabled = !section.enabled;
        Some(next)
    }
}

/// One occurrence of a conflicting domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateOccurrence {
    pub index: usize,
    pub ip: String,
}

/// A lowercased domain mapped to more than one distinct IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub domain: String,
    pub entries: Vec<DuplicateOccurrence>,
}

/// A backup snapshot file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    pub path: std::path::PathBuf,
    /// `YYYYMMDD_HHMMSS`
    pub timestamp: String,
    pub size: u64,
}

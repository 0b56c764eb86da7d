//! Subscribed remote hosts lists: fetched on demand and merged into a document.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{Field, HostsError, ValidationError, ValidationRule};
use crate::merge::{merge, MergeMode};
use crate::model::HostsDocument;
use crate::store::{self, SettingsStore};
use crate::validate::{check_url, sanitize};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw HTTP GET of hosts-format text.
pub trait TextFetcher: Send + Sync {
    fn fetch_text(&self, url: &str) -> Result<String, HostsError>;
}

/// Blocking reqwest client. Non-2xx responses are fetch failures.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, HostsError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, HostsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("easyhosts/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostsError::Fetch {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl TextFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, HostsError> {
        let fail = |message: String| HostsError::Fetch {
            url: url.to_string(),
            message,
        };
        let response = self.client.get(url).send().map_err(|e| fail(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP {status}")));
        }
        let text = response.text().map_err(|e| fail(e.to_string()))?;
        tracing::debug!(url, bytes = text.len(), "fetched remote hosts list");
        Ok(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSource {
    pub id: String,
    pub name: String,
    pub url: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<SourceStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSourceList {
    pub sources: Vec<RemoteSource>,
}

impl RemoteSourceList {
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        Ok(Self {
            sources: store::get_or_default(store, store::KEY_REMOTE_SOURCES)?,
        })
    }

    pub fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        store::put(store, store::KEY_REMOTE_SOURCES, &self.sources)
    }

    /// Subscribe to `url`. New sources start enabled.
    pub fn add(&mut self, name: &str, url: &str) -> Result<&RemoteSource, ValidationError> {
        let name = sanitize(name);
        if name.is_empty() {
            return Err(ValidationError::new(Field::Name, ValidationRule::Empty, name));
        }
        let url = url.trim().to_string();
        check_url(&url)?;
        self.sources.push(RemoteSource {
            id: ulid::Ulid::new().to_string(),
            name,
            url,
            enabled: true,
            last_updated: None,
            last_status: None,
        });
        Ok(&self.sources[self.sources.len() - 1])
    }

    pub fn get(&self, id: &str) -> Option<&RemoteSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Look up by id, then by case-insensitive name.
    pub fn find(&self, key: &str) -> Option<&RemoteSource> {
        self.get(key).or_else(|| {
            self.sources
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(key))
        })
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s.id != id);
        self.sources.len() != before
    }

    /// Flip `enabled`. Returns the new state, None if `id` is unknown.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let source = self.sources.iter_mut().find(|s| s.id == id)?;
        source.enabled = !source.enabled;
        Some(source.enabled)
    }

    /// Apply the source with `id` and store its refreshed status in the list.
    pub fn apply(
        &mut self,
        id: &str,
        fetcher: &dyn TextFetcher,
        base: &HostsDocument,
        mode: MergeMode,
    ) -> Option<Result<HostsDocument, HostsError>> {
        let source = self.sources.iter_mut().find(|s| s.id == id)?;
        Some(apply_source(source, fetcher, base, mode))
    }
}

/// Fetch, decode and merge one source into `base`, stamping its status.
///
/// A failed fetch or undecodable body marks the source `error` and leaves
/// `base` unchanged for the caller.
pub fn apply_source(
    source: &mut RemoteSource,
    fetcher: &dyn TextFetcher,
    base: &HostsDocument,
    mode: MergeMode,
) -> Result<HostsDocument, HostsError> {
    let result = fetcher
        .fetch_text(&source.url)
        .and_then(|text| Ok(codec::decode(&text)?));

    source.last_updated = Some(chrono::Utc::now().to_rfc3339());
    match result {
        Ok(incoming) => {
            source.last_status = Some(SourceStatus::Ok);
            tracing::info!(
                source = %source.name,
                entries = incoming.entries.len(),
                mode = %mode,
                "remote source applied"
            );
            Ok(merge(base, &incoming, mode))
        }
        Err(e) => {
            source.last_status = Some(SourceStatus::Error);
            tracing::warn!(source = %source.name, error = %e, "remote source failed");
            Err(e)
        }
    }
}

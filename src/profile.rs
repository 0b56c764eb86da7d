//! Saved profiles (named document snapshots) and SSID-to-profile rules.

use anyhow::Result;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::error::{Field, ValidationError, ValidationRule};
use crate::merge::{merge, MergeMode};
use crate::model::HostsDocument;
use crate::store::{self, SettingsStore};
use crate::validate::sanitize;

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn required(field: Field, value: &str) -> Result<String, ValidationError> {
    let value = sanitize(value);
    if value.is_empty() {
        return Err(ValidationError::new(field, ValidationRule::Empty, value));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub hosts_data: HostsDocument,
    pub created_at: String,
    pub updated_at: String,
}

/// All saved profiles plus the id of the one last activated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileBook {
    pub profiles: Vec<Profile>,
    pub active_profile_id: Option<String>,
}

impl ProfileBook {
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        let profiles: Vec<Profile> = store::get_or_default(store, store::KEY_PROFILES)?;
        let active: Option<String> = store::get_or_default(store, store::KEY_ACTIVE_PROFILE)?;
        let active_profile_id = active.filter(|id| profiles.iter().any(|p| &p.id == id));
        Ok(Self {
            profiles,
            active_profile_id,
        })
    }

    pub fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        store::put(store, store::KEY_PROFILES, &self.profiles)?;
        match &self.active_profile_id {
            Some(id) => store::put(store, store::KEY_ACTIVE_PROFILE, id),
            None => store.remove(store::KEY_ACTIVE_PROFILE),
        }
    }

    /// Save a copy of `doc` under a fresh id.
    pub fn create(
        &mut self,
        name: &str,
        description: Option<&str>,
        doc: &HostsDocument,
    ) -> Result<&Profile, ValidationError> {
        let name = required(Field::Name, name)?;
        let description = description.map(sanitize).filter(|d| !d.is_empty());
        let stamp = now();
        self.profiles.push(Profile {
            id: ulid::Ulid::new().to_string(),
            name,
            description,
            hosts_data: doc.clone(),
            created_at: stamp.clone(),
            updated_at: stamp,
        });
        Ok(&self.profiles[self.profiles.len() - 1])
    }

    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Look up by id, then by case-insensitive name.
    pub fn find(&self, key: &str) -> Option<&Profile> {
        self.get(key).or_else(|| {
            self.profiles
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(key))
        })
    }

    pub fn active(&self) -> Option<&Profile> {
        self.active_profile_id.as_deref().and_then(|id| self.get(id))
    }

    /// Replace a profile's document. False if `id` is unknown.
    pub fn update(&mut self, id: &str, doc: &HostsDocument) -> bool {
        match self.profiles.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.hosts_data = doc.clone();
                p.updated_at = now();
                true
            }
            None => false,
        }
    }

    /// Change name and description. `Ok(false)` if `id` is unknown.
    pub fn rename(
        &mut self,
        id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<bool, ValidationError> {
        let name = required(Field::Name, name)?;
        let Some(p) = self.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        p.name = name;
        p.description = description.map(sanitize).filter(|d| !d.is_empty());
        p.updated_at = now();
        Ok(true)
    }

    /// Remove a profile; clears the active id if it pointed here.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);
        if self.active_profile_id.as_deref() == Some(id) {
            self.active_profile_id = None;
        }
        self.profiles.len() != before
    }

    /// Switch to a profile: its document replaces `current`.
    pub fn activate(&mut self, id: &str, current: &HostsDocument) -> Option<HostsDocument> {
        let doc = merge(current, &self.get(id)?.hosts_data, MergeMode::Replace);
        self.active_profile_id = Some(id.to_string());
        tracing::info!(profile = id, entries = doc.entries.len(), "profile activated");
        Some(doc)
    }
}

/// Network name mapped to the profile to switch to on that network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsidRule {
    pub ssid: String,
    pub profile_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SsidRules {
    pub rules: Vec<SsidRule>,
}

impl SsidRules {
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        Ok(Self {
            rules: store::get_or_default(store, store::KEY_SSID_RULES)?,
        })
    }

    pub fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        store::put(store, store::KEY_SSID_RULES, &self.rules)
    }

    /// Add a rule, or repoint the existing rule for `ssid`.
    pub fn upsert(&mut self, ssid: &str, profile_id: &str) -> Result<(), ValidationError> {
        let ssid = ssid.trim().to_string();
        if ssid.is_empty() {
            return Err(ValidationError::new(Field::Ssid, ValidationRule::Empty, ssid));
        }
        let profile_id = required(Field::Name, profile_id)?;
        match self.rules.iter_mut().find(|r| r.ssid == ssid) {
            Some(rule) => rule.profile_id = profile_id,
            None => self.rules.push(SsidRule { ssid, profile_id }),
        }
        Ok(())
    }

    pub fn remove(&mut self, ssid: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.ssid != ssid);
        self.rules.len() != before
    }

    pub fn profile_for(&self, ssid: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.ssid == ssid)
            .map(|r| r.profile_id.as_str())
    }
}

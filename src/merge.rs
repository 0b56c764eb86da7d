//! Combine two documents: append (`merge`) or overwrite (`replace`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::HostsDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    #[default]
    Merge,
    Replace,
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::Merge => f.write_str("merge"),
            MergeMode::Replace => f.write_str("replace"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMergeMode(pub String);

impl fmt::Display for InvalidMergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid merge mode {:?} (expected merge or replace)", self.0)
    }
}

impl std::error::Error for InvalidMergeMode {}

impl FromStr for MergeMode {
    type Err = InvalidMergeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" | "append" => Ok(Self::Merge),
            "replace" => Ok(Self::Replace),
            _ => Err(InvalidMergeMode(s.to_string())),
        }
    }
}

/// Merge: `base.entries ++ incoming.entries` and the same for sections, no
/// dedup. Incoming section positions are shifted past the base entries so each
/// banner still sits above the entries it introduced. Replace: `incoming`.
pub fn merge(base: &HostsDocument, incoming: &HostsDocument, mode: MergeMode) -> HostsDocument {
    match mode {
        MergeMode::Replace => incoming.clone(),
        MergeMode::Merge => {
            let offset = base.entries.len();
            let mut out = base.clone();
            out.entries.extend(incoming.entries.iter().cloned());
            out.sections.extend(incoming.sections.iter().cloned().map(|mut s| {
                s.position += offset;
                s
            }));
            out
        }
    }
}

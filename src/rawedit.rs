//! Raw text editing: diff the edited text against the generated one, then reapply.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::codec;
use crate::error::ParseError;
use crate::model::HostsDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Same,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub kind: DiffKind,
    pub text: String,
}

/// Text the raw editor starts from: the current in-memory document.
pub fn raw_text(doc: &HostsDocument) -> String {
    codec::encode(doc)
}

/// Line diff. Empty when the texts are identical.
pub fn raw_diff(original: &str, edited: &str) -> Vec<DiffLine> {
    if original == edited {
        return Vec::new();
    }
    let diff = TextDiff::from_lines(original, edited);
    diff.iter_all_changes()
        .map(|change| DiffLine {
            kind: match change.tag() {
                ChangeTag::Equal => DiffKind::Same,
                ChangeTag::Insert => DiffKind::Added,
                ChangeTag::Delete => DiffKind::Removed,
            },
            text: change.value().trim_end_matches(&['\r', '\n'][..]).to_string(),
        })
        .collect()
}

/// Parse edited text back into a document.
pub fn reapply(edited: &str) -> Result<HostsDocument, ParseError> {
    codec::decode(edited)
}

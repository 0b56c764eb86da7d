//! Search and tag filtering over a document's entries.

use std::collections::BTreeSet;

use crate::model::{HostsDocument, DEFAULT_TAG};

/// Unique effective tags, alphabetical, with `etc` last.
pub fn all_tags(doc: &HostsDocument) -> Vec<String> {
    let set: BTreeSet<&str> = doc
        .entries
        .iter()
        .flat_map(|e| e.effective_tags())
        .filter(|t| !t.is_empty())
        .collect();
    let mut tags: Vec<String> = set
        .into_iter()
        .filter(|t| *t != DEFAULT_TAG)
        .map(String::from)
        .collect();
    if doc.entries.iter().any(|e| e.effective_tags().contains(&DEFAULT_TAG)) {
        tags.push(DEFAULT_TAG.to_string());
    }
    tags
}

/// Indices of entries matching `query` (case-insensitive substring of a
/// domain, the IP or the comment) and carrying any of `selected_tags`.
/// An empty query or an empty tag selection does not filter.
pub fn filter_entries(doc: &HostsDocument, query: &str, selected_tags: &[String]) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    doc.entries
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            if query.is_empty() {
                return true;
            }
            e.domains.iter().any(|d| d.to_lowercase().contains(&query))
                || e.ip.to_lowercase().contains(&query)
                || e
                    .comment
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&query))
        })
        .filter(|(_, e)| {
            if selected_tags.is_empty() {
                return true;
            }
            let tags = e.effective_tags();
            selected_tags.iter().any(|t| tags.contains(&t.as_str()))
        })
        .map(|(i, _)| i)
        .collect()
}

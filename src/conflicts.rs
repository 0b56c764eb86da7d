//! Duplicate/conflict detection: one domain mapped to several IPs.

use std::collections::{HashMap, HashSet};

use crate::model::{DuplicateEntry, DuplicateOccurrence, HostsDocument};

/// Every lowercased domain that maps to more than one distinct IP, in order of
/// first appearance. Disabled entries count too.
pub fn detect_duplicates(doc: &HostsDocument) -> Vec<DuplicateEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashMap<String, Vec<DuplicateOccurrence>> = HashMap::new();

    for (index, entry) in doc.entries.iter().enumerate() {
        for domain in &entry.domains {
            let key = domain.to_lowercase();
            let slot = seen.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });
            slot.push(DuplicateOccurrence {
                index,
                ip: entry.ip.clone(),
            });
        }
    }

    order
        .into_iter()
        .filter_map(|domain| {
            let entries = seen.remove(&domain)?;
            let distinct: HashSet<&str> = entries.iter().map(|o| o.ip.as_str()).collect();
            (distinct.len() > 1).then_some(DuplicateEntry { domain, entries })
        })
        .collect()
}

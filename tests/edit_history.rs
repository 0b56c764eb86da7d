//! Document edits pushed through the undo/redo ring.

mod common;

use easyhosts::codec;
use easyhosts::history::{History, HISTORY_CAP};
use easyhosts::merge::{merge, MergeMode};
use easyhosts::validate::entry_from_input;
use easyhosts::{interchange, rawedit};

#[test]
fn edit_session_undo_redo() {
    let loaded = codec::decode(common::SAMPLE_HOSTS).unwrap();
    let mut history = History::starting_at(&loaded);

    let toggled = loaded.toggle_entry(4).unwrap();
    history.push(&toggled);
    let added = toggled
        .upsert_entry(None, entry_from_input("10.0.0.9", "new.test", None, Some("dev")).unwrap())
        .unwrap();
    history.push(&added);
    let removed = added.remove_entry(0).unwrap();
    history.push(&removed);

    assert_eq!(removed.sections[0].position, 1);
    assert_eq!(history.undo(), Some(added.clone()));
    assert_eq!(history.undo(), Some(toggled.clone()));
    assert_eq!(history.redo(), Some(added));
    assert_eq!(history.undo(), Some(toggled));
    assert_eq!(history.undo(), Some(loaded.clone()));
    assert!(history.undo().is_none());
    assert_eq!(history.current(), Some(&loaded));
}

#[test]
fn long_session_keeps_only_the_cap() {
    let mut doc = codec::decode(common::SAMPLE_HOSTS).unwrap();
    let first = doc.clone();
    let mut history = History::starting_at(&doc);
    for _ in 0..HISTORY_CAP {
        doc = doc.toggle_section(0).unwrap().toggle_entry(2).unwrap();
        history.push(&doc);
    }
    assert_eq!(history.len(), HISTORY_CAP);
    let mut oldest = None;
    while let Some(d) = history.undo() {
        oldest = Some(d);
    }
    // The loaded document was the 51st snapshot back and has been evicted;
    // the oldest survivor is one toggle away from it.
    let oldest = oldest.unwrap();
    assert_eq!(oldest, first.toggle_section(0).unwrap().toggle_entry(2).unwrap());
}

#[test]
fn import_and_raw_edit_are_single_steps() {
    let loaded = codec::decode(common::SAMPLE_HOSTS).unwrap();
    let mut history = History::starting_at(&loaded);

    let json = interchange::export_json(&loaded).unwrap();
    let imported = merge(&loaded, &interchange::import_json(&json).unwrap(), MergeMode::Merge);
    history.push(&imported);
    assert_eq!(imported.entries.len(), 14);

    let raw = rawedit::raw_text(&imported);
    let edited = raw.replace("10.0.0.5", "10.0.0.55");
    assert!(!rawedit::raw_diff(&raw, &edited).is_empty());
    let reapplied = rawedit::reapply(&edited).unwrap();
    history.push(&reapplied);

    assert_eq!(reapplied.entries[2].ip, "10.0.0.55");
    assert_eq!(history.undo(), Some(imported));
    assert_eq!(history.undo(), Some(loaded));
}

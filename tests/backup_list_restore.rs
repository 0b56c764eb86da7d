//! List, restore and delete backups.

mod common;

use easyhosts::platform::{FileHostsStore, HostsStore};
use easyhosts::{hosts, HostsError, ParseError};
use std::fs;

#[test]
fn list_is_newest_first_and_ignores_other_files() {
    let dir = common::temp_home();
    let hosts_path = common::write_hosts(dir.path(), "live\n");
    for (name, body) in [
        ("hosts.bak_20260101_120000", "a"),
        ("hosts.bak_20261231_235959", "bb"),
        ("hosts.bak_20261231_235959_1", "ccc"),
        ("hosts.bak_notatime", "x"),
        ("hosts.old", "x"),
    ] {
        fs::write(dir.path().join(name), body).unwrap();
    }
    let store = FileHostsStore::beside(&hosts_path);

    let backups = store.list_backups().unwrap();
    let names: Vec<&str> = backups.iter().map(|b| b.filename.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "hosts.bak_20261231_235959_1",
            "hosts.bak_20261231_235959",
            "hosts.bak_20260101_120000",
        ]
    );
    assert_eq!(backups[0].timestamp, "20261231_235959");
    assert_eq!(backups[0].size, 3);
}

#[test]
fn list_without_backup_dir_is_empty() {
    let dir = common::temp_home();
    let hosts_path = common::write_hosts(dir.path(), "live\n");
    let store = FileHostsStore::new(&hosts_path, dir.path().join("missing"));
    assert!(store.list_backups().unwrap().is_empty());
}

#[test]
fn restore_backs_up_current_content_first() {
    let dir = common::temp_home();
    let hosts_path = common::write_hosts(dir.path(), "original\n");
    let store = FileHostsStore::beside(&hosts_path);

    let first = store.write_live(b"edited\n").unwrap();
    let second = hosts::restore(&store, &first).unwrap();

    assert_eq!(fs::read_to_string(&hosts_path).unwrap(), "original\n");
    assert_eq!(fs::read_to_string(&second).unwrap(), "edited\n");
    assert_eq!(store.list_backups().unwrap().len(), 2);
}

#[test]
fn preview_decodes_backup_without_touching_live() {
    let dir = common::temp_home();
    let hosts_path = common::write_hosts(dir.path(), common::SAMPLE_HOSTS);
    let store = FileHostsStore::beside(&hosts_path);
    let backup = store.write_live(b"").unwrap();

    let doc = hosts::preview_backup(&backup).unwrap();
    assert_eq!(doc.entries.len(), 7);
    assert_eq!(fs::read_to_string(&hosts_path).unwrap(), "");
}

#[test]
fn delete_removes_only_backups() {
    let dir = common::temp_home();
    let hosts_path = common::write_hosts(dir.path(), "live\n");
    let store = FileHostsStore::beside(&hosts_path);
    let backup = store.write_live(b"next\n").unwrap();

    let err = store.delete_backup(&hosts_path).unwrap_err();
    assert!(matches!(err, HostsError::NotABackup { .. }));
    assert!(hosts_path.exists());

    store.delete_backup(&backup).unwrap();
    assert!(!backup.exists());
    assert!(store.list_backups().unwrap().is_empty());

    assert!(store.delete_backup(&backup).unwrap_err().is_not_found());
}

#[test]
fn restore_of_missing_backup_leaves_live_untouched() {
    let dir = common::temp_home();
    let hosts_path = common::write_hosts(dir.path(), "live\n");
    let store = FileHostsStore::beside(&hosts_path);

    let ghost = dir.path().join("hosts.bak_20260101_000000");
    let err = store.restore_backup(&ghost).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(fs::read_to_string(&hosts_path).unwrap(), "live\n");
    assert!(common::backup_files(dir.path()).is_empty());
}

const LATIN1_HOSTS: &[u8] = b"# caf\xe9\n127.0.0.1 a.test\n";

#[test]
fn non_utf8_live_file_is_a_parse_error() {
    let dir = common::temp_home();
    let hosts_path = dir.path().join("hosts");
    fs::write(&hosts_path, LATIN1_HOSTS).unwrap();
    let store = FileHostsStore::beside(&hosts_path);

    let err = hosts::load_document(&store).unwrap_err();
    assert!(
        matches!(err, HostsError::Parse(ParseError::InvalidUtf8 { offset: 5 })),
        "{err}"
    );
}

#[test]
fn restore_is_byte_exact_for_non_utf8_backups() {
    let dir = common::temp_home();
    let hosts_path = dir.path().join("hosts");
    fs::write(&hosts_path, LATIN1_HOSTS).unwrap();
    let store = FileHostsStore::beside(&hosts_path);

    let backup = store.write_live(b"127.0.0.1\tlocalhost\n").unwrap();
    assert_eq!(fs::read(&backup).unwrap(), LATIN1_HOSTS);

    hosts::restore(&store, &backup).unwrap();
    assert_eq!(fs::read(&hosts_path).unwrap(), LATIN1_HOSTS);
    assert_eq!(store.list_backups().unwrap().len(), 2);
}

//! End-to-end CLI flow against a temp hosts file.

mod common;

use predicates::prelude::*;
use std::fs;

#[test]
fn list_add_disable_remove() {
    let home = common::temp_home();
    let hosts = common::write_hosts(home.path(), common::SAMPLE_HOSTS);

    common::cli(home.path(), &hosts)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("api.work.test  # Staging API  [etc]"))
        .stdout(predicate::str::contains("off  10.0.0.6"));

    common::cli(home.path(), &hosts)
        .args(["add", "10.1.1.1", "svc.test", "svc2.test", "--tags", "dev,api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added entry #8"));
    assert!(fs::read_to_string(&hosts)
        .unwrap()
        .contains("10.1.1.1\tsvc.test svc2.test # [dev, api]"));

    common::cli(home.path(), &hosts)
        .args(["disable", "8"])
        .assert()
        .success();
    assert!(fs::read_to_string(&hosts)
        .unwrap()
        .contains("# 10.1.1.1\tsvc.test"));

    common::cli(home.path(), &hosts)
        .args(["remove", "8"])
        .assert()
        .success();
    assert!(!fs::read_to_string(&hosts).unwrap().contains("svc.test"));

    // One backup per write.
    assert_eq!(common::backup_files(home.path()).len(), 3);
}

#[test]
fn invalid_input_is_rejected_without_writing() {
    let home = common::temp_home();
    let hosts = common::write_hosts(home.path(), common::SAMPLE_HOSTS);

    common::cli(home.path(), &hosts)
        .args(["add", "256.1.1.1", "a.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid ip"));
    common::cli(home.path(), &hosts)
        .args(["enable", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no entry #42"));
    common::cli(home.path(), &hosts)
        .args(["add", "127.0.0.1", "a.test", "--comment", "note\n6.6.6.6 bank.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid comment"));

    assert_eq!(fs::read_to_string(&hosts).unwrap(), common::SAMPLE_HOSTS);
    assert!(common::backup_files(home.path()).is_empty());
}

#[test]
fn filter_dups_and_tags() {
    let home = common::temp_home();
    let hosts = common::write_hosts(home.path(), common::SAMPLE_HOSTS);

    common::cli(home.path(), &hosts)
        .args(["list", "--tag", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web.work.test"))
        .stdout(predicate::str::contains("api.work.test").not());

    common::cli(home.path(), &hosts)
        .arg("dups")
        .assert()
        .success()
        .stdout(predicate::str::contains("localhost: 127.0.0.1 (#1), ::1 (#2)"));

    common::cli(home.path(), &hosts)
        .arg("tags")
        .assert()
        .success()
        .stdout("web\nwork\netc\n");
}

#[test]
fn export_import_and_backup_restore() {
    let home = common::temp_home();
    let hosts = common::write_hosts(home.path(), common::SAMPLE_HOSTS);
    let export = home.path().join("export.json");

    common::cli(home.path(), &hosts)
        .args(["export", "--format", "json", "--output"])
        .arg(&export)
        .assert()
        .success();
    assert!(fs::read_to_string(&export).unwrap().contains("\"version\": 1"));

    common::cli(home.path(), &hosts)
        .arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 7 entries (merge)"));
    let doubled = easyhosts::codec::decode(&fs::read_to_string(&hosts).unwrap()).unwrap();
    assert_eq!(doubled.entries.len(), 14);

    let backups = common::backup_files(home.path());
    assert_eq!(backups.len(), 1);
    let name = backups[0].file_name().unwrap().to_str().unwrap().to_string();

    common::cli(home.path(), &hosts)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(name.as_str()));
    common::cli(home.path(), &hosts)
        .args(["backup", "restore", &name])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&hosts).unwrap(), common::SAMPLE_HOSTS);
    assert_eq!(common::backup_files(home.path()).len(), 2);

    common::cli(home.path(), &hosts)
        .args(["backup", "delete", &name])
        .assert()
        .success();
    assert_eq!(common::backup_files(home.path()).len(), 1);
}

#[test]
fn raw_apply_shows_diff() {
    let home = common::temp_home();
    let hosts = common::write_hosts(home.path(), common::SAMPLE_HOSTS);
    let raw = common::cli(home.path(), &hosts).arg("raw").output().unwrap();
    let text = String::from_utf8(raw.stdout).unwrap();
    let edited = home.path().join("edited");
    fs::write(&edited, text.replace("10.0.0.7", "10.0.0.70")).unwrap();

    common::cli(home.path(), &hosts)
        .arg("apply")
        .arg(&edited)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("-10.0.0.7\tdb.work.test"))
        .stdout(predicate::str::contains("+10.0.0.70\tdb.work.test"));
    assert_eq!(fs::read_to_string(&hosts).unwrap(), common::SAMPLE_HOSTS);

    common::cli(home.path(), &hosts)
        .arg("apply")
        .arg(&edited)
        .assert()
        .success();
    assert!(fs::read_to_string(&hosts).unwrap().contains("10.0.0.70\tdb.work.test"));
}

#[test]
fn profiles_save_activate_and_ssid_switch() {
    let home = common::temp_home();
    let hosts = common::write_hosts(home.path(), common::SAMPLE_HOSTS);

    common::cli(home.path(), &hosts)
        .args(["profile", "save", "Work", "--description", "office"])
        .assert()
        .success();

    fs::write(&hosts, "127.0.0.1\tlocalhost\n").unwrap();
    common::cli(home.path(), &hosts)
        .args(["profile", "save", "Minimal"])
        .assert()
        .success();

    common::cli(home.path(), &hosts)
        .args(["profile", "activate", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Activated profile Work"));
    let doc = easyhosts::codec::decode(&fs::read_to_string(&hosts).unwrap()).unwrap();
    assert_eq!(doc.entries.len(), 7);

    common::cli(home.path(), &hosts)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Work").and(predicate::str::contains("Minimal")))
        .stdout(predicate::str::is_match(r"(?m)^\* \S+\tWork").unwrap());

    common::cli(home.path(), &hosts)
        .args(["ssid", "set", "cafe-wifi", "Minimal"])
        .assert()
        .success();
    common::cli(home.path(), &hosts)
        .args(["ssid", "switch", "cafe-wifi"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&hosts).unwrap(), "127.0.0.1\tlocalhost\n");

    common::cli(home.path(), &hosts)
        .args(["profile", "delete", "Minimal"])
        .assert()
        .success();
    common::cli(home.path(), &hosts)
        .args(["profile", "activate", "Minimal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no profile named Minimal"));
}

#[test]
fn remote_sources_are_managed_and_validated() {
    let home = common::temp_home();
    let hosts = common::write_hosts(home.path(), common::SAMPLE_HOSTS);

    common::cli(home.path(), &hosts)
        .args(["remote", "add", "ads", "ftp://lists.test/ads"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http:// or https://"));
    common::cli(home.path(), &hosts)
        .args(["remote", "add", "ads", "https://lists.test/ads"])
        .assert()
        .success();
    common::cli(home.path(), &hosts)
        .args(["remote", "toggle", "ads"])
        .assert()
        .success()
        .stdout("ads: disabled\n");
    common::cli(home.path(), &hosts)
        .args(["remote", "apply", "ads"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("disabled"));
    common::cli(home.path(), &hosts)
        .args(["remote", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://lists.test/ads"));
    common::cli(home.path(), &hosts)
        .args(["remote", "remove", "ads"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&hosts).unwrap(), common::SAMPLE_HOSTS);
}

#[test]
fn reset_requires_confirmation() {
    let home = common::temp_home();
    let hosts = common::write_hosts(home.path(), common::SAMPLE_HOSTS);

    common::cli(home.path(), &hosts)
        .arg("reset")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert_eq!(fs::read_to_string(&hosts).unwrap(), common::SAMPLE_HOSTS);

    common::cli(home.path(), &hosts)
        .args(["reset", "--yes"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&hosts).unwrap(),
        easyhosts::platform::default_hosts_content()
    );
}

#[test]
fn missing_hosts_file_reports_not_found() {
    let home = common::temp_home();
    let hosts = home.path().join("hosts");

    common::cli(home.path(), &hosts)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

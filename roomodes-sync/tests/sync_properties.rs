//! End-to-end sync and backup behaviour against temporary directories.

use std::fs;
use std::path::Path;

use assert_fs::prelude::*;
use filetime::{set_file_mtime, FileTime};
use predicates::prelude::predicate;
use roomodes_core::{OrderingOptions, Slug};
use roomodes_sync::{
    BackupKind, BackupManager, BackupOutcome, ModeSync, RestoreSelector, SyncError, SyncRequest,
    SyncTarget, WriteResult,
};

fn write_mode(modes: &assert_fs::TempDir, slug: &str) {
    modes
        .child(format!("{slug}.yaml"))
        .write_str(&format!(
            "slug: {slug}\nname: {slug}\nroleDefinition: You are {slug}.\ngroups:\n  - read\n"
        ))
        .expect("write mode");
}

fn global_target(dir: &Path) -> SyncTarget {
    SyncTarget::Global {
        config_path: dir.join("settings").join("custom_modes.yaml"),
    }
}

// ---------------------------------------------------------------------------
// 1. The single-core-mode scenario
// ---------------------------------------------------------------------------

#[test]
fn code_mode_lands_in_global_artifact() {
    let modes = assert_fs::TempDir::new().expect("modes");
    write_mode(&modes, "code");
    let out = assert_fs::TempDir::new().expect("out");

    let report = ModeSync::new(modes.path())
        .sync(&global_target(out.path()), &SyncRequest::default())
        .expect("sync");

    assert_eq!(report.modes, vec![Slug::from("code")]);
    out.child("settings/custom_modes.yaml")
        .assert(predicate::str::starts_with("customModes:\n- slug: code\n"));
}

// ---------------------------------------------------------------------------
// 2. Idempotence
// ---------------------------------------------------------------------------

#[test]
fn second_sync_is_byte_identical_and_untouched() {
    let modes = assert_fs::TempDir::new().expect("modes");
    for slug in ["code", "ask", "docs-maintenance", "translator"] {
        write_mode(&modes, slug);
    }
    let out = assert_fs::TempDir::new().expect("out");
    let target = global_target(out.path());
    let engine = ModeSync::new(modes.path()).with_backup_root(out.path());

    let first = engine.sync(&target, &SyncRequest::default()).expect("first");
    assert!(matches!(first.write, WriteResult::Written { .. }));
    let bytes_1 = fs::read(target.output_path()).expect("read");

    let old = FileTime::from_unix_time(1_600_000_000, 0);
    set_file_mtime(target.output_path(), old).expect("set mtime");

    let second = engine.sync(&target, &SyncRequest::default()).expect("second");
    assert!(matches!(second.write, WriteResult::Unchanged { .. }));
    assert!(second.backup.is_none(), "unchanged sync must not back up");
    assert_eq!(first.digest, second.digest);
    assert_eq!(fs::read(target.output_path()).expect("read"), bytes_1);

    let mtime = FileTime::from_last_modification_time(
        &fs::metadata(target.output_path()).expect("metadata"),
    );
    assert_eq!(mtime, old);
}

// ---------------------------------------------------------------------------
// 3. Validation failure leaves the artifact alone
// ---------------------------------------------------------------------------

#[test]
fn missing_role_definition_aborts_without_touching_artifact() {
    let modes = assert_fs::TempDir::new().expect("modes");
    write_mode(&modes, "code");
    modes
        .child("broken.yaml")
        .write_str("slug: broken\nname: Broken\ngroups: [read]\n")
        .expect("write");
    let out = assert_fs::TempDir::new().expect("out");
    let target = global_target(out.path());
    out.child("settings/custom_modes.yaml")
        .write_str("customModes: []\n")
        .expect("seed");

    let err = ModeSync::new(modes.path())
        .with_backup_root(out.path())
        .sync(&target, &SyncRequest::default())
        .unwrap_err();

    match &err {
        SyncError::Validation(e) => {
            let broken = e
                .reports
                .iter()
                .find(|r| r.slug.as_str() == "broken")
                .expect("report for broken");
            assert!(broken.errors.iter().any(|m| m.contains("roleDefinition")));
            assert_eq!(e.reports.len(), 2, "every report is carried");
        }
        other => panic!("expected validation error, got {other}"),
    }
    out.child("settings/custom_modes.yaml").assert("customModes: []\n");
    out.child("cache").assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// 4. Dry run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_renders_without_writing_or_backing_up() {
    let modes = assert_fs::TempDir::new().expect("modes");
    write_mode(&modes, "code");
    let project = assert_fs::TempDir::new().expect("project");
    project.child(".roomodes").write_str("customModes: []\n").expect("seed");

    let request = SyncRequest {
        dry_run: true,
        ..SyncRequest::default()
    };
    let target = SyncTarget::Local {
        project_dir: project.path().to_path_buf(),
    };
    let report = ModeSync::new(modes.path())
        .sync(&target, &request)
        .expect("dry run");

    assert!(matches!(report.write, WriteResult::WouldWrite { .. }));
    assert!(report.rendered.contains("slug: code"));
    assert!(report.backup.is_none());
    project.child(".roomodes").assert("customModes: []\n");
    project.child("cache").assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// 5. Priority and exclusion through the engine
// ---------------------------------------------------------------------------

#[test]
fn options_flow_through_to_artifact() {
    let modes = assert_fs::TempDir::new().expect("modes");
    for slug in ["code", "ask", "translator"] {
        write_mode(&modes, slug);
    }
    let out = assert_fs::TempDir::new().expect("out");
    let request = SyncRequest {
        strategy: "alphabetical".to_owned(),
        options: OrderingOptions {
            exclude: vec![Slug::from("ask")],
            priority_first: vec![Slug::from("translator")],
            ..OrderingOptions::default()
        },
        ..SyncRequest::default()
    };
    let report = ModeSync::new(modes.path())
        .sync(&global_target(out.path()), &request)
        .expect("sync");
    assert_eq!(
        report.modes,
        vec![Slug::from("translator"), Slug::from("code")]
    );
    assert!(!report.rendered.contains("slug: ask"));
}

// ---------------------------------------------------------------------------
// 6. Backup numbering and restore
// ---------------------------------------------------------------------------

#[test]
fn numbering_skips_deleted_slots() {
    let project = assert_fs::TempDir::new().expect("project");
    project.child(".roomodes").write_str("v\n").expect("seed");
    let manager = BackupManager::new(project.path());

    let mut numbers = Vec::new();
    for _ in 0..3 {
        match manager.backup(BackupKind::Local).expect("backup") {
            BackupOutcome::Created(record) => numbers.push(record.number),
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(numbers, vec![1, 2, 3]);

    fs::remove_file(project.path().join("cache/roo_modes_local_backup/.roomodes_2"))
        .expect("delete");
    match manager.backup(BackupKind::Local).expect("backup") {
        BackupOutcome::Created(record) => assert_eq!(record.number, 4),
        other => panic!("unexpected {other:?}"),
    }
    let listed: Vec<u32> = manager
        .list(BackupKind::Local)
        .expect("list")
        .iter()
        .map(|r| r.number)
        .collect();
    assert_eq!(listed, vec![1, 3, 4]);
}

#[test]
fn restore_latest_reproduces_backup_bytes() {
    let project = assert_fs::TempDir::new().expect("project");
    let artifact = project.child(".roomodes");
    artifact.write_str("customModes:\r\n- slug: code\r\n").expect("seed");
    let manager = BackupManager::new(project.path());
    let record = match manager.backup(BackupKind::Local).expect("backup") {
        BackupOutcome::Created(record) => record,
        other => panic!("unexpected {other:?}"),
    };

    artifact.write_str("customModes: []\n").expect("overwrite");
    manager
        .restore(BackupKind::Local, &RestoreSelector::Latest)
        .expect("restore");

    assert_eq!(
        fs::read(artifact.path()).expect("read"),
        fs::read(&record.path).expect("read backup")
    );
    assert!(record.path.exists());
}

#[test]
fn global_backup_without_artifact_is_noop() {
    let project = assert_fs::TempDir::new().expect("project");
    let manager = BackupManager::new(project.path())
        .with_global_artifact(project.path().join("missing").join("custom_modes.yaml"));

    let outcome = manager.backup(BackupKind::Global).expect("backup");
    assert!(matches!(outcome, BackupOutcome::NothingToBackup { .. }));
    assert!(manager.list(BackupKind::Global).expect("list").is_empty());
    assert!(manager.list_all().expect("list all").is_empty());
}

// ---------------------------------------------------------------------------
// 7. Restricted groups in the artifact being replaced
// ---------------------------------------------------------------------------

#[test]
fn restricted_group_changes_are_warned_before_write() {
    let modes = assert_fs::TempDir::new().expect("modes");
    modes
        .child("docs.yaml")
        .write_str(
            "slug: docs\nname: Docs\nroleDefinition: r\ngroups:\n  - read\n  - - edit\n    - fileRegex: \\.md$\n      description: Markdown only\n",
        )
        .expect("write mode");
    write_mode(&modes, "tester");
    let out = assert_fs::TempDir::new().expect("out");
    let target = global_target(out.path());
    out.child("settings/custom_modes.yaml")
        .write_str(
            "customModes:\n- slug: docs\n  groups:\n  - edit:\n      fileRegex: \\.md$\n      description: Markdown only\n- slug: tester\n  groups:\n  - - edit\n    - fileRegex: _test\\.rs$\n",
        )
        .expect("seed");

    let report = ModeSync::new(modes.path())
        .sync(&target, &SyncRequest::default())
        .expect("sync");

    assert_eq!(
        report.warnings,
        vec!["mode 'tester' group 'edit': fileRegex '_test\\.rs$' will be removed".to_owned()]
    );
    out.child("settings/custom_modes.yaml")
        .assert(predicate::str::contains("description: Markdown only"));

    let again = ModeSync::new(modes.path())
        .sync(&target, &SyncRequest::default())
        .expect("second sync");
    assert!(again.warnings.is_empty(), "{:?}", again.warnings);
}

use headerfix::header::{ChangeKind, Event, ViolationKind};
use headerfix::utils::file::compile_patterns;
use headerfix::{
    ModifyAction, RecordingSink, ScanOptions, ScanSummary, Template, UnrecognizedPolicy,
    ValidateAction, process,
};
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

const TEMPLATE: &str = "Copyright @StartYear@ Example Org\n\nSPDX-License-Identifier: MIT\n";

/// A small source tree with one file per dialect.
fn create_tree() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/main")).unwrap();
    fs::create_dir_all(root.join("scripts")).unwrap();
    fs::create_dir_all(root.join("web")).unwrap();
    fs::create_dir_all(root.join(".svn")).unwrap();

    fs::write(
        root.join("src/main/App.java"),
        "/* Copyright 2004 Someone */\npackage app;\n\npublic class App {}\n",
    )
    .unwrap();
    fs::write(root.join("scripts/build"), "#!/bin/sh\nmake all\n").unwrap();
    fs::write(
        root.join("web/index.html"),
        "<?xml version=\"1.0\"?>\n<html></html>\n",
    )
    .unwrap();
    fs::write(root.join("build.properties"), "name=app\n").unwrap();
    fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G', 0, 0, 0]).unwrap();
    fs::write(root.join(".svn/entries"), "not scanned\n").unwrap();
    dir
}

fn options(unrecognized: UnrecognizedPolicy) -> ScanOptions {
    ScanOptions {
        exclude: compile_patterns(&[".svn".to_string()]),
        unrecognized,
        ..ScanOptions::default()
    }
}

fn template() -> Template {
    Template::parse(TEMPLATE).unwrap()
}

fn validate_tree(root: &Path) -> (ScanSummary, RecordingSink) {
    let mut sink = RecordingSink::new();
    let summary = process(
        root,
        &options(UnrecognizedPolicy::Halt),
        &ValidateAction::new(template(), "2020"),
        &mut sink,
        &ProgressBar::hidden(),
    )
    .expect("Scan should succeed");
    (summary, sink)
}

fn modify_tree(root: &Path, dry_run: bool) -> (ScanSummary, RecordingSink) {
    let mut sink = RecordingSink::new();
    let summary = process(
        root,
        &options(UnrecognizedPolicy::Halt),
        &ModifyAction::new(template(), "2020", dry_run),
        &mut sink,
        &ProgressBar::hidden(),
    )
    .expect("Scan should succeed");
    (summary, sink)
}

#[test]
fn test_validate_reports_every_file_without_writing() {
    let dir = create_tree();
    let before = fs::read_to_string(dir.path().join("src/main/App.java")).unwrap();

    let (summary, sink) = validate_tree(dir.path());

    assert!(!summary.halted);
    assert_eq!(summary.files_checked, 4);
    assert_eq!(summary.skipped, 1, "logo.png is skipped");
    assert_eq!(summary.excluded, 1, ".svn is pruned");
    assert_eq!(summary.violations, 4);

    let incorrect: Vec<_> = sink
        .violations()
        .filter(|event| {
            matches!(
                event,
                Event::Violation {
                    kind: ViolationKind::IncorrectText,
                    ..
                }
            )
        })
        .collect();
    assert_eq!(incorrect.len(), 1);
    assert!(incorrect[0].path().ends_with("src/main/App.java"));

    assert_eq!(
        fs::read_to_string(dir.path().join("src/main/App.java")).unwrap(),
        before
    );
}

#[test]
fn test_modify_then_rerun_is_noop() {
    let dir = create_tree();

    let (first, _) = modify_tree(dir.path(), false);
    assert!(!first.halted);
    assert_eq!(first.changes, 4);

    assert_eq!(
        fs::read_to_string(dir.path().join("src/main/App.java")).unwrap(),
        "/*\n * Copyright 2004 Example Org\n *\n * SPDX-License-Identifier: MIT\n */\npackage app;\n\npublic class App {}\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("scripts/build")).unwrap(),
        "#!/bin/sh\n# Copyright 2020 Example Org\n#\n# SPDX-License-Identifier: MIT\nmake all\n"
    );
    assert!(
        fs::read_to_string(dir.path().join("web/index.html"))
            .unwrap()
            .starts_with("<?xml version=\"1.0\"?>\n\n<!--\n  Copyright 2020 Example Org\n")
    );

    let (second, sink) = modify_tree(dir.path(), false);
    assert_eq!(second.changes, 0);
    assert!(sink.events().iter().all(|event| matches!(
        event,
        Event::Change {
            kind: ChangeKind::Unchanged,
            ..
        } | Event::Skipped { .. }
    )));

    let (after, _) = validate_tree(dir.path());
    assert_eq!(after.violations, 0);
}

#[test]
fn test_dry_run_leaves_files_untouched() {
    let dir = create_tree();
    let before = fs::read_to_string(dir.path().join("build.properties")).unwrap();

    let (summary, sink) = modify_tree(dir.path(), true);

    assert_eq!(summary.changes, 4);
    assert!(sink.events().iter().any(|event| matches!(
        event,
        Event::Change { dry_run: true, .. }
    )));
    assert_eq!(
        fs::read_to_string(dir.path().join("build.properties")).unwrap(),
        before
    );
}

#[test]
fn test_unrecognized_file_policy() {
    let dir = create_tree();
    fs::write(dir.path().join("README.adoc"), "= Readme\n").unwrap();

    let (halted, sink) = validate_tree(dir.path());
    assert!(halted.halted);
    assert!(sink.events().iter().any(|event| matches!(
        event,
        Event::Unrecognized { halted: true, .. }
    )));

    let mut sink = RecordingSink::new();
    let skipped = process(
        dir.path(),
        &options(UnrecognizedPolicy::Skip),
        &ValidateAction::new(template(), "2020"),
        &mut sink,
        &ProgressBar::hidden(),
    )
    .unwrap();
    assert!(!skipped.halted);
    assert_eq!(skipped.unrecognized, 1);
    assert_eq!(skipped.files_checked, 4);
}

#[cfg(unix)]
#[test]
fn test_read_only_file_is_reported_and_walk_continues() {
    let dir = create_tree();
    let locked = dir.path().join("build.properties");
    let mut permissions = fs::metadata(&locked).unwrap().permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&locked, permissions).unwrap();

    let (summary, sink) = modify_tree(dir.path(), false);

    assert!(!summary.halted);
    assert!(sink.events().iter().any(|event| matches!(
        event,
        Event::Change {
            kind: ChangeKind::WriteFailed,
            ..
        }
    ) && event.path() == locked));
    assert_eq!(fs::read_to_string(&locked).unwrap(), "name=app\n");
}

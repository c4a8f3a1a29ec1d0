//! Service-level impact: hooks, ignores and entrypoint matching.

mod common;

use common::*;
use ripplescope::lang::ast::{ExprKind, File, LitKind, Stmt};
use ripplescope::lang::build::SnapshotBuilder;
use ripplescope::lang::snapshot::PackageSet;
use ripplescope::lang::types::{Object, ObjectKind};
use ripplescope::project::Project;
use ripplescope::{analysis, diff, impact};
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"
version: 0.1.0
services:
  svc:
    entrypoint: cmd/svc
    ignore:
      - "*_test_only.go"
    hooks:
      - "migrations/**"
  unfiltered:
    entrypoint: cmd/svc
"#;

const MANIFEST: &str = "module modA\n\ngo 1.21\n";

fn write_project(root: &Path) {
    fs::write(root.join("ripplescope.yml"), CONFIG).unwrap();
    fs::write(root.join("go.mod"), MANIFEST).unwrap();
}

/// pkg modA (root): var X = <literal> in x_test_only.go
/// pkg modA/cmd/svc: func main() { X }
fn revision(literal: &str) -> PackageSet {
    let mut b = SnapshotBuilder::new();

    let proot = b.package("modA");
    let x_def = b.ident("X");
    let x_obj = b.object(Object {
        name: "X".to_string(),
        kind: ObjectKind::Var,
        ty: None,
        origin: None,
    });
    b.define(proot, &x_def, x_obj);
    let lit = b.expr(ExprKind::BasicLit {
        lit: LitKind::Int,
        value: literal.to_string(),
    });
    b.add_file(
        proot,
        File {
            name: "x_test_only.go".to_string(),
            decls: vec![var_decl(vec![x_def], vec![lit])],
        },
    );

    let pmain = b.package("modA/cmd/svc");
    let main_def = b.ident("main");
    let main_obj = b.object(Object {
        name: "main".to_string(),
        kind: ObjectKind::Func,
        ty: None,
        origin: None,
    });
    b.define(pmain, &main_def, main_obj);
    let x_use = b.ident("X");
    b.record_use(pmain, &x_use, x_obj);
    let x_expr = b.name_expr(x_use);
    b.add_file(
        pmain,
        File {
            name: "main.go".to_string(),
            decls: vec![func_decl(main_def, Some(block(vec![Stmt::Expr(x_expr)])))],
        },
    );

    b.finish()
}

#[test]
fn ignore_pattern_suppresses_symbol_driven_impact() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let project = Project::open(dir.path()).unwrap();

    let old_set = revision("1");
    let new_set = revision("2");
    let changes = diff::compare(
        &diff::analyze_revision(&old_set),
        &diff::analyze_revision(&new_set),
    );
    assert_eq!(changes.len(), 1, "the literal change should be detected");

    let old_info = analysis::analyze(&old_set);
    let new_info = analysis::analyze(&new_set);

    let affected = impact::affected_services(
        &project,
        &old_info,
        &new_info,
        &changes,
        &["x_test_only.go".to_string()],
    )
    .unwrap();

    // svc ignores *_test_only.go; unfiltered shares the entrypoint and
    // still sees the impact.
    assert_eq!(affected, vec!["unfiltered".to_string()]);
}

#[test]
fn hook_pattern_forces_service_inclusion_without_symbol_changes() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let project = Project::open(dir.path()).unwrap();

    // Identical revisions: no declaration-level changes at all.
    let old_set = revision("1");
    let new_set = revision("1");
    let changes = diff::compare(
        &diff::analyze_revision(&old_set),
        &diff::analyze_revision(&new_set),
    );
    assert!(changes.is_empty());

    let old_info = analysis::analyze(&old_set);
    let new_info = analysis::analyze(&new_set);

    let affected = impact::affected_services(
        &project,
        &old_info,
        &new_info,
        &changes,
        &["migrations/001.sql".to_string()],
    )
    .unwrap();

    assert_eq!(affected, vec!["svc".to_string()]);
}

#[test]
fn entrypoint_change_reports_each_service_once() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let project = Project::open(dir.path()).unwrap();

    let old_set = revision("1");
    let new_set = revision("2");
    let changes = diff::compare(
        &diff::analyze_revision(&old_set),
        &diff::analyze_revision(&new_set),
    );

    let old_info = analysis::analyze(&old_set);
    let new_info = analysis::analyze(&new_set);

    // Two changed files, one of which also trips the hook; every service
    // still appears at most once.
    let affected = impact::affected_services(
        &project,
        &old_info,
        &new_info,
        &changes,
        &[
            "migrations/001.sql".to_string(),
            "x_test_only.go".to_string(),
        ],
    )
    .unwrap();

    assert_eq!(affected, vec!["svc".to_string(), "unfiltered".to_string()]);
}

#[test]
fn file_level_report_follows_the_import_graph() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    fs::create_dir_all(dir.path().join("cmd/svc")).unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::write(
        dir.path().join("cmd/svc/main.go"),
        "package main\n\nimport (\n    \"modA/lib\"\n)\n\nfunc main() { lib.Do() }\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("lib/lib.go"),
        "package lib\n\nfunc Do() {}\n",
    )
    .unwrap();

    let mut project = Project::open(dir.path()).unwrap();
    project.parse().unwrap();

    // A change in lib affects both services through the import graph.
    let mut affected = project
        .affected_entrypoints(&["lib/lib.go".to_string()])
        .unwrap();
    affected.sort();
    assert_eq!(affected, vec!["svc".to_string(), "unfiltered".to_string()]);

    // A change in an unrelated directory affects nothing.
    assert!(project
        .affected_entrypoints(&["docs/readme.md".to_string()])
        .unwrap()
        .is_empty());

    // A change in the entrypoint package itself affects its services.
    let mut affected = project
        .affected_entrypoints(&["cmd/svc/main.go".to_string()])
        .unwrap();
    affected.sort();
    assert_eq!(affected, vec!["svc".to_string(), "unfiltered".to_string()]);
}

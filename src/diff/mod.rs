//! Declaration-level diff between two revisions.
//!
//! Each revision is analyzed into a map of Object ID -> declaration
//! record (a purely syntactic walk — no type information is needed), and
//! the two maps are compared: ids only in the new revision are `Added`,
//! ids only in the old one are `Removed`, and ids present in both are
//! `Modified` when their kind or package changed or their subtrees
//! differ structurally.

pub mod equality;

use crate::analysis::object_id::{func_or_method_name, ObjectId};
use crate::analysis::symbols::{DeclKind, DeclRef};
use crate::lang::ast::{Decl, ExprKind, Pos, Spec};
use crate::lang::snapshot::PackageSet;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Change {
    pub kind: ChangeKind,
    pub package: String,
    /// Declaration member name (e.g. `Foo` or `(*DB).Close`).
    pub member: String,
    pub decl_kind: DeclKind,
    pub id: ObjectId,
    /// `<package>/<file-basename>` of the declaration.
    pub file: String,
}

/// Top-level declarations of one revision, keyed by Object ID.
pub struct RevisionObjects<'a> {
    pub objects: BTreeMap<ObjectId, ObjectRecord<'a>>,
}

pub struct ObjectRecord<'a> {
    pub kind: DeclKind,
    pub package: String,
    pub file: String,
    pub pos: Pos,
    pub node: DeclRef<'a>,
}

/// Collects every top-level declaration of the snapshot. Declarations
/// nested inside function bodies are part of the enclosing function's
/// subtree and never produce records of their own.
pub fn analyze_revision(set: &PackageSet) -> RevisionObjects<'_> {
    let mut objects = BTreeMap::new();
    for pkg in &set.packages {
        for file in &pkg.files {
            for decl in &file.decls {
                match decl {
                    Decl::Func(f) => {
                        let Some(member) = func_or_method_name(f) else {
                            tracing::warn!(
                                package = %pkg.id,
                                func = %f.name.name,
                                "skipping declaration with unprintable receiver"
                            );
                            continue;
                        };
                        let kind = if f.recv.is_some() {
                            DeclKind::Method
                        } else {
                            DeclKind::Func
                        };
                        objects.insert(
                            ObjectId::new(&pkg.id, &file.name, &member),
                            ObjectRecord {
                                kind,
                                package: pkg.id.clone(),
                                file: file.name.clone(),
                                pos: f.pos,
                                node: DeclRef::Func(f),
                            },
                        );
                    }
                    Decl::Gen(g) => {
                        for spec in &g.specs {
                            match spec {
                                Spec::Value(vs) => {
                                    let kind = if g.keyword == crate::lang::ast::DeclKeyword::Const
                                    {
                                        DeclKind::Const
                                    } else {
                                        DeclKind::Var
                                    };
                                    for name in &vs.names {
                                        objects.insert(
                                            ObjectId::new(&pkg.id, &file.name, &name.name),
                                            ObjectRecord {
                                                kind,
                                                package: pkg.id.clone(),
                                                file: file.name.clone(),
                                                pos: name.pos,
                                                node: DeclRef::Value(vs),
                                            },
                                        );
                                    }
                                }
                                Spec::Type(ts) => {
                                    let kind =
                                        if matches!(ts.ty.kind, ExprKind::InterfaceType { .. }) {
                                            DeclKind::Interface
                                        } else {
                                            DeclKind::Type
                                        };
                                    objects.insert(
                                        ObjectId::new(&pkg.id, &file.name, &ts.name.name),
                                        ObjectRecord {
                                            kind,
                                            package: pkg.id.clone(),
                                            file: file.name.clone(),
                                            pos: ts.name.pos,
                                            node: DeclRef::Type(ts),
                                        },
                                    );
                                }
                                Spec::Import(_) => {}
                            }
                        }
                    }
                }
            }
        }
    }
    RevisionObjects { objects }
}

/// Compares two revision analyses. Output is ordered by Object ID, with
/// additions and modifications (driven by the new revision) before
/// removals (driven by the old one).
pub fn compare(old: &RevisionObjects<'_>, new: &RevisionObjects<'_>) -> Vec<Change> {
    let mut changes = Vec::new();

    for (id, new_obj) in &new.objects {
        match old.objects.get(id) {
            None => changes.push(change(ChangeKind::Added, id, new_obj)),
            Some(old_obj) => {
                let moved = old_obj.package != new_obj.package || old_obj.kind != new_obj.kind;
                if moved || !equality::decl_ref_equal(old_obj.node, new_obj.node) {
                    changes.push(change(ChangeKind::Modified, id, new_obj));
                }
            }
        }
    }

    for (id, old_obj) in &old.objects {
        if !new.objects.contains_key(id) {
            changes.push(change(ChangeKind::Removed, id, old_obj));
        }
    }

    changes
}

fn change(kind: ChangeKind, id: &ObjectId, record: &ObjectRecord<'_>) -> Change {
    Change {
        kind,
        package: record.package.clone(),
        member: id.member().to_string(),
        decl_kind: record.kind,
        id: id.clone(),
        file: format!("{}/{}", record.package, record.file),
    }
}

//! Symbol indexing: the first analysis phase.
//!
//! Walks every top-level declaration of every package and assigns it a
//! stable [`ObjectId`], keeping the type-checker object handle and a
//! borrow of the AST subtree for the later phases. Also collects the
//! per-type method sets and the interface descriptors the edge builder
//! dispatches through.
//!
//! Indexing must complete over all packages before any edge is built, so
//! forward references resolve regardless of package iteration order.

use crate::analysis::interfaces::{InterfaceInfo, MethodInfo};
use crate::analysis::object_id::{func_or_method_name, split_method_member, ObjectId};
use crate::lang::ast::{Decl, ExprKind, Field, FuncDecl, Pos, Spec, TypeSpec, ValueSpec};
use crate::lang::snapshot::{Package, PackageSet};
use crate::lang::types::ObjId;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Func,
    Method,
    Var,
    Const,
    Type,
    Interface,
}

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Func => "func",
            DeclKind::Method => "method",
            DeclKind::Var => "var",
            DeclKind::Const => "const",
            DeclKind::Type => "type",
            DeclKind::Interface => "interface",
        }
    }
}

/// Borrowed view of the declaration's AST subtree.
#[derive(Debug, Clone, Copy)]
pub enum DeclRef<'a> {
    Func(&'a FuncDecl),
    Value(&'a ValueSpec),
    Type(&'a TypeSpec),
}

#[derive(Debug, Clone)]
pub struct DeclNode<'a> {
    pub id: ObjectId,
    pub kind: DeclKind,
    pub package: String,
    pub file: String,
    pub pos: Pos,
    pub obj: ObjId,
    pub ast: DeclRef<'a>,
}

#[derive(Default)]
pub struct SymbolIndex<'a> {
    /// Every indexed top-level declaration.
    pub decls: BTreeMap<ObjectId, DeclNode<'a>>,
    /// Type-checker object -> declaration id, for `uses` lookups.
    pub by_object: HashMap<ObjId, ObjectId>,
    /// Interface descriptors (interfaces with at least one method).
    pub interfaces: BTreeMap<ObjectId, InterfaceInfo>,
    /// Type declaration id -> method name -> method declaration id.
    pub method_sets: BTreeMap<ObjectId, BTreeMap<String, ObjectId>>,
    /// Type-parameter object -> the declaration that introduces it.
    pub type_param_owner: HashMap<ObjId, ObjectId>,
    /// (package, type name) -> type declaration id, for receiver matching.
    types_by_name: HashMap<(String, String), ObjectId>,
}

impl<'a> SymbolIndex<'a> {
    pub fn decl(&self, id: &ObjectId) -> Option<&DeclNode<'a>> {
        self.decls.get(id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.decls.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Indexes every top-level declaration of the snapshot.
pub fn index_packages(set: &PackageSet) -> SymbolIndex<'_> {
    let mut index = SymbolIndex::default();
    for pkg in &set.packages {
        for file in &pkg.files {
            for decl in &file.decls {
                match decl {
                    Decl::Func(f) => index_func(&mut index, pkg, &file.name, f),
                    Decl::Gen(g) => {
                        for spec in &g.specs {
                            match spec {
                                Spec::Value(vs) => {
                                    let kind = if g.keyword == crate::lang::ast::DeclKeyword::Const {
                                        DeclKind::Const
                                    } else {
                                        DeclKind::Var
                                    };
                                    index_values(&mut index, pkg, &file.name, vs, kind);
                                }
                                Spec::Type(ts) => index_type(&mut index, pkg, &file.name, ts),
                                Spec::Import(_) => {}
                            }
                        }
                    }
                }
            }
        }
    }
    build_method_sets(&mut index);
    index
}

fn index_func<'a>(index: &mut SymbolIndex<'a>, pkg: &'a Package, file: &str, decl: &'a FuncDecl) {
    let Some(member) = func_or_method_name(decl) else {
        tracing::warn!(
            package = %pkg.id,
            func = %decl.name.name,
            "skipping declaration with unprintable receiver"
        );
        return;
    };
    let Some(&obj) = pkg.info.defs.get(&decl.name.id) else {
        tracing::debug!(package = %pkg.id, member = %member, "no defining object, skipping");
        return;
    };
    let id = ObjectId::new(&pkg.id, file, &member);
    record_type_param_owners(index, pkg, &decl.ty.type_params, &id);
    let kind = if decl.recv.is_some() {
        DeclKind::Method
    } else {
        DeclKind::Func
    };
    insert_decl(index, DeclNode {
        id,
        kind,
        package: pkg.id.clone(),
        file: file.to_string(),
        pos: decl.pos,
        obj,
        ast: DeclRef::Func(decl),
    });
}

fn index_values<'a>(
    index: &mut SymbolIndex<'a>,
    pkg: &'a Package,
    file: &str,
    spec: &'a ValueSpec,
    kind: DeclKind,
) {
    for name in &spec.names {
        let Some(&obj) = pkg.info.defs.get(&name.id) else {
            tracing::debug!(package = %pkg.id, name = %name.name, "no defining object, skipping");
            continue;
        };
        let id = ObjectId::new(&pkg.id, file, &name.name);
        insert_decl(index, DeclNode {
            id,
            kind,
            package: pkg.id.clone(),
            file: file.to_string(),
            pos: name.pos,
            obj,
            ast: DeclRef::Value(spec),
        });
    }
}

fn index_type<'a>(index: &mut SymbolIndex<'a>, pkg: &'a Package, file: &str, spec: &'a TypeSpec) {
    let Some(&obj) = pkg.info.defs.get(&spec.name.id) else {
        tracing::debug!(package = %pkg.id, name = %spec.name.name, "no defining object, skipping");
        return;
    };
    let id = ObjectId::new(&pkg.id, file, &spec.name.name);
    record_type_param_owners(index, pkg, &spec.type_params, &id);

    let kind = if let ExprKind::InterfaceType { methods } = &spec.ty.kind {
        if let Some(iface) = parse_interface(pkg, methods) {
            index.interfaces.insert(id.clone(), iface);
        }
        DeclKind::Interface
    } else {
        DeclKind::Type
    };

    index
        .types_by_name
        .insert((pkg.id.clone(), spec.name.name.clone()), id.clone());
    insert_decl(index, DeclNode {
        id,
        kind,
        package: pkg.id.clone(),
        file: file.to_string(),
        pos: spec.name.pos,
        obj,
        ast: DeclRef::Type(spec),
    });
}

fn insert_decl<'a>(index: &mut SymbolIndex<'a>, node: DeclNode<'a>) {
    index.by_object.insert(node.obj, node.id.clone());
    index.decls.insert(node.id.clone(), node);
}

fn record_type_param_owners(
    index: &mut SymbolIndex<'_>,
    pkg: &Package,
    type_params: &[Field],
    owner: &ObjectId,
) {
    for field in type_params {
        for name in &field.names {
            if let Some(&obj) = pkg.info.defs.get(&name.id) {
                index.type_param_owner.insert(obj, owner.clone());
            }
        }
    }
}

/// Interface descriptor from an interface type literal. Interfaces
/// without any method of their own are excluded from implementation
/// resolution; embedded interfaces (unnamed fields) are not expanded.
fn parse_interface(pkg: &Package, methods: &[Field]) -> Option<InterfaceInfo> {
    let mut out = BTreeMap::new();
    for field in methods {
        let [name] = field.names.as_slice() else {
            continue;
        };
        let Some(&obj) = pkg.info.defs.get(&name.id) else {
            continue;
        };
        out.insert(name.name.clone(), MethodInfo::new(obj));
    }
    if out.is_empty() {
        None
    } else {
        Some(InterfaceInfo::new(out))
    }
}

/// Groups method declarations under their receiver's type declaration.
/// The receiver is matched by package and type name, pointer marker and
/// type arguments stripped, so methods may live in any file.
fn build_method_sets(index: &mut SymbolIndex<'_>) {
    let mut method_sets: BTreeMap<ObjectId, BTreeMap<String, ObjectId>> = BTreeMap::new();
    for (id, node) in &index.decls {
        if node.kind != DeclKind::Method {
            continue;
        }
        let Some((recv, method)) = split_method_member(id.member()) else {
            tracing::warn!(id = %id, "method member name did not parse, skipping");
            continue;
        };
        let key = (node.package.clone(), recv);
        let Some(type_id) = index.types_by_name.get(&key) else {
            tracing::debug!(id = %id, "receiver type {} not declared in package", key.1);
            continue;
        };
        method_sets
            .entry(type_id.clone())
            .or_default()
            .insert(method, id.clone());
    }
    index.method_sets = method_sets;
}

//! Programmatic snapshot assembly.
//!
//! Bridge front-ends (and the test suite) use `SnapshotBuilder` to
//! construct a [`PackageSet`] without going through JSON: it hands out
//! fresh node identities, interns objects and types, and records the
//! defs/uses/types tables per package.

use crate::lang::ast::{Expr, ExprKind, Ident, NodeId, Pos};
use crate::lang::snapshot::{Package, PackageSet, TypeAndValue, TypesInfo};
use crate::lang::types::{ObjId, Object, TypeId, TypeKind, TypeTable};
use std::collections::HashMap;

/// Index of a package within the snapshot being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PkgRef(usize);

#[derive(Default)]
pub struct SnapshotBuilder {
    next_node: u32,
    table: TypeTable,
    packages: Vec<Package>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// A new identifier node with a fresh identity.
    pub fn ident(&mut self, name: &str) -> Ident {
        Ident {
            id: self.fresh_id(),
            name: name.to_string(),
            pos: Pos::default(),
        }
    }

    /// Wraps an expression kind with a fresh node identity.
    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        Expr {
            id: self.fresh_id(),
            kind,
        }
    }

    /// An identifier in expression position. The expression shares the
    /// identifier's identity, so defs/uses and types lookups agree.
    pub fn name_expr(&mut self, ident: Ident) -> Expr {
        Expr {
            id: ident.id,
            kind: ExprKind::Name(ident),
        }
    }

    pub fn intern_type(&mut self, kind: TypeKind) -> TypeId {
        self.table.intern(kind)
    }

    /// Reserves a type slot for reference cycles; fill it in with
    /// [`SnapshotBuilder::set_type`].
    pub fn reserve_type(&mut self) -> TypeId {
        self.table.reserve()
    }

    pub fn set_type(&mut self, id: TypeId, kind: TypeKind) {
        self.table.set_type(id, kind);
    }

    pub fn object(&mut self, object: Object) -> ObjId {
        self.table.add_object(object)
    }

    /// Patch an object's type after the fact (mutually recursive
    /// object/type definitions need two steps).
    pub fn set_object_type(&mut self, obj: ObjId, ty: TypeId) {
        self.table.object_mut(obj).ty = Some(ty);
    }

    pub fn package(&mut self, id: &str) -> PkgRef {
        self.packages.push(Package {
            id: id.to_string(),
            files: Vec::new(),
            info: TypesInfo {
                defs: HashMap::new(),
                uses: HashMap::new(),
                types: HashMap::new(),
            },
        });
        PkgRef(self.packages.len() - 1)
    }

    pub fn add_file(&mut self, pkg: PkgRef, file: crate::lang::ast::File) {
        self.packages[pkg.0].files.push(file);
    }

    /// Records `ident` as the defining occurrence of `obj`.
    pub fn define(&mut self, pkg: PkgRef, ident: &Ident, obj: ObjId) {
        self.packages[pkg.0].info.defs.insert(ident.id, obj);
    }

    /// Records `ident` as a use of `obj`.
    pub fn record_use(&mut self, pkg: PkgRef, ident: &Ident, obj: ObjId) {
        self.packages[pkg.0].info.uses.insert(ident.id, obj);
    }

    /// Records the type of an expression node.
    pub fn record_type(&mut self, pkg: PkgRef, node: NodeId, ty: TypeId, is_value: bool) {
        self.packages[pkg.0]
            .info
            .types
            .insert(node, TypeAndValue { ty, is_value });
    }

    pub fn finish(self) -> PackageSet {
        PackageSet {
            packages: self.packages,
            table: self.table,
        }
    }
}

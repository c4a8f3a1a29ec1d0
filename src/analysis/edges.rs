//! Dependency edge building: the third analysis phase.
//!
//! Re-walks every indexed declaration — its type signature and its body
//! or initializer — and records an edge to every project-local
//! declaration it references. Identifier references resolve through the
//! `uses` table; method calls on interface-typed receivers fan out to
//! every known implementation, since a static call site cannot pin down
//! a single one. Runs strictly after indexing and interface resolution.

use crate::analysis::graph::DependencyGraph;
use crate::analysis::object_id::{func_or_method_name, ObjectId};
use crate::analysis::symbols::SymbolIndex;
use crate::lang::ast::{
    Block, Decl, Expr, ExprKind, Field, FuncDecl, FuncType, GenDecl, Ident, Spec, Stmt, TypeSpec,
    ValueSpec,
};
use crate::lang::snapshot::{Package, PackageSet};
use crate::lang::types::{ObjectKind, TypeId, TypeKind};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct EdgeOptions {
    /// When a method call cannot be matched to a known interface (or the
    /// receiver type is not an interface at all), fan out to every
    /// interface that declares a method with the same name. Broad by
    /// design: impact analysis prefers over-reporting to missing edges.
    pub method_name_fallback: bool,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            method_name_fallback: true,
        }
    }
}

/// Builds the full edge set over the indexed declarations.
pub fn build_edges(
    set: &PackageSet,
    index: &SymbolIndex<'_>,
    graph: &mut DependencyGraph,
    opts: &EdgeOptions,
) {
    for id in index.decls.keys() {
        graph.ensure_node(id);
    }

    let mut builder = EdgeBuilder {
        set,
        index,
        graph,
        opts,
    };
    for pkg in &set.packages {
        for file in &pkg.files {
            for decl in &file.decls {
                match decl {
                    Decl::Func(f) => builder.func_decl(pkg, &file.name, f),
                    Decl::Gen(g) => {
                        for spec in &g.specs {
                            match spec {
                                Spec::Value(vs) => builder.value_spec(pkg, &file.name, vs),
                                Spec::Type(ts) => builder.type_spec(pkg, &file.name, ts),
                                Spec::Import(_) => {}
                            }
                        }
                    }
                }
            }
        }
    }
}

struct EdgeBuilder<'a, 'i, 'g> {
    set: &'a PackageSet,
    index: &'i SymbolIndex<'a>,
    graph: &'g mut DependencyGraph,
    opts: &'i EdgeOptions,
}

impl<'a, 'i, 'g> EdgeBuilder<'a, 'i, 'g> {
    // ---- per-declaration entry points ----

    fn func_decl(&mut self, pkg: &'a Package, file: &str, decl: &'a FuncDecl) {
        let Some(member) = func_or_method_name(decl) else {
            return;
        };
        let cur = ObjectId::new(&pkg.id, file, &member);
        if !self.index.contains(&cur) {
            return;
        }

        if let Some(recv) = &decl.recv {
            self.field_type_idents(&cur, pkg, recv);
        }
        for field in &decl.ty.params {
            self.field_type_idents(&cur, pkg, field);
        }
        for field in &decl.ty.results {
            self.field_type_idents(&cur, pkg, field);
        }
        self.type_param_constraints(&cur, pkg, &decl.ty.type_params);

        if let Some(body) = &decl.body {
            self.block(&cur, pkg, body);
        }
    }

    fn value_spec(&mut self, pkg: &'a Package, file: &str, spec: &'a ValueSpec) {
        for name in &spec.names {
            let cur = ObjectId::new(&pkg.id, file, &name.name);
            if !self.index.contains(&cur) {
                continue;
            }
            for value in &spec.values {
                self.expr(&cur, pkg, value);
            }
        }
    }

    fn type_spec(&mut self, pkg: &'a Package, file: &str, spec: &'a TypeSpec) {
        let cur = ObjectId::new(&pkg.id, file, &spec.name.name);
        if !self.index.contains(&cur) {
            return;
        }
        self.type_param_constraints(&cur, pkg, &spec.type_params);

        // Interface bodies contribute through dispatch, not through edges.
        if matches!(spec.ty.kind, ExprKind::InterfaceType { .. }) {
            return;
        }
        self.type_idents(&cur, pkg, &spec.ty, None);
    }

    /// Edges from a declaration to project-local types named in its type
    /// parameter constraints. The parameter's own name is excluded.
    fn type_param_constraints(&mut self, cur: &ObjectId, pkg: &Package, type_params: &[Field]) {
        for field in type_params {
            let Some(constraint) = &field.ty else {
                continue;
            };
            for name in &field.names {
                self.type_idents(cur, pkg, constraint, Some(&name.name));
            }
        }
    }

    // ---- statement walk ----

    fn block(&mut self, cur: &ObjectId, pkg: &Package, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(cur, pkg, stmt);
        }
    }

    fn stmt(&mut self, cur: &ObjectId, pkg: &Package, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => self.expr(cur, pkg, e),
            Stmt::Assign { lhs, rhs, .. } => {
                for e in lhs.iter().chain(rhs) {
                    self.expr(cur, pkg, e);
                }
            }
            Stmt::Decl(g) => self.nested_decl(cur, pkg, g),
            Stmt::Return { results } => {
                for e in results {
                    self.expr(cur, pkg, e);
                }
            }
            Stmt::If {
                init,
                cond,
                body,
                else_branch,
            } => {
                self.opt_stmt(cur, pkg, init);
                self.expr(cur, pkg, cond);
                self.block(cur, pkg, body);
                self.opt_stmt(cur, pkg, else_branch);
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.opt_stmt(cur, pkg, init);
                if let Some(cond) = cond {
                    self.expr(cur, pkg, cond);
                }
                self.opt_stmt(cur, pkg, post);
                self.block(cur, pkg, body);
            }
            Stmt::Range { key, value, x, body } => {
                if let Some(key) = key {
                    self.expr(cur, pkg, key);
                }
                if let Some(value) = value {
                    self.expr(cur, pkg, value);
                }
                self.expr(cur, pkg, x);
                self.block(cur, pkg, body);
            }
            Stmt::Switch { init, tag, cases } => {
                self.opt_stmt(cur, pkg, init);
                if let Some(tag) = tag {
                    self.expr(cur, pkg, tag);
                }
                for case in cases {
                    for e in &case.list {
                        self.expr(cur, pkg, e);
                    }
                    for s in &case.body {
                        self.stmt(cur, pkg, s);
                    }
                }
            }
            Stmt::TypeSwitch { init, assign, cases } => {
                self.opt_stmt(cur, pkg, init);
                self.stmt(cur, pkg, assign);
                for case in cases {
                    for e in &case.list {
                        self.expr(cur, pkg, e);
                    }
                    for s in &case.body {
                        self.stmt(cur, pkg, s);
                    }
                }
            }
            Stmt::Select { cases } => {
                for case in cases {
                    if let Some(comm) = &case.comm {
                        self.stmt(cur, pkg, comm);
                    }
                    for s in &case.body {
                        self.stmt(cur, pkg, s);
                    }
                }
            }
            Stmt::Labeled { label, stmt } => {
                // Labels resolve through `defs`, not `uses`.
                if let Some(&obj) = pkg.info.defs.get(&label.id) {
                    self.object_edge(cur, obj);
                }
                self.stmt(cur, pkg, stmt);
            }
            Stmt::Branch { .. } => {}
            Stmt::Block(b) => self.block(cur, pkg, b),
            Stmt::Go { call } | Stmt::Defer { call } => self.expr(cur, pkg, call),
            Stmt::Send { chan, value } => {
                self.expr(cur, pkg, chan);
                self.expr(cur, pkg, value);
            }
            Stmt::IncDec { x, .. } => self.expr(cur, pkg, x),
            Stmt::Empty => {}
        }
    }

    fn opt_stmt(&mut self, cur: &ObjectId, pkg: &Package, stmt: &Option<Box<Stmt>>) {
        if let Some(s) = stmt {
            self.stmt(cur, pkg, s);
        }
    }

    /// Declarations inside a body belong to the enclosing declaration;
    /// their subtrees are scanned as part of it.
    fn nested_decl(&mut self, cur: &ObjectId, pkg: &Package, decl: &GenDecl) {
        for spec in &decl.specs {
            match spec {
                Spec::Value(vs) => {
                    if let Some(ty) = &vs.ty {
                        self.expr(cur, pkg, ty);
                    }
                    for value in &vs.values {
                        self.expr(cur, pkg, value);
                    }
                }
                Spec::Type(ts) => self.expr(cur, pkg, &ts.ty),
                Spec::Import(_) => {}
            }
        }
    }

    // ---- expression walk ----

    fn expr(&mut self, cur: &ObjectId, pkg: &Package, e: &Expr) {
        match &e.kind {
            ExprKind::Name(ident) => self.ident_use_edge(cur, pkg, ident),
            ExprKind::Selector { x, sel } => {
                self.selector(cur, pkg, e, x, sel);
                self.expr(cur, pkg, x);
                self.ident_use_edge(cur, pkg, sel);
            }
            ExprKind::BasicLit { .. } | ExprKind::Bad => {}
            ExprKind::Call { fun, args } => {
                self.expr(cur, pkg, fun);
                for a in args {
                    self.expr(cur, pkg, a);
                }
            }
            ExprKind::Index { x, index } => {
                self.expr(cur, pkg, x);
                self.expr(cur, pkg, index);
            }
            ExprKind::Slice { x, low, high, max } => {
                self.expr(cur, pkg, x);
                for part in [low, high, max].into_iter().flatten() {
                    self.expr(cur, pkg, part);
                }
            }
            ExprKind::Star { x }
            | ExprKind::Unary { x, .. }
            | ExprKind::Paren { x } => self.expr(cur, pkg, x),
            ExprKind::Binary { x, y, .. } => {
                self.expr(cur, pkg, x);
                self.expr(cur, pkg, y);
            }
            ExprKind::TypeAssert { x, ty } => {
                self.expr(cur, pkg, x);
                if let Some(ty) = ty {
                    self.expr(cur, pkg, ty);
                }
            }
            ExprKind::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    self.expr(cur, pkg, ty);
                }
                for elt in elts {
                    self.expr(cur, pkg, elt);
                }
            }
            ExprKind::KeyValue { key, value } => {
                self.expr(cur, pkg, key);
                self.expr(cur, pkg, value);
            }
            ExprKind::FuncLit { ty, body } => {
                self.func_type(cur, pkg, ty);
                self.block(cur, pkg, body);
            }
            ExprKind::Ellipsis { elt } => {
                if let Some(elt) = elt {
                    self.expr(cur, pkg, elt);
                }
            }
            ExprKind::ArrayType { len, elt } => {
                if let Some(len) = len {
                    self.expr(cur, pkg, len);
                }
                self.expr(cur, pkg, elt);
            }
            ExprKind::MapType { key, value } => {
                self.expr(cur, pkg, key);
                self.expr(cur, pkg, value);
            }
            ExprKind::ChanType { value, .. } => self.expr(cur, pkg, value),
            ExprKind::StructType { fields } | ExprKind::InterfaceType { methods: fields } => {
                for field in fields {
                    if let Some(ty) = &field.ty {
                        self.expr(cur, pkg, ty);
                    }
                }
            }
            ExprKind::FuncTypeExpr(ft) => self.func_type(cur, pkg, ft),
        }
    }

    fn func_type(&mut self, cur: &ObjectId, pkg: &Package, ft: &FuncType) {
        for field in ft
            .type_params
            .iter()
            .chain(&ft.params)
            .chain(&ft.results)
        {
            if let Some(ty) = &field.ty {
                self.expr(cur, pkg, ty);
            }
        }
    }

    /// Method call / field access. Resolves the receiver's static type
    /// and fans interface calls out to every implementation.
    fn selector(&mut self, cur: &ObjectId, pkg: &Package, sel_expr: &Expr, x: &Expr, sel: &Ident) {
        let set = self.set;
        let index = self.index;
        let table = &set.table;

        let obj_type: TypeId = match &x.kind {
            ExprKind::Name(ident) => {
                let Some(&obj) = pkg.info.uses.get(&ident.id) else {
                    return;
                };
                let Some(ty) = table.object(obj).ty else {
                    return;
                };
                ty
            }
            // Nested selectors, calls and other compound receivers go
            // through the expression type table.
            _ => {
                let Some(tv) = pkg.info.types.get(&x.id) else {
                    return;
                };
                if !tv.is_value {
                    return;
                }
                tv.ty
            }
        };

        let method_name = sel.name.as_str();

        let mut is_iface = matches!(
            table.type_kind(table.underlying(obj_type)),
            TypeKind::Interface { .. }
        );
        if !is_iface {
            if let TypeKind::Pointer { elem } = table.type_kind(obj_type) {
                is_iface = matches!(
                    table.type_kind(table.underlying(*elem)),
                    TypeKind::Interface { .. }
                );
            }
        }

        // Generic calls: tie the call site to the declarations that
        // introduce the signature's type parameters, to any project-local
        // named types in their constraints, and to the receiver type.
        if let Some(sig) = pkg
            .info
            .types
            .get(&sel_expr.id)
            .and_then(|tv| table.signature(tv.ty))
        {
            for tp in &sig.type_params {
                if let Some(owner) = index.type_param_owner.get(tp) {
                    if owner != cur {
                        self.graph.add_dependency(cur, owner);
                    }
                }
                if let Some(TypeKind::TypeParam { constraint, .. }) =
                    table.object(*tp).ty.map(|t| table.type_kind(t))
                {
                    self.constraint_named_edges(cur, *constraint);
                }
            }
            if let Some(recv) = sig.recv {
                let recv = match table.type_kind(recv) {
                    TypeKind::Pointer { elem } => *elem,
                    _ => recv,
                };
                if let TypeKind::Named { obj, .. } = table.type_kind(recv) {
                    self.object_edge(cur, *obj);
                }
            }
        }

        if is_iface {
            // Interface call: fan out to every implementation of every
            // known interface carrying this method.
            let mut found_exact = false;
            for iface in index.interfaces.values() {
                if !iface.methods.contains_key(method_name) {
                    continue;
                }
                for impl_type in &iface.implemented_by {
                    found_exact = true;
                    if let Some(method_id) = index
                        .method_sets
                        .get(impl_type)
                        .and_then(|methods| methods.get(method_name))
                    {
                        self.graph.add_dependency(cur, method_id);
                    }
                }
            }
            if !found_exact && self.opts.method_name_fallback {
                self.method_name_fan_out(cur, method_name);
            }
        } else if self.opts.method_name_fallback {
            // The receiver type is concrete (or unknown): conservatively
            // link any interface method with a matching name.
            self.method_name_fan_out(cur, method_name);
        }
    }

    fn method_name_fan_out(&mut self, cur: &ObjectId, method_name: &str) {
        let index = self.index;
        for iface in index.interfaces.values() {
            if let Some(info) = iface.methods.get(method_name) {
                for method_id in &info.implementations {
                    self.graph.add_dependency(cur, method_id);
                }
            }
        }
    }

    /// Edges to every project-local named type reachable inside a
    /// constraint type.
    fn constraint_named_edges(&mut self, cur: &ObjectId, constraint: TypeId) {
        let table = &self.set.table;
        let mut visited: HashSet<TypeId> = HashSet::new();
        let mut stack = vec![constraint];
        let mut named = Vec::new();
        while let Some(ty) = stack.pop() {
            if !visited.insert(ty) {
                continue;
            }
            match table.type_kind(ty) {
                TypeKind::Named { obj, underlying, .. } => {
                    named.push(*obj);
                    stack.push(*underlying);
                }
                TypeKind::Pointer { elem }
                | TypeKind::Slice { elem }
                | TypeKind::Array { elem, .. }
                | TypeKind::Chan { elem, .. } => stack.push(*elem),
                TypeKind::Map { key, value } => {
                    stack.push(*key);
                    stack.push(*value);
                }
                TypeKind::Struct { fields } => stack.extend(fields.iter().map(|f| f.ty)),
                TypeKind::Interface { methods } => stack.extend(methods.values().copied()),
                TypeKind::Signature(sig) => {
                    stack.extend(sig.params.iter().chain(&sig.results).copied());
                }
                TypeKind::TypeParam { constraint, .. } => stack.push(*constraint),
                TypeKind::Basic { .. } | TypeKind::Invalid => {}
            }
        }
        for obj in named {
            self.object_edge(cur, obj);
        }
    }

    // ---- reference resolution primitives ----

    /// The plain-identifier rule: resolve through `uses`, substitute an
    /// instantiated generic function by its origin, and link if the
    /// object is a top-level declaration of this project.
    fn ident_use_edge(&mut self, cur: &ObjectId, pkg: &Package, ident: &Ident) {
        let Some(&obj) = pkg.info.uses.get(&ident.id) else {
            return;
        };
        let object = self.set.table.object(obj);
        let obj = if object.kind == ObjectKind::Func {
            object.origin.unwrap_or(obj)
        } else {
            obj
        };
        self.object_edge(cur, obj);
    }

    fn object_edge(&mut self, cur: &ObjectId, obj: crate::lang::types::ObjId) {
        if let Some(dep) = self.index.by_object.get(&obj) {
            if dep != cur {
                self.graph.add_dependency(cur, dep);
            }
        }
    }

    /// Raw identifier scan over a type expression: every identifier that
    /// resolves through `uses` to a project-local declaration produces an
    /// edge. `exclude` suppresses a constraint's own parameter name.
    fn type_idents(&mut self, cur: &ObjectId, pkg: &Package, ty: &Expr, exclude: Option<&str>) {
        let mut idents = Vec::new();
        collect_idents(ty, &mut idents);
        for ident in idents {
            if exclude.is_some_and(|name| name == ident.name) {
                continue;
            }
            if let Some(&obj) = pkg.info.uses.get(&ident.id) {
                self.object_edge(cur, obj);
            }
        }
    }

    fn field_type_idents(&mut self, cur: &ObjectId, pkg: &Package, field: &Field) {
        if let Some(ty) = &field.ty {
            self.type_idents(cur, pkg, ty, None);
        }
    }
}

/// Collects every identifier in an expression subtree, depth-first.
fn collect_idents<'e>(e: &'e Expr, out: &mut Vec<&'e Ident>) {
    match &e.kind {
        ExprKind::Name(ident) => out.push(ident),
        ExprKind::BasicLit { .. } | ExprKind::Bad => {}
        ExprKind::Selector { x, sel } => {
            collect_idents(x, out);
            out.push(sel);
        }
        ExprKind::Call { fun, args } => {
            collect_idents(fun, out);
            for a in args {
                collect_idents(a, out);
            }
        }
        ExprKind::Index { x, index } => {
            collect_idents(x, out);
            collect_idents(index, out);
        }
        ExprKind::Slice { x, low, high, max } => {
            collect_idents(x, out);
            for part in [low, high, max].into_iter().flatten() {
                collect_idents(part, out);
            }
        }
        ExprKind::Star { x } | ExprKind::Unary { x, .. } | ExprKind::Paren { x } => {
            collect_idents(x, out)
        }
        ExprKind::Binary { x, y, .. } => {
            collect_idents(x, out);
            collect_idents(y, out);
        }
        ExprKind::TypeAssert { x, ty } => {
            collect_idents(x, out);
            if let Some(ty) = ty {
                collect_idents(ty, out);
            }
        }
        ExprKind::CompositeLit { ty, elts } => {
            if let Some(ty) = ty {
                collect_idents(ty, out);
            }
            for elt in elts {
                collect_idents(elt, out);
            }
        }
        ExprKind::KeyValue { key, value } => {
            collect_idents(key, out);
            collect_idents(value, out);
        }
        ExprKind::FuncLit { ty, .. } => collect_field_idents(&ty.params, &ty.results, out),
        ExprKind::Ellipsis { elt } => {
            if let Some(elt) = elt {
                collect_idents(elt, out);
            }
        }
        ExprKind::ArrayType { len, elt } => {
            if let Some(len) = len {
                collect_idents(len, out);
            }
            collect_idents(elt, out);
        }
        ExprKind::MapType { key, value } => {
            collect_idents(key, out);
            collect_idents(value, out);
        }
        ExprKind::ChanType { value, .. } => collect_idents(value, out),
        ExprKind::StructType { fields } | ExprKind::InterfaceType { methods: fields } => {
            for field in fields {
                if let Some(ty) = &field.ty {
                    collect_idents(ty, out);
                }
            }
        }
        ExprKind::FuncTypeExpr(ft) => collect_field_idents(&ft.params, &ft.results, out),
    }
}

fn collect_field_idents<'e>(params: &'e [Field], results: &'e [Field], out: &mut Vec<&'e Ident>) {
    for field in params.iter().chain(results) {
        if let Some(ty) = &field.ty {
            collect_idents(ty, out);
        }
    }
}

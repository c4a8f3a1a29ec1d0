//! Structural equality over declaration subtrees.
//!
//! Two nodes are equal when they are the same syntactic shape with the
//! same names (by spelling), literals (by kind and lexical value) and
//! operators. Node identity and source positions never participate, so
//! reformatting or moving a declaration does not make it "modified".
//!
//! Every variant of the grammar is handled explicitly. The comparison
//! first requires both sides to be the same variant; the residual match
//! arm is therefore impossible and aborts loudly rather than guessing.

use crate::analysis::symbols::DeclRef;
use crate::lang::ast::{
    Block, CaseClause, CommClause, Expr, ExprKind, Field, FuncDecl, FuncType, GenDecl, Ident,
    ImportSpec, Spec, Stmt, TypeSpec, ValueSpec,
};
use std::mem::discriminant;

pub fn decl_ref_equal(a: DeclRef<'_>, b: DeclRef<'_>) -> bool {
    match (a, b) {
        (DeclRef::Func(x), DeclRef::Func(y)) => func_decl_equal(x, y),
        (DeclRef::Value(x), DeclRef::Value(y)) => value_spec_equal(x, y),
        (DeclRef::Type(x), DeclRef::Type(y)) => type_spec_equal(x, y),
        _ => false,
    }
}

pub fn func_decl_equal(a: &FuncDecl, b: &FuncDecl) -> bool {
    opt_equal(&a.recv, &b.recv, field_equal)
        && ident_equal(&a.name, &b.name)
        && func_type_equal(&a.ty, &b.ty)
        && opt_equal(&a.body, &b.body, block_equal)
}

pub fn value_spec_equal(a: &ValueSpec, b: &ValueSpec) -> bool {
    seq_equal(&a.names, &b.names, ident_equal)
        && opt_equal(&a.ty, &b.ty, expr_equal)
        && seq_equal(&a.values, &b.values, expr_equal)
}

pub fn type_spec_equal(a: &TypeSpec, b: &TypeSpec) -> bool {
    ident_equal(&a.name, &b.name)
        && seq_equal(&a.type_params, &b.type_params, field_equal)
        && expr_equal(&a.ty, &b.ty)
}

fn ident_equal(a: &Ident, b: &Ident) -> bool {
    a.name == b.name
}

fn field_equal(a: &Field, b: &Field) -> bool {
    seq_equal(&a.names, &b.names, ident_equal) && opt_equal(&a.ty, &b.ty, expr_equal)
}

fn func_type_equal(a: &FuncType, b: &FuncType) -> bool {
    seq_equal(&a.type_params, &b.type_params, field_equal)
        && seq_equal(&a.params, &b.params, field_equal)
        && seq_equal(&a.results, &b.results, field_equal)
}

fn block_equal(a: &Block, b: &Block) -> bool {
    seq_equal(&a.stmts, &b.stmts, stmt_equal)
}

fn gen_decl_equal(a: &GenDecl, b: &GenDecl) -> bool {
    a.keyword == b.keyword && seq_equal(&a.specs, &b.specs, spec_equal)
}

fn spec_equal(a: &Spec, b: &Spec) -> bool {
    match (a, b) {
        (Spec::Value(x), Spec::Value(y)) => value_spec_equal(x, y),
        (Spec::Type(x), Spec::Type(y)) => type_spec_equal(x, y),
        (Spec::Import(x), Spec::Import(y)) => import_spec_equal(x, y),
        _ => false,
    }
}

fn import_spec_equal(a: &ImportSpec, b: &ImportSpec) -> bool {
    a.path == b.path && opt_equal(&a.alias, &b.alias, ident_equal)
}

pub fn expr_equal(a: &Expr, b: &Expr) -> bool {
    if discriminant(&a.kind) != discriminant(&b.kind) {
        return false;
    }
    use ExprKind::*;
    match (&a.kind, &b.kind) {
        (Name(x), Name(y)) => ident_equal(x, y),
        (
            BasicLit { lit: lx, value: vx },
            BasicLit { lit: ly, value: vy },
        ) => lx == ly && vx == vy,
        (Selector { x: xx, sel: sx }, Selector { x: xy, sel: sy }) => {
            expr_equal(xx, xy) && ident_equal(sx, sy)
        }
        (Call { fun: fx, args: ax }, Call { fun: fy, args: ay }) => {
            expr_equal(fx, fy) && seq_equal(ax, ay, expr_equal)
        }
        (Index { x: xx, index: ix }, Index { x: xy, index: iy }) => {
            expr_equal(xx, xy) && expr_equal(ix, iy)
        }
        (
            Slice { x: xx, low: lx, high: hx, max: mx },
            Slice { x: xy, low: ly, high: hy, max: my },
        ) => {
            expr_equal(xx, xy)
                && opt_box_equal(lx, ly)
                && opt_box_equal(hx, hy)
                && opt_box_equal(mx, my)
        }
        (Star { x: xx }, Star { x: xy }) => expr_equal(xx, xy),
        (Unary { op: ox, x: xx }, Unary { op: oy, x: xy }) => ox == oy && expr_equal(xx, xy),
        (
            Binary { op: ox, x: xx, y: yx },
            Binary { op: oy, x: xy, y: yy },
        ) => ox == oy && expr_equal(xx, xy) && expr_equal(yx, yy),
        (Paren { x: xx }, Paren { x: xy }) => expr_equal(xx, xy),
        (TypeAssert { x: xx, ty: tx }, TypeAssert { x: xy, ty: ty_y }) => {
            expr_equal(xx, xy) && opt_box_equal(tx, ty_y)
        }
        (
            CompositeLit { ty: tx, elts: ex },
            CompositeLit { ty: ty_y, elts: ey },
        ) => opt_box_equal(tx, ty_y) && seq_equal(ex, ey, expr_equal),
        (
            KeyValue { key: kx, value: vx },
            KeyValue { key: ky, value: vy },
        ) => expr_equal(kx, ky) && expr_equal(vx, vy),
        (FuncLit { ty: tx, body: bx }, FuncLit { ty: ty_y, body: by }) => {
            func_type_equal(tx, ty_y) && block_equal(bx, by)
        }
        (Ellipsis { elt: ex }, Ellipsis { elt: ey }) => opt_box_equal(ex, ey),
        (
            ArrayType { len: lx, elt: ex },
            ArrayType { len: ly, elt: ey },
        ) => opt_box_equal(lx, ly) && expr_equal(ex, ey),
        (
            MapType { key: kx, value: vx },
            MapType { key: ky, value: vy },
        ) => expr_equal(kx, ky) && expr_equal(vx, vy),
        (
            ChanType { dir: dx, value: vx },
            ChanType { dir: dy, value: vy },
        ) => dx == dy && expr_equal(vx, vy),
        (StructType { fields: fx }, StructType { fields: fy }) => {
            seq_equal(fx, fy, field_equal)
        }
        (InterfaceType { methods: mx }, InterfaceType { methods: my }) => {
            seq_equal(mx, my, field_equal)
        }
        (FuncTypeExpr(fx), FuncTypeExpr(fy)) => func_type_equal(fx, fy),
        (Bad, Bad) => true,
        _ => unreachable!(
            "expression variants diverged after discriminant check: {:?} vs {:?}",
            a.kind, b.kind
        ),
    }
}

pub fn stmt_equal(a: &Stmt, b: &Stmt) -> bool {
    if discriminant(a) != discriminant(b) {
        return false;
    }
    use Stmt::*;
    match (a, b) {
        (Expr(x), Expr(y)) => expr_equal(x, y),
        (
            Assign { op: ox, lhs: lx, rhs: rx },
            Assign { op: oy, lhs: ly, rhs: ry },
        ) => ox == oy && seq_equal(lx, ly, expr_equal) && seq_equal(rx, ry, expr_equal),
        (Decl(x), Decl(y)) => gen_decl_equal(x, y),
        (Return { results: rx }, Return { results: ry }) => seq_equal(rx, ry, expr_equal),
        (
            If { init: ix, cond: cx, body: bx, else_branch: ex },
            If { init: iy, cond: cy, body: by, else_branch: ey },
        ) => {
            opt_box_stmt_equal(ix, iy)
                && expr_equal(cx, cy)
                && block_equal(bx, by)
                && opt_box_stmt_equal(ex, ey)
        }
        (
            For { init: ix, cond: cx, post: px, body: bx },
            For { init: iy, cond: cy, post: py, body: by },
        ) => {
            opt_box_stmt_equal(ix, iy)
                && opt_equal(cx, cy, expr_equal)
                && opt_box_stmt_equal(px, py)
                && block_equal(bx, by)
        }
        (
            Range { key: kx, value: vx, x: xx, body: bx },
            Range { key: ky, value: vy, x: xy, body: by },
        ) => {
            opt_equal(kx, ky, expr_equal)
                && opt_equal(vx, vy, expr_equal)
                && expr_equal(xx, xy)
                && block_equal(bx, by)
        }
        (
            Switch { init: ix, tag: tx, cases: cx },
            Switch { init: iy, tag: ty, cases: cy },
        ) => {
            opt_box_stmt_equal(ix, iy)
                && opt_equal(tx, ty, expr_equal)
                && seq_equal(cx, cy, case_equal)
        }
        (
            TypeSwitch { init: ix, assign: ax, cases: cx },
            TypeSwitch { init: iy, assign: ay, cases: cy },
        ) => opt_box_stmt_equal(ix, iy) && stmt_equal(ax, ay) && seq_equal(cx, cy, case_equal),
        (Select { cases: cx }, Select { cases: cy }) => seq_equal(cx, cy, comm_equal),
        (
            Labeled { label: lx, stmt: sx },
            Labeled { label: ly, stmt: sy },
        ) => ident_equal(lx, ly) && stmt_equal(sx, sy),
        (
            Branch { op: ox, label: lx },
            Branch { op: oy, label: ly },
        ) => ox == oy && opt_equal(lx, ly, ident_equal),
        (Block(x), Block(y)) => block_equal(x, y),
        (Go { call: x }, Go { call: y }) | (Defer { call: x }, Defer { call: y }) => {
            expr_equal(x, y)
        }
        (
            Send { chan: cx, value: vx },
            Send { chan: cy, value: vy },
        ) => expr_equal(cx, cy) && expr_equal(vx, vy),
        (
            IncDec { x: xx, decrement: dx },
            IncDec { x: xy, decrement: dy },
        ) => dx == dy && expr_equal(xx, xy),
        (Empty, Empty) => true,
        _ => unreachable!(
            "statement variants diverged after discriminant check: {:?} vs {:?}",
            a, b
        ),
    }
}

fn case_equal(a: &CaseClause, b: &CaseClause) -> bool {
    seq_equal(&a.list, &b.list, expr_equal) && seq_equal(&a.body, &b.body, stmt_equal)
}

fn comm_equal(a: &CommClause, b: &CommClause) -> bool {
    opt_equal(&a.comm, &b.comm, |x, y| stmt_equal(x, y)) && seq_equal(&a.body, &b.body, stmt_equal)
}

fn opt_equal<T>(a: &Option<T>, b: &Option<T>, eq: impl Fn(&T, &T) -> bool) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => eq(x, y),
        _ => false,
    }
}

fn opt_box_equal(a: &Option<Box<Expr>>, b: &Option<Box<Expr>>) -> bool {
    opt_equal(a, b, |x, y| expr_equal(x, y))
}

fn opt_box_stmt_equal(a: &Option<Box<Stmt>>, b: &Option<Box<Stmt>>) -> bool {
    opt_equal(a, b, |x, y| stmt_equal(x, y))
}

fn seq_equal<T>(a: &[T], b: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| eq(x, y))
}

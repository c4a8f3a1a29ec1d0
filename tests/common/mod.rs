#![allow(dead_code)]

use ripplescope::lang::ast::{
    Block, Decl, DeclKeyword, Expr, Field, FuncDecl, FuncType, GenDecl, Ident, Pos, Spec, Stmt,
    TypeSpec, ValueSpec,
};

pub fn empty_func_type() -> FuncType {
    FuncType {
        type_params: vec![],
        params: vec![],
        results: vec![],
    }
}

pub fn empty_block() -> Block {
    Block { stmts: vec![] }
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block { stmts }
}

/// A free function declaration with an empty signature.
pub fn func_decl(name: Ident, body: Option<Block>) -> Decl {
    func_decl_with(name, empty_func_type(), body)
}

pub fn func_decl_with(name: Ident, ty: FuncType, body: Option<Block>) -> Decl {
    Decl::Func(FuncDecl {
        name,
        recv: None,
        ty,
        body,
        pos: Pos::default(),
    })
}

/// A method declaration; `recv_ty` is the receiver type expression.
pub fn method_decl(name: Ident, recv_name: Ident, recv_ty: Expr, body: Option<Block>) -> Decl {
    Decl::Func(FuncDecl {
        name,
        recv: Some(Field {
            names: vec![recv_name],
            ty: Some(recv_ty),
        }),
        ty: empty_func_type(),
        body,
        pos: Pos::default(),
    })
}

pub fn type_decl(spec: TypeSpec) -> Decl {
    Decl::Gen(GenDecl {
        keyword: DeclKeyword::Type,
        specs: vec![Spec::Type(spec)],
    })
}

pub fn var_decl(names: Vec<Ident>, values: Vec<Expr>) -> Decl {
    Decl::Gen(GenDecl {
        keyword: DeclKeyword::Var,
        specs: vec![Spec::Value(ValueSpec {
            names,
            ty: None,
            values,
        })],
    })
}

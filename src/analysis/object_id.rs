//! Canonical identity of a top-level declaration:
//! `<package>/<file-basename>:<member>`, where `<member>` is a plain
//! identifier or `(Recv).Name` / `(*Recv).Name` for methods.
//!
//! The identity is stable across revisions as long as package path, file
//! name and declaration name stay the same.

use crate::lang::ast::{Expr, ExprKind, FuncDecl};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Builds an id from its three components. Every component must be
    /// non-empty; an empty component is a bug in the caller.
    pub fn new(package: &str, file: &str, member: &str) -> Self {
        assert!(!package.is_empty(), "object id: package is empty");
        assert!(!file.is_empty(), "object id: file is empty");
        assert!(!member.is_empty(), "object id: member is empty");
        ObjectId(format!("{}/{}:{}", package, file, member))
    }

    /// Parses an externally supplied id string (e.g. a CLI `--target`).
    pub fn parse(raw: &str) -> Option<Self> {
        let (left, member) = raw.rsplit_once(':')?;
        let (package, file) = left.rsplit_once('/')?;
        if package.is_empty() || file.is_empty() || member.is_empty() {
            return None;
        }
        Some(ObjectId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn package(&self) -> &str {
        let left = self.0.rsplit_once(':').map(|(l, _)| l).unwrap_or(&self.0);
        left.rsplit_once('/').map(|(p, _)| p).unwrap_or(left)
    }

    pub fn file(&self) -> &str {
        let left = self.0.rsplit_once(':').map(|(l, _)| l).unwrap_or(&self.0);
        left.rsplit_once('/').map(|(_, f)| f).unwrap_or("")
    }

    pub fn member(&self) -> &str {
        self.0.rsplit_once(':').map(|(_, m)| m).unwrap_or(&self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The member name of a function or method declaration: `Name` for free
/// functions, `(Recv).Name` for methods. Returns `None` when the receiver
/// type expression has a shape the printer does not understand; callers
/// log and skip such declarations.
pub fn func_or_method_name(decl: &FuncDecl) -> Option<String> {
    match &decl.recv {
        None => Some(decl.name.name.clone()),
        Some(field) => {
            let ty = field.ty.as_ref()?;
            let recv = receiver_string(ty)?;
            Some(format!("({}).{}", recv, decl.name.name))
        }
    }
}

/// Prints a receiver type expression, keeping the pointer marker and
/// generic type arguments but nothing else.
fn receiver_string(expr: &Expr) -> Option<String> {
    match &expr.kind {
        ExprKind::Name(ident) => Some(ident.name.clone()),
        ExprKind::Star { x } => Some(format!("*{}", receiver_string(x)?)),
        ExprKind::Index { x, index } => {
            Some(format!("{}[{}]", receiver_string(x)?, receiver_string(index)?))
        }
        ExprKind::Selector { x, sel } => Some(format!("{}.{}", receiver_string(x)?, sel.name)),
        ExprKind::Paren { x } => receiver_string(x),
        _ => None,
    }
}

/// Splits a method member name into receiver type name and method name.
/// The pointer marker and any generic type arguments are stripped, so
/// `(*Buffer[T]).Write` yields `("Buffer", "Write")`. Plain members
/// return `None`.
pub fn split_method_member(member: &str) -> Option<(String, String)> {
    let rest = member.strip_prefix('(')?;
    let (recv, method) = rest.split_once(").")?;
    let recv = recv.trim_start_matches('*');
    let recv = match recv.find('[') {
        Some(idx) => &recv[..idx],
        None => recv,
    };
    if recv.is_empty() || method.is_empty() {
        return None;
    }
    Some((recv.to_string(), method.to_string()))
}

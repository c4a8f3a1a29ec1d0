//! Interface-implementation resolution: the second analysis phase.
//!
//! For every declared interface with at least one method, finds the
//! project-local named types whose method set covers it with compatible
//! signatures. The compatibility check is deliberately loose around
//! generics: impact analysis would rather over-report an implementer
//! than miss one.

use crate::analysis::object_id::ObjectId;
use crate::analysis::symbols::{DeclKind, SymbolIndex};
use crate::lang::types::{ObjId, Signature, TypeKind, TypeTable};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    /// Method name -> method descriptor.
    pub methods: BTreeMap<String, MethodInfo>,
    /// Types whose method sets cover every method of this interface.
    pub implemented_by: Vec<ObjectId>,
}

impl InterfaceInfo {
    pub fn new(methods: BTreeMap<String, MethodInfo>) -> Self {
        Self {
            methods,
            implemented_by: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// The interface method's object handle (its type is the signature).
    pub obj: ObjId,
    /// Method declarations that implement this interface method, across
    /// all candidate types — including partial implementers.
    pub implementations: Vec<ObjectId>,
}

impl MethodInfo {
    pub fn new(obj: ObjId) -> Self {
        Self {
            obj,
            implementations: Vec::new(),
        }
    }
}

/// Fills `implemented_by` / `implementations` on every interface
/// descriptor in the index. Must run after indexing and before edge
/// building, so interface-call fan-out resolves.
pub fn resolve_implementations(index: &mut SymbolIndex<'_>, table: &TypeTable) {
    // Named type declarations are the implementation candidates.
    let candidates: Vec<ObjectId> = index
        .decls
        .values()
        .filter(|node| {
            matches!(node.kind, DeclKind::Type)
                && table
                    .object(node.obj)
                    .ty
                    .is_some_and(|ty| matches!(table.type_kind(ty), TypeKind::Named { .. }))
        })
        .map(|node| node.id.clone())
        .collect();

    let mut interfaces = std::mem::take(&mut index.interfaces);
    for (iface_id, iface) in interfaces.iter_mut() {
        for type_id in &candidates {
            if type_id == iface_id {
                continue;
            }
            check_candidate(index, table, iface, type_id);
        }
    }
    index.interfaces = interfaces;
}

/// Checks one candidate type against one interface. Matching methods are
/// recorded per interface method as they are found; the type is recorded
/// as an implementer only if every method matched.
fn check_candidate(
    index: &SymbolIndex<'_>,
    table: &TypeTable,
    iface: &mut InterfaceInfo,
    type_id: &ObjectId,
) {
    let mut matched = 0usize;
    let total = iface.methods.len();
    for (method_name, info) in iface.methods.iter_mut() {
        let Some(iface_sig) = object_signature(table, info.obj) else {
            continue;
        };
        let Some(method_id) = index
            .method_sets
            .get(type_id)
            .and_then(|methods| methods.get(method_name))
        else {
            return; // missing method: not an implementer
        };
        let Some(method_node) = index.decls.get(method_id) else {
            return;
        };
        let Some(cand_sig) = object_signature(table, method_node.obj) else {
            return;
        };
        if !signatures_compatible(table, iface_sig, cand_sig) {
            return;
        }
        info.implementations.push(method_id.clone());
        matched += 1;
    }
    if matched == total {
        iface.implemented_by.push(type_id.clone());
    }
}

fn object_signature(table: &TypeTable, obj: ObjId) -> Option<&Signature> {
    table.signature(table.object(obj).ty?)
}

/// Whether a candidate method signature satisfies an interface method
/// signature.
///
/// Arity (parameters, results, variadic flag) must line up exactly. When
/// the interface method involves type parameters — on the method itself
/// or on its receiver type — positions that mention a type parameter
/// (directly, or as the element/key/value of a slice, map, channel or
/// pointer, or as a named generic type) are accepted without further
/// checking. Everything else goes through plain assignability.
pub fn signatures_compatible(table: &TypeTable, iface_sig: &Signature, cand_sig: &Signature) -> bool {
    let recv_generic = iface_sig.recv.is_some_and(|recv| {
        let recv = match table.type_kind(recv) {
            TypeKind::Pointer { elem } => *elem,
            _ => recv,
        };
        table.is_generic_named(recv)
    });
    let generic = !iface_sig.type_params.is_empty() || recv_generic;

    if iface_sig.params.len() != cand_sig.params.len() {
        return false;
    }
    if iface_sig.results.len() != cand_sig.results.len() {
        return false;
    }

    for (iface_ty, cand_ty) in iface_sig
        .params
        .iter()
        .zip(&cand_sig.params)
        .chain(iface_sig.results.iter().zip(&cand_sig.results))
    {
        if generic && position_tolerated(table, *iface_ty, *cand_ty) {
            continue;
        }
        if !table.assignable_to(*cand_ty, *iface_ty) {
            return false;
        }
    }

    iface_sig.variadic == cand_sig.variadic
}

/// Generic-tolerant acceptance for a single parameter/result position.
fn position_tolerated(table: &TypeTable, iface_ty: crate::lang::types::TypeId, cand_ty: crate::lang::types::TypeId) -> bool {
    if table.is_type_param(iface_ty) {
        return true;
    }
    let elem_is_generic = |elem| table.is_type_param(elem) || table.is_generic_named(elem);
    match (table.type_kind(iface_ty), table.type_kind(cand_ty)) {
        (TypeKind::Slice { elem }, TypeKind::Slice { .. }) => elem_is_generic(*elem),
        (TypeKind::Map { key, value }, TypeKind::Map { .. }) => {
            elem_is_generic(*key) || elem_is_generic(*value)
        }
        (TypeKind::Chan { dir, elem }, TypeKind::Chan { dir: cand_dir, .. }) => {
            elem_is_generic(*elem) && dir == cand_dir
        }
        (TypeKind::Pointer { elem }, TypeKind::Pointer { .. }) => elem_is_generic(*elem),
        _ => table.is_generic_named(iface_ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ast::ChanDir;
    use crate::lang::types::{Object, ObjectKind, TypeTable};

    fn obj(table: &mut TypeTable, name: &str, kind: ObjectKind) -> ObjId {
        table.add_object(Object {
            name: name.into(),
            kind,
            ty: None,
            origin: None,
        })
    }

    fn sig(params: Vec<crate::lang::types::TypeId>, results: Vec<crate::lang::types::TypeId>) -> Signature {
        Signature {
            recv: None,
            type_params: vec![],
            params,
            results,
            variadic: false,
        }
    }

    #[test]
    fn test_identical_signatures_are_compatible() {
        let mut t = TypeTable::new();
        let int = t.intern(TypeKind::Basic { name: "int".into() });
        let a = sig(vec![int], vec![int]);
        let b = sig(vec![int], vec![int]);
        assert!(signatures_compatible(&t, &a, &b));
    }

    #[test]
    fn test_arity_mismatch_is_incompatible() {
        let mut t = TypeTable::new();
        let int = t.intern(TypeKind::Basic { name: "int".into() });
        let a = sig(vec![int], vec![]);
        let b = sig(vec![int, int], vec![]);
        assert!(!signatures_compatible(&t, &a, &b));
    }

    #[test]
    fn test_variadic_flag_must_match() {
        let mut t = TypeTable::new();
        let int = t.intern(TypeKind::Basic { name: "int".into() });
        let a = sig(vec![int], vec![]);
        let mut b = sig(vec![int], vec![]);
        b.variadic = true;
        assert!(!signatures_compatible(&t, &a, &b));
    }

    #[test]
    fn test_type_param_result_matches_anything_on_generic_receiver() {
        // interface List[T] { Get(int) T }  vs  Get(int) int on IntList
        let mut t = TypeTable::new();
        let int = t.intern(TypeKind::Basic { name: "int".into() });
        let list_obj = obj(&mut t, "List", ObjectKind::TypeName);
        let tp_obj = obj(&mut t, "T", ObjectKind::TypeParam);
        let empty = t.intern(TypeKind::Interface { methods: Default::default() });
        let tp = t.intern(TypeKind::TypeParam { obj: tp_obj, constraint: empty });
        let list = t.intern(TypeKind::Named {
            obj: list_obj,
            type_params: vec![tp_obj],
            underlying: empty,
        });
        let iface_get = Signature {
            recv: Some(list),
            type_params: vec![],
            params: vec![int],
            results: vec![tp],
            variadic: false,
        };
        let cand_get = sig(vec![int], vec![int]);
        assert!(signatures_compatible(&t, &iface_get, &cand_get));
    }

    #[test]
    fn test_generic_slice_parameter_tolerated() {
        let mut t = TypeTable::new();
        let int = t.intern(TypeKind::Basic { name: "int".into() });
        let tp_obj = obj(&mut t, "T", ObjectKind::TypeParam);
        let empty = t.intern(TypeKind::Interface { methods: Default::default() });
        let tp = t.intern(TypeKind::TypeParam { obj: tp_obj, constraint: empty });
        let tp_slice = t.intern(TypeKind::Slice { elem: tp });
        let int_slice = t.intern(TypeKind::Slice { elem: int });
        let mut iface_sig = sig(vec![tp_slice], vec![]);
        iface_sig.type_params = vec![tp_obj];
        let cand = sig(vec![int_slice], vec![]);
        assert!(signatures_compatible(&t, &iface_sig, &cand));
        // non-generic slice mismatch still fails
        let string = t.intern(TypeKind::Basic { name: "string".into() });
        let str_slice = t.intern(TypeKind::Slice { elem: string });
        let plain = sig(vec![str_slice], vec![]);
        let cand2 = sig(vec![int_slice], vec![]);
        assert!(!signatures_compatible(&t, &plain, &cand2));
    }

    #[test]
    fn test_channel_direction_must_agree() {
        let mut t = TypeTable::new();
        let tp_obj = obj(&mut t, "T", ObjectKind::TypeParam);
        let empty = t.intern(TypeKind::Interface { methods: Default::default() });
        let tp = t.intern(TypeKind::TypeParam { obj: tp_obj, constraint: empty });
        let send = t.intern(TypeKind::Chan { dir: ChanDir::Send, elem: tp });
        let int = t.intern(TypeKind::Basic { name: "int".into() });
        let recv = t.intern(TypeKind::Chan { dir: ChanDir::Recv, elem: int });
        let send_int = t.intern(TypeKind::Chan { dir: ChanDir::Send, elem: int });
        let mut iface_sig = sig(vec![send], vec![]);
        iface_sig.type_params = vec![tp_obj];
        assert!(signatures_compatible(&t, &iface_sig, &sig(vec![send_int], vec![])));
        assert!(!signatures_compatible(&t, &iface_sig, &sig(vec![recv], vec![])));
    }
}

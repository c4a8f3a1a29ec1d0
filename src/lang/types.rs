//! Semantic object and type tables, interned and shared across all
//! packages of a snapshot.
//!
//! Types reference each other by `TypeId` so that recursive definitions
//! (`type T struct { next *T }`) serialize without cycles. Objects are
//! the type-checker's symbol handles: the `defs`/`uses` tables map
//! identifier nodes to them.

use crate::lang::ast::ChanDir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    Invalid,
    Basic {
        name: String,
    },
    Named {
        obj: ObjId,
        type_params: Vec<ObjId>,
        underlying: TypeId,
    },
    Pointer {
        elem: TypeId,
    },
    Slice {
        elem: TypeId,
    },
    Array {
        len: u64,
        elem: TypeId,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan {
        dir: ChanDir,
        elem: TypeId,
    },
    Struct {
        fields: Vec<StructField>,
    },
    /// Method name -> signature type.
    Interface {
        methods: BTreeMap<String, TypeId>,
    },
    Signature(Signature),
    TypeParam {
        obj: ObjId,
        constraint: TypeId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub recv: Option<TypeId>,
    pub type_params: Vec<ObjId>,
    pub params: Vec<TypeId>,
    pub results: Vec<TypeId>,
    pub variadic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Func,
    Var,
    Const,
    TypeName,
    Label,
    TypeParam,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    pub ty: Option<TypeId>,
    /// For instantiated generic functions, the uninstantiated origin.
    pub origin: Option<ObjId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeTable {
    types: Vec<TypeKind>,
    objects: Vec<Object>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(kind);
        id
    }

    /// Reserves a slot for a type that participates in a reference cycle
    /// (e.g. a named type whose underlying type mentions it). Fill it in
    /// with [`TypeTable::set_type`].
    pub fn reserve(&mut self) -> TypeId {
        self.intern(TypeKind::Invalid)
    }

    pub fn set_type(&mut self, id: TypeId, kind: TypeKind) {
        self.types[id.0 as usize] = kind;
    }

    pub fn add_object(&mut self, object: Object) -> ObjId {
        let id = ObjId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn type_kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0 as usize]
    }

    pub fn object(&self, id: ObjId) -> &Object {
        &self.objects[id.0 as usize]
    }

    pub fn object_mut(&mut self, id: ObjId) -> &mut Object {
        &mut self.objects[id.0 as usize]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Chases `Named` links down to the underlying type.
    pub fn underlying(&self, id: TypeId) -> TypeId {
        let mut cur = id;
        // A malformed table could chain names in a loop; bail out after
        // as many hops as there are types.
        for _ in 0..=self.types.len() {
            match self.type_kind(cur) {
                TypeKind::Named { underlying, .. } => cur = *underlying,
                _ => return cur,
            }
        }
        cur
    }

    pub fn is_type_param(&self, id: TypeId) -> bool {
        matches!(self.type_kind(id), TypeKind::TypeParam { .. })
    }

    /// A named type that declares type parameters.
    pub fn is_generic_named(&self, id: TypeId) -> bool {
        matches!(self.type_kind(id), TypeKind::Named { type_params, .. } if !type_params.is_empty())
    }

    pub fn signature(&self, id: TypeId) -> Option<&Signature> {
        match self.type_kind(id) {
            TypeKind::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    /// Structural type identity. Named types are identical only when they
    /// denote the same declaration; signatures ignore receivers.
    pub fn identical(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.type_kind(a), self.type_kind(b)) {
            (TypeKind::Basic { name: x }, TypeKind::Basic { name: y }) => x == y,
            (TypeKind::Named { obj: x, .. }, TypeKind::Named { obj: y, .. }) => x == y,
            (TypeKind::TypeParam { obj: x, .. }, TypeKind::TypeParam { obj: y, .. }) => x == y,
            (TypeKind::Pointer { elem: x }, TypeKind::Pointer { elem: y })
            | (TypeKind::Slice { elem: x }, TypeKind::Slice { elem: y }) => self.identical(*x, *y),
            (TypeKind::Array { len: lx, elem: x }, TypeKind::Array { len: ly, elem: y }) => {
                lx == ly && self.identical(*x, *y)
            }
            (TypeKind::Map { key: kx, value: vx }, TypeKind::Map { key: ky, value: vy }) => {
                self.identical(*kx, *ky) && self.identical(*vx, *vy)
            }
            (TypeKind::Chan { dir: dx, elem: x }, TypeKind::Chan { dir: dy, elem: y }) => {
                dx == dy && self.identical(*x, *y)
            }
            (TypeKind::Struct { fields: fx }, TypeKind::Struct { fields: fy }) => {
                fx.len() == fy.len()
                    && fx
                        .iter()
                        .zip(fy)
                        .all(|(a, b)| a.name == b.name && self.identical(a.ty, b.ty))
            }
            (TypeKind::Interface { methods: mx }, TypeKind::Interface { methods: my }) => {
                mx.len() == my.len()
                    && mx.iter().zip(my).all(|((nx, sx), (ny, sy))| {
                        nx == ny && self.identical(*sx, *sy)
                    })
            }
            (TypeKind::Signature(sx), TypeKind::Signature(sy)) => {
                sx.variadic == sy.variadic
                    && sx.params.len() == sy.params.len()
                    && sx.results.len() == sy.results.len()
                    && sx.params.iter().zip(&sy.params).all(|(x, y)| self.identical(*x, *y))
                    && sx.results.iter().zip(&sy.results).all(|(x, y)| self.identical(*x, *y))
            }
            _ => false,
        }
    }

    /// Assignability of `src` to `dst`: identical types, interface
    /// satisfaction for interface-typed sources, or identical underlying
    /// types when at least one side is unnamed.
    pub fn assignable_to(&self, src: TypeId, dst: TypeId) -> bool {
        if self.identical(src, dst) {
            return true;
        }
        if let TypeKind::Interface { methods } = self.type_kind(self.underlying(dst)) {
            if methods.is_empty() {
                return true;
            }
            if let TypeKind::Interface { methods: have } = self.type_kind(self.underlying(src)) {
                return methods.iter().all(|(name, want)| {
                    have.get(name).is_some_and(|got| self.identical(*got, *want))
                });
            }
            return false;
        }
        let src_named = matches!(self.type_kind(src), TypeKind::Named { .. });
        let dst_named = matches!(self.type_kind(dst), TypeKind::Named { .. });
        if !(src_named && dst_named) {
            return self.identical(self.underlying(src), self.underlying(dst));
        }
        false
    }
}

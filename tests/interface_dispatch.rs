//! Interface method dispatch and implementation resolution, end to end.

mod common;

use common::*;
use ripplescope::analysis::{self, ObjectId};
use ripplescope::lang::ast::{ExprKind, Field, File, Stmt, TypeSpec};
use ripplescope::lang::build::SnapshotBuilder;
use ripplescope::lang::types::{Object, ObjectKind, Signature, TypeKind};
use std::collections::BTreeMap;

fn object(b: &mut SnapshotBuilder, name: &str, kind: ObjectKind) -> ripplescope::lang::types::ObjId {
    b.object(Object {
        name: name.to_string(),
        kind,
        ty: None,
        origin: None,
    })
}

/// pkg io: type Writer interface { Write([]byte) (int, error) }
/// pkg f:  type F struct{}; func (f F) Write([]byte) (int, error)
/// pkg c:  func call(w Writer) { w.Write(nil) }
#[test]
fn interface_call_fans_out_to_implementations() {
    let mut b = SnapshotBuilder::new();

    let int_t = b.intern_type(TypeKind::Basic { name: "int".into() });
    let byte_t = b.intern_type(TypeKind::Basic { name: "byte".into() });
    let error_t = b.intern_type(TypeKind::Basic { name: "error".into() });
    let byte_slice = b.intern_type(TypeKind::Slice { elem: byte_t });

    let write_sig = b.intern_type(TypeKind::Signature(Signature {
        recv: None,
        type_params: vec![],
        params: vec![byte_slice],
        results: vec![int_t, error_t],
        variadic: false,
    }));

    // pkg io
    let pio = b.package("modA/io");
    let writer_def = b.ident("Writer");
    let writer_obj = object(&mut b, "Writer", ObjectKind::TypeName);
    let iface_t = b.intern_type(TypeKind::Interface {
        methods: BTreeMap::from([("Write".to_string(), write_sig)]),
    });
    let writer_named = b.intern_type(TypeKind::Named {
        obj: writer_obj,
        type_params: vec![],
        underlying: iface_t,
    });
    b.set_object_type(writer_obj, writer_named);
    b.define(pio, &writer_def, writer_obj);

    let iface_write_def = b.ident("Write");
    let iface_write_obj = object(&mut b, "Write", ObjectKind::Func);
    b.set_object_type(iface_write_obj, write_sig);
    b.define(pio, &iface_write_def, iface_write_obj);

    let writer_rhs = b.expr(ExprKind::InterfaceType {
        methods: vec![Field {
            names: vec![iface_write_def],
            ty: None,
        }],
    });
    b.add_file(
        pio,
        File {
            name: "io.go".to_string(),
            decls: vec![type_decl(TypeSpec {
                name: writer_def,
                type_params: vec![],
                ty: writer_rhs,
            })],
        },
    );

    // pkg f
    let pf = b.package("modA/f");
    let f_def = b.ident("F");
    let f_obj = object(&mut b, "F", ObjectKind::TypeName);
    let struct_t = b.intern_type(TypeKind::Struct { fields: vec![] });
    let f_named = b.intern_type(TypeKind::Named {
        obj: f_obj,
        type_params: vec![],
        underlying: struct_t,
    });
    b.set_object_type(f_obj, f_named);
    b.define(pf, &f_def, f_obj);
    let f_rhs = b.expr(ExprKind::StructType { fields: vec![] });

    let f_write_def = b.ident("Write");
    let f_write_obj = object(&mut b, "Write", ObjectKind::Func);
    let f_write_sig = b.intern_type(TypeKind::Signature(Signature {
        recv: Some(f_named),
        type_params: vec![],
        params: vec![byte_slice],
        results: vec![int_t, error_t],
        variadic: false,
    }));
    b.set_object_type(f_write_obj, f_write_sig);
    b.define(pf, &f_write_def, f_write_obj);

    let recv_ty_ident = b.ident("F");
    let recv_ty = b.name_expr(recv_ty_ident);
    let recv_name = b.ident("f");

    b.add_file(
        pf,
        File {
            name: "f.go".to_string(),
            decls: vec![
                type_decl(TypeSpec {
                    name: f_def,
                    type_params: vec![],
                    ty: f_rhs,
                }),
                method_decl(f_write_def, recv_name, recv_ty, Some(empty_block())),
            ],
        },
    );

    // pkg c
    let pc = b.package("modA/c");
    let call_def = b.ident("call");
    let call_obj = object(&mut b, "call", ObjectKind::Func);
    b.define(pc, &call_def, call_obj);

    let writer_use = b.ident("Writer");
    b.record_use(pc, &writer_use, writer_obj);
    let param_ty = b.name_expr(writer_use);
    let w_param = b.ident("w");

    let w_var_obj = b.object(Object {
        name: "w".to_string(),
        kind: ObjectKind::Var,
        ty: Some(writer_named),
        origin: None,
    });
    let w_use = b.ident("w");
    b.record_use(pc, &w_use, w_var_obj);
    let recv_expr = b.name_expr(w_use);
    let write_sel = b.ident("Write");
    b.record_use(pc, &write_sel, iface_write_obj);
    let sel = b.expr(ExprKind::Selector {
        x: Box::new(recv_expr),
        sel: write_sel,
    });
    let nil_use = b.ident("nil");
    let nil_arg = b.name_expr(nil_use);
    let call_expr = b.expr(ExprKind::Call {
        fun: Box::new(sel),
        args: vec![nil_arg],
    });

    let mut fn_ty = empty_func_type();
    fn_ty.params = vec![Field {
        names: vec![w_param],
        ty: Some(param_ty),
    }];
    b.add_file(
        pc,
        File {
            name: "c.go".to_string(),
            decls: vec![func_decl_with(
                call_def,
                fn_ty,
                Some(block(vec![Stmt::Expr(call_expr)])),
            )],
        },
    );

    let set = b.finish();
    let info = analysis::analyze(&set);

    let call_id = ObjectId::new("modA/c", "c.go", "call");
    let mut direct = info.graph().direct_dependencies(&call_id);
    direct.sort();

    // Interface dispatch resolved the call to the concrete method...
    assert!(direct.contains(&ObjectId::new("modA/f", "f.go", "(F).Write")));
    // ...and the parameter type contributed an edge to the interface.
    assert!(direct.contains(&ObjectId::new("modA/io", "io.go", "Writer")));

    // Reverse view: changing the concrete method impacts the caller.
    let write_id = ObjectId::new("modA/f", "f.go", "(F).Write");
    assert_eq!(info.dependents(&write_id).unwrap(), vec![call_id]);

    // The resolver recorded F as an implementer of Writer.
    let writer_id = ObjectId::new("modA/io", "io.go", "Writer");
    let iface = &info.index().interfaces[&writer_id];
    assert_eq!(iface.implemented_by, vec![ObjectId::new("modA/f", "f.go", "F")]);
}

/// Generic interface: type List[T any] interface { Get(i int) T }
/// Concrete type:     type IntList struct{}; func (l IntList) Get(i int) int
#[test]
fn generic_interface_accepts_concrete_implementation() {
    let mut b = SnapshotBuilder::new();

    let int_t = b.intern_type(TypeKind::Basic { name: "int".into() });
    let any_t = b.intern_type(TypeKind::Interface {
        methods: BTreeMap::new(),
    });

    let plist = b.package("modA/list");

    // List[T]
    let list_def = b.ident("List");
    let list_obj = object(&mut b, "List", ObjectKind::TypeName);
    let t_def = b.ident("T");
    let t_obj = object(&mut b, "T", ObjectKind::TypeParam);
    let t_param = b.intern_type(TypeKind::TypeParam {
        obj: t_obj,
        constraint: any_t,
    });
    b.set_object_type(t_obj, t_param);

    let list_named = b.reserve_type();
    let get_sig = b.intern_type(TypeKind::Signature(Signature {
        recv: Some(list_named),
        type_params: vec![],
        params: vec![int_t],
        results: vec![t_param],
        variadic: false,
    }));
    let list_iface = b.intern_type(TypeKind::Interface {
        methods: BTreeMap::from([("Get".to_string(), get_sig)]),
    });
    b.set_type(
        list_named,
        TypeKind::Named {
            obj: list_obj,
            type_params: vec![t_obj],
            underlying: list_iface,
        },
    );
    b.set_object_type(list_obj, list_named);
    b.define(plist, &list_def, list_obj);
    b.define(plist, &t_def, t_obj);

    let get_def = b.ident("Get");
    let get_obj = object(&mut b, "Get", ObjectKind::Func);
    b.set_object_type(get_obj, get_sig);
    b.define(plist, &get_def, get_obj);

    let list_rhs = b.expr(ExprKind::InterfaceType {
        methods: vec![Field {
            names: vec![get_def],
            ty: None,
        }],
    });
    let list_spec = TypeSpec {
        name: list_def,
        type_params: vec![Field {
            names: vec![t_def],
            ty: None,
        }],
        ty: list_rhs,
    };

    // IntList
    let intlist_def = b.ident("IntList");
    let intlist_obj = object(&mut b, "IntList", ObjectKind::TypeName);
    let struct_t = b.intern_type(TypeKind::Struct { fields: vec![] });
    let intlist_named = b.intern_type(TypeKind::Named {
        obj: intlist_obj,
        type_params: vec![],
        underlying: struct_t,
    });
    b.set_object_type(intlist_obj, intlist_named);
    b.define(plist, &intlist_def, intlist_obj);
    let intlist_rhs = b.expr(ExprKind::StructType { fields: vec![] });

    let intlist_get_def = b.ident("Get");
    let intlist_get_obj = object(&mut b, "Get", ObjectKind::Func);
    let intlist_get_sig = b.intern_type(TypeKind::Signature(Signature {
        recv: Some(intlist_named),
        type_params: vec![],
        params: vec![int_t],
        results: vec![int_t],
        variadic: false,
    }));
    b.set_object_type(intlist_get_obj, intlist_get_sig);
    b.define(plist, &intlist_get_def, intlist_get_obj);

    let recv_ty_ident = b.ident("IntList");
    let recv_ty = b.name_expr(recv_ty_ident);
    let recv_name = b.ident("l");

    b.add_file(
        plist,
        File {
            name: "list.go".to_string(),
            decls: vec![
                type_decl(list_spec),
                type_decl(TypeSpec {
                    name: intlist_def,
                    type_params: vec![],
                    ty: intlist_rhs,
                }),
                method_decl(intlist_get_def, recv_name, recv_ty, Some(empty_block())),
            ],
        },
    );

    let set = b.finish();
    let info = analysis::analyze(&set);

    let list_id = ObjectId::new("modA/list", "list.go", "List");
    let iface = &info.index().interfaces[&list_id];
    assert_eq!(
        iface.implemented_by,
        vec![ObjectId::new("modA/list", "list.go", "IntList")]
    );
    assert_eq!(
        iface.methods["Get"].implementations,
        vec![ObjectId::new("modA/list", "list.go", "(IntList).Get")]
    );
}

/// A generic type's constraint contributes an edge to the constraint type.
#[test]
fn type_parameter_constraint_is_an_edge() {
    let mut b = SnapshotBuilder::new();
    let pa = b.package("modA/box");

    // type Sized interface { Size() int }
    let int_t = b.intern_type(TypeKind::Basic { name: "int".into() });
    let size_sig = b.intern_type(TypeKind::Signature(Signature {
        recv: None,
        type_params: vec![],
        params: vec![],
        results: vec![int_t],
        variadic: false,
    }));
    let sized_def = b.ident("Sized");
    let sized_obj = object(&mut b, "Sized", ObjectKind::TypeName);
    let sized_iface = b.intern_type(TypeKind::Interface {
        methods: BTreeMap::from([("Size".to_string(), size_sig)]),
    });
    let sized_named = b.intern_type(TypeKind::Named {
        obj: sized_obj,
        type_params: vec![],
        underlying: sized_iface,
    });
    b.set_object_type(sized_obj, sized_named);
    b.define(pa, &sized_def, sized_obj);
    let size_def = b.ident("Size");
    let size_obj = object(&mut b, "Size", ObjectKind::Func);
    b.set_object_type(size_obj, size_sig);
    b.define(pa, &size_def, size_obj);
    let sized_rhs = b.expr(ExprKind::InterfaceType {
        methods: vec![Field {
            names: vec![size_def],
            ty: None,
        }],
    });

    // type Box[T Sized] struct{}
    let box_def = b.ident("Box");
    let box_obj = object(&mut b, "Box", ObjectKind::TypeName);
    b.define(pa, &box_def, box_obj);
    let t_def = b.ident("T");
    let t_obj = object(&mut b, "T", ObjectKind::TypeParam);
    b.define(pa, &t_def, t_obj);
    let sized_use = b.ident("Sized");
    b.record_use(pa, &sized_use, sized_obj);
    let constraint = b.name_expr(sized_use);
    let box_rhs = b.expr(ExprKind::StructType { fields: vec![] });

    b.add_file(
        pa,
        File {
            name: "box.go".to_string(),
            decls: vec![
                type_decl(TypeSpec {
                    name: sized_def,
                    type_params: vec![],
                    ty: sized_rhs,
                }),
                type_decl(TypeSpec {
                    name: box_def,
                    type_params: vec![Field {
                        names: vec![t_def],
                        ty: Some(constraint),
                    }],
                    ty: box_rhs,
                }),
            ],
        },
    );

    let set = b.finish();
    let info = analysis::analyze(&set);

    let sized_id = ObjectId::new("modA/box", "box.go", "Sized");
    assert_eq!(
        info.dependents(&sized_id).unwrap(),
        vec![ObjectId::new("modA/box", "box.go", "Box")]
    );
}

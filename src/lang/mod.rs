//! Model of the analyzed language as exported by the toolchain bridge:
//! syntax trees (`ast`), the semantic object/type tables (`types`), and
//! the typed snapshot tying them together (`snapshot`). `build` offers a
//! programmatic snapshot assembler used by bridge front-ends and tests.

pub mod ast;
pub mod build;
pub mod snapshot;
pub mod types;

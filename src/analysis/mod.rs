//! The semantic reverse-dependency engine.
//!
//! One analysis pass over one typed snapshot, in three strictly ordered
//! phases: symbol indexing, interface-implementation resolution, then
//! dependency edge building. The result is immutable; queries are pure
//! reads. Within a phase, iteration order over packages and declarations
//! does not affect the final graph — the edge set is a set.

pub mod edges;
pub mod graph;
pub mod interfaces;
pub mod object_id;
pub mod symbols;

pub use edges::EdgeOptions;
pub use object_id::ObjectId;
pub use symbols::{DeclKind, DeclNode, DeclRef, SymbolIndex};

use crate::error::{Result, RipplescopeError};
use crate::lang::snapshot::PackageSet;
use graph::DependencyGraph;

/// The frozen result of one analysis pass.
pub struct DependencyInfo<'a> {
    index: SymbolIndex<'a>,
    graph: DependencyGraph,
}

/// Analyzes a snapshot with default edge options.
pub fn analyze(set: &PackageSet) -> DependencyInfo<'_> {
    analyze_with(set, &EdgeOptions::default())
}

pub fn analyze_with<'a>(set: &'a PackageSet, opts: &EdgeOptions) -> DependencyInfo<'a> {
    let mut index = symbols::index_packages(set);
    interfaces::resolve_implementations(&mut index, &set.table);
    let mut graph = DependencyGraph::new();
    edges::build_edges(set, &index, &mut graph, opts);
    tracing::debug!(
        declarations = index.len(),
        edges = graph.edge_count(),
        "analysis pass complete"
    );
    DependencyInfo { index, graph }
}

impl<'a> DependencyInfo<'a> {
    pub fn index(&self) -> &SymbolIndex<'a> {
        &self.index
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn decl(&self, id: &ObjectId) -> Option<&DeclNode<'a>> {
        self.index.decl(id)
    }

    /// Every declaration that transitively depends on `target`.
    /// Unknown targets are reported as [`RipplescopeError::UnknownTarget`].
    pub fn dependents(&self, target: &ObjectId) -> Result<Vec<ObjectId>> {
        if !self.index.contains(target) {
            return Err(RipplescopeError::UnknownTarget(target.as_str().to_string()));
        }
        self.graph.dependents(target)
    }
}

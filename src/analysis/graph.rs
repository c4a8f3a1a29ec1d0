//! The declaration dependency graph.
//!
//! An edge `u -> v` means "u references v". Both directions are queried
//! off the same topology: forward along outgoing edges, reverse along
//! incoming ones, so the two views cannot drift apart. Edge insertion is
//! idempotent and self-loops are dropped at the door — this is the only
//! way edges enter the graph.

use crate::analysis::object_id::ObjectId;
use crate::error::{Result, RipplescopeError};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct DependencyGraph {
    topology: StableDiGraph<ObjectId, ()>,
    node_index: HashMap<ObjectId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration as a graph node.
    pub fn ensure_node(&mut self, id: &ObjectId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.topology.add_node(id.clone());
        self.node_index.insert(id.clone(), idx);
        idx
    }

    /// Adds the edge `from -> to`. Self-references are silently dropped;
    /// duplicate edges collapse into one.
    pub fn add_dependency(&mut self, from: &ObjectId, to: &ObjectId) {
        if from == to {
            return;
        }
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        if self.topology.find_edge(from_idx, to_idx).is_none() {
            self.topology.add_edge(from_idx, to_idx, ());
        }
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.topology.edge_count()
    }

    /// Declarations `target` directly references.
    pub fn direct_dependencies(&self, target: &ObjectId) -> Vec<ObjectId> {
        self.neighbors(target, Direction::Outgoing)
    }

    /// Declarations that directly reference `target`.
    pub fn direct_dependents(&self, target: &ObjectId) -> Vec<ObjectId> {
        self.neighbors(target, Direction::Incoming)
    }

    fn neighbors(&self, target: &ObjectId, dir: Direction) -> Vec<ObjectId> {
        let Some(&idx) = self.node_index.get(target) else {
            return Vec::new();
        };
        self.topology
            .neighbors_directed(idx, dir)
            .map(|n| self.topology[n].clone())
            .collect()
    }

    /// Every declaration that transitively depends on `target`, in
    /// unspecified order. The target itself is never part of the result,
    /// cycles included. Unknown targets are a query error, not a panic;
    /// a known target nobody references yields an empty set.
    pub fn dependents(&self, target: &ObjectId) -> Result<Vec<ObjectId>> {
        let Some(&start) = self.node_index.get(target) else {
            return Err(RipplescopeError::UnknownTarget(target.as_str().to_string()));
        };

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        visited.insert(start);
        let mut stack: Vec<NodeIndex> = vec![start];
        let mut out = Vec::new();
        while let Some(idx) = stack.pop() {
            for pred in self.topology.neighbors_directed(idx, Direction::Incoming) {
                if visited.insert(pred) {
                    out.push(self.topology[pred].clone());
                    stack.push(pred);
                }
            }
        }
        Ok(out)
    }
}

//! # Ripplescope
//!
//! Declaration-level change-impact analysis for multi-package projects.
//!
//! Ripplescope consumes a typed snapshot of a project (packages with
//! parsed syntax trees and type-check tables, produced by an external
//! toolchain bridge), assigns every top-level declaration a stable
//! object id, and builds a reverse-dependency graph over them — with
//! interface method calls fanned out to every compatible implementation,
//! so impact is over-reported rather than missed. A structural AST diff
//! between two revisions then yields the set of changed declarations,
//! and the reverse graph maps those onto the service entrypoints that
//! must be rebuilt or retested.
//!
//! ## Pipeline
//!
//! 1. [`lang::snapshot`] — the typed snapshot contract (consumed).
//! 2. [`analysis::symbols`] — symbol indexing.
//! 3. [`analysis::interfaces`] — interface-implementation resolution.
//! 4. [`analysis::edges`] — dependency edge building.
//! 5. [`analysis::graph`] — the reverse-dependency query.
//! 6. [`diff`] — structural declaration diff between revisions.
//! 7. [`impact`] — mapping changes onto service entrypoints.
//!
//! The whole pass is a single-threaded batch; results are immutable and
//! queries are pure reads.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod impact;
pub mod lang;
pub mod logging;
pub mod project;
pub mod tools;

pub use analysis::{analyze, analyze_with, DependencyInfo, EdgeOptions, ObjectId};
pub use error::{Result, RipplescopeError};

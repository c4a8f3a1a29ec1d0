//! The typed snapshot the engine consumes: every package's syntax trees
//! plus the type-check tables, with objects and types interned in shared
//! tables.
//!
//! Snapshots are produced outside this crate — a toolchain bridge runs
//! the real compiler front-end and serializes the result as JSON — or
//! assembled in process through [`crate::lang::build::SnapshotBuilder`].
//! A snapshot missing any of the required tables fails validation, which
//! is fatal for the analysis (a partial loader cannot be worked around).

use crate::error::{Result, RipplescopeError};
use crate::lang::ast::{File, NodeId};
use crate::lang::types::{ObjId, TypeId, TypeTable};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSet {
    pub packages: Vec<Package>,
    pub table: TypeTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Fully qualified package path, module name included.
    pub id: String,
    pub files: Vec<File>,
    pub info: TypesInfo,
}

/// Type-check results for one package, keyed by syntax node identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesInfo {
    /// Defining identifier -> declared object.
    pub defs: HashMap<NodeId, ObjId>,
    /// Referring identifier -> referenced object.
    pub uses: HashMap<NodeId, ObjId>,
    /// Expression -> its type (and whether it denotes a value).
    pub types: HashMap<NodeId, TypeAndValue>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypeAndValue {
    pub ty: TypeId,
    pub is_value: bool,
}

impl PackageSet {
    pub fn from_json(content: &str) -> Result<Self> {
        let set: PackageSet = serde_json::from_str(content)
            .map_err(|e| RipplescopeError::PackageLoad(e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    /// Runs the configured toolchain bridge in `dir` and decodes its
    /// stdout as a snapshot.
    pub fn from_loader_command(command: &str, dir: &Path) -> Result<Self> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(dir)
            .output()
            .map_err(|e| RipplescopeError::PackageLoad(format!("loader command: {}", e)))?;
        if !output.status.success() {
            return Err(RipplescopeError::PackageLoad(format!(
                "loader command failed in {}: {}",
                dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| RipplescopeError::PackageLoad(e.to_string()))?;
        Self::from_json(&stdout)
    }

    /// Rejects snapshots the engine cannot analyze soundly: duplicate or
    /// empty package ids, unnamed files, and table references pointing
    /// outside the object/type tables.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for pkg in &self.packages {
            if pkg.id.is_empty() {
                return Err(RipplescopeError::PackageLoad(
                    "package with empty id".to_string(),
                ));
            }
            if !seen.insert(&pkg.id) {
                return Err(RipplescopeError::PackageLoad(format!(
                    "duplicate package id {}",
                    pkg.id
                )));
            }
            for file in &pkg.files {
                if file.name.is_empty() {
                    return Err(RipplescopeError::PackageLoad(format!(
                        "package {} contains an unnamed file",
                        pkg.id
                    )));
                }
            }
            for obj in pkg.info.defs.values().chain(pkg.info.uses.values()) {
                self.check_obj(&pkg.id, *obj)?;
            }
            for tv in pkg.info.types.values() {
                self.check_type(&pkg.id, tv.ty)?;
            }
        }
        Ok(())
    }

    fn check_obj(&self, pkg: &str, obj: ObjId) -> Result<()> {
        if (obj.0 as usize) < self.table.object_count() {
            Ok(())
        } else {
            Err(RipplescopeError::PackageLoad(format!(
                "package {} references unknown object #{}",
                pkg, obj.0
            )))
        }
    }

    fn check_type(&self, pkg: &str, ty: TypeId) -> Result<()> {
        if (ty.0 as usize) < self.table.type_count() {
            Ok(())
        } else {
            Err(RipplescopeError::PackageLoad(format!(
                "package {} references unknown type #{}",
                pkg, ty.0
            )))
        }
    }
}

//! Project model: configuration + module manifest + the file-level
//! package import graph.
//!
//! This is the syntax-only sibling of the semantic engine: it scans
//! import declarations (no type checking) and answers which service
//! entrypoints transitively import the package a changed file lives in.

pub mod imports;
pub mod manifest;

use crate::config::{normalize_entrypoint, Config, Service};
use crate::error::{Result, RipplescopeError};
use crate::tools::path::FilePath;
use ignore::WalkBuilder;
use manifest::ModuleManifest;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

pub struct Project {
    root: PathBuf,
    pub config: Config,
    pub module: ModuleManifest,
    /// Entrypoint package (relative path) -> service names. Several
    /// services may share one entrypoint.
    entrypoints: BTreeMap<String, Vec<String>>,
    /// Package (relative path) -> services whose import closure contains it.
    dependencies: HashMap<String, Vec<String>>,
    /// Number of source files seen by the last parse.
    pub file_count: usize,
    parsed: bool,
}

impl Project {
    /// Load configuration and module manifest from `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RipplescopeError::Project(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let config = Config::discover(&root)?;

        let manifest_path = match &config.manifest {
            Some(p) => {
                let p = Path::new(p);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    root.join(p)
                }
            }
            None => root.join("go.mod"),
        };
        let module = manifest::parse_manifest(&manifest_path)?;

        let mut entrypoints: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for svc in config.services.values() {
            entrypoints
                .entry(normalize_entrypoint(&svc.entrypoint))
                .or_default()
                .push(svc.name.clone());
        }

        Ok(Self {
            root,
            config,
            module,
            entrypoints,
            dependencies: HashMap::new(),
            file_count: 0,
            parsed: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.config.services.values()
    }

    /// Fully qualified package path of a service entrypoint.
    pub fn entrypoint_package(&self, svc: &Service) -> String {
        let rel = normalize_entrypoint(&svc.entrypoint);
        if rel.is_empty() || rel == "." {
            self.module.name.clone()
        } else {
            format!("{}/{}", self.module.name, rel)
        }
    }

    /// Hook patterns that apply to a service: its own plus project-wide ones.
    pub fn hook_patterns<'a>(&'a self, svc: &'a Service) -> impl Iterator<Item = &'a str> {
        svc.hooks
            .iter()
            .chain(self.config.hooks.iter())
            .map(String::as_str)
    }

    /// Scan the tree and build the package import graph.
    pub fn parse(&mut self) -> Result<()> {
        let paths: Vec<PathBuf> = WalkBuilder::new(&self.root)
            .git_ignore(true)
            .hidden(false)
            .build()
            .filter_map(|entry| match entry {
                Ok(e) if e.file_type().is_some_and(|ft| ft.is_file()) => Some(e.into_path()),
                _ => None,
            })
            .filter(|p| p.extension().is_some_and(|ext| ext == "go"))
            .collect();

        self.file_count = paths.len();

        // (package rel path, imported package rel paths) per file
        let module_name = self.module.name.clone();
        let root = self.root.clone();
        let scanned: Vec<(String, Vec<String>)> = paths
            .par_iter()
            .filter_map(|path| {
                let source = std::fs::read_to_string(path).ok()?;
                let rel = FilePath::new(path.clone()).rel(&root)?;
                let pkg = rel.dir().to_string();
                let local_imports = imports::scan_imports(&source)
                    .into_iter()
                    .filter_map(|imp| module_local(&module_name, &imp))
                    .collect();
                Some((pkg, local_imports))
            })
            .collect();

        let mut graph: HashMap<String, HashSet<String>> = HashMap::new();
        for (pkg, imported) in scanned {
            let entry = graph.entry(pkg).or_default();
            entry.extend(imported);
        }
        // Imported packages may have no scanned files of their own yet
        let imported_only: Vec<String> = graph
            .values()
            .flatten()
            .filter(|p| !graph.contains_key(*p))
            .cloned()
            .collect();
        for pkg in imported_only {
            graph.entry(pkg).or_default();
        }

        for entrypoint in self.entrypoints.keys() {
            if !graph.contains_key(entrypoint) {
                return Err(RipplescopeError::Project(format!(
                    "entrypoint {} does not exist",
                    entrypoint
                )));
            }
        }

        self.dependencies = self.walk_entrypoints(&graph);
        self.parsed = true;
        Ok(())
    }

    /// For every entrypoint, collect its transitive import closure
    /// (including the entrypoint package itself) and invert the relation.
    fn walk_entrypoints(&self, graph: &HashMap<String, HashSet<String>>) -> HashMap<String, Vec<String>> {
        let mut dependencies: HashMap<String, Vec<String>> = HashMap::new();
        for (entrypoint, services) in &self.entrypoints {
            let mut reached = HashSet::new();
            let mut stack = vec![entrypoint.clone()];
            while let Some(pkg) = stack.pop() {
                if !reached.insert(pkg.clone()) {
                    continue;
                }
                if let Some(imports) = graph.get(&pkg) {
                    stack.extend(imports.iter().cloned());
                }
            }
            for pkg in reached {
                dependencies.entry(pkg).or_default().extend(services.iter().cloned());
            }
        }
        dependencies
    }

    /// Services affected by the given changed files, each reported once,
    /// in discovery order. Hook patterns force-include a service; ignore
    /// patterns exempt a file from contributing impact.
    pub fn affected_entrypoints(&self, changed: &[String]) -> Result<Vec<String>> {
        if !self.parsed {
            return Err(RipplescopeError::Project("project not parsed".to_string()));
        }

        let mut processed = HashSet::new();
        let mut result = Vec::new();
        for file in changed {
            if file.is_empty() {
                continue;
            }
            let path = FilePath::new(file);

            for svc in self.config.services.values() {
                if self.hook_patterns(svc).any(|h| path.matches(h))
                    && processed.insert(svc.name.clone())
                {
                    result.push(svc.name.clone());
                }
            }

            let file_pkg = path.dir().to_string();
            if let Some(services) = self.dependencies.get(&file_pkg) {
                'affected: for service in services {
                    let svc = &self.config.services[service];
                    for ignore in &svc.ignore {
                        if path.matches(ignore) {
                            continue 'affected;
                        }
                    }
                    if processed.insert(service.clone()) {
                        result.push(service.clone());
                    }
                }
            }
        }
        Ok(result)
    }

    /// Human-readable per-file impact report.
    pub fn report_impact(&self, changed: &[String]) {
        if !self.parsed {
            println!("project not parsed");
            return;
        }
        for file in changed {
            if file.is_empty() {
                continue;
            }
            let file_pkg = FilePath::new(file).dir().to_string();
            if let Some(services) = self.dependencies.get(&file_pkg) {
                println!("{} (package {}) may affect:", file, file_pkg);
                for service in services {
                    println!("    - {}", service);
                }
            }
        }
    }
}

/// Maps a module-local import path to its project-relative package path.
/// Standard library and third-party imports return `None`.
fn module_local(module: &str, import: &str) -> Option<String> {
    if import == module {
        return Some(".".to_string());
    }
    import
        .strip_prefix(&format!("{}/", module))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_local() {
        assert_eq!(
            module_local("github.com/acme/app", "github.com/acme/app/internal/store"),
            Some("internal/store".to_string())
        );
        assert_eq!(module_local("github.com/acme/app", "fmt"), None);
        assert_eq!(
            module_local("github.com/acme/app", "github.com/acme/app"),
            Some(".".to_string())
        );
        assert_eq!(module_local("github.com/acme/app", "github.com/other/app/pkg"), None);
    }
}

//! Entrypoint impact reporting: maps a change list onto the configured
//! services.
//!
//! A service is affected when the reverse-dependency closure of a change
//! (or the change itself) reaches a declaration in the service's
//! entrypoint package — unless one of the service's ignore patterns
//! matches the changed file — or when a changed file matches one of the
//! service's hook patterns, which forces the service in regardless of
//! symbol-level analysis.

use crate::analysis::{DependencyInfo, ObjectId};
use crate::diff::{Change, ChangeKind};
use crate::error::Result;
use crate::project::Project;
use crate::tools::path::matches_pattern;
use std::collections::HashSet;

/// Reverse-dependency listing for one change (`impact --scope all`).
pub struct ChangeImpact {
    pub change: Change,
    pub dependents: Vec<ObjectId>,
}

/// Resolves the reverse closure of every change. Removed declarations
/// are resolved against the old revision, everything else against the
/// new one.
pub fn change_dependencies(
    old: &DependencyInfo<'_>,
    new: &DependencyInfo<'_>,
    changes: &[Change],
) -> Result<Vec<ChangeImpact>> {
    changes
        .iter()
        .map(|change| {
            let info = revision_for(change, old, new);
            let mut dependents = info.dependents(&change.id)?;
            dependents.sort();
            Ok(ChangeImpact {
                change: change.clone(),
                dependents,
            })
        })
        .collect()
}

/// Services affected by the given changes, each reported once, in
/// discovery order. `changed_files` are the raw changed paths (relative
/// to the project root) and drive hook matching, so a hook can fire for
/// files that carry no declarations at all.
pub fn affected_services(
    project: &Project,
    old: &DependencyInfo<'_>,
    new: &DependencyInfo<'_>,
    changes: &[Change],
    changed_files: &[String],
) -> Result<Vec<String>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for file in changed_files {
        if file.is_empty() {
            continue;
        }
        for svc in project.services() {
            if project.hook_patterns(svc).any(|hook| matches_pattern(hook, file))
                && seen.insert(svc.name.clone())
            {
                result.push(svc.name.clone());
            }
        }
    }

    for change in changes {
        let info = revision_for(change, old, new);
        let dependents = info.dependents(&change.id)?;
        let changed_path = relative_change_path(project, change);

        let affected_packages: HashSet<&str> = dependents
            .iter()
            .map(|id| id.package())
            .chain(std::iter::once(change.id.package()))
            .collect();

        for svc in project.services() {
            if seen.contains(&svc.name) {
                continue;
            }
            if !affected_packages.contains(project.entrypoint_package(svc).as_str()) {
                continue;
            }
            if svc.ignore.iter().any(|p| matches_pattern(p, &changed_path)) {
                continue;
            }
            seen.insert(svc.name.clone());
            result.push(svc.name.clone());
        }
    }

    Ok(result)
}

fn revision_for<'r, 'a>(
    change: &Change,
    old: &'r DependencyInfo<'a>,
    new: &'r DependencyInfo<'a>,
) -> &'r DependencyInfo<'a> {
    match change.kind {
        ChangeKind::Removed => old,
        ChangeKind::Added | ChangeKind::Modified => new,
    }
}

/// The change's file path relative to the project root: the module name
/// is stripped from the package-qualified file.
fn relative_change_path(project: &Project, change: &Change) -> String {
    let module_prefix = format!("{}/", project.module.name);
    change
        .file
        .strip_prefix(&module_prefix)
        .unwrap_or(&change.file)
        .to_string()
}

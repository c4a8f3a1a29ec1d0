use super::vcs;
use super::Scope;
use crate::diff::ChangeKind;
use crate::error::RipplescopeError;
use crate::lang::snapshot::PackageSet;
use crate::project::Project;
use crate::{analysis, diff, impact};
use std::path::Path;

pub fn run(
    old: &str,
    new: &str,
    repo: &Path,
    scope: Scope,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = Project::open(repo)?;
    let loader = project.config.loader.clone().ok_or_else(|| {
        RipplescopeError::ConfigParse("no loader command configured".to_string())
    })?;

    // Both revisions are exported into a temp dir that is dropped (and
    // removed) once the analysis results are printed.
    let tmp = tempfile::tempdir()?;
    let old_dir = tmp.path().join("old");
    let new_dir = tmp.path().join("new");
    vcs::export_commit(repo, old, &old_dir)?;
    vcs::export_commit(repo, new, &new_dir)?;

    let old_set = PackageSet::from_loader_command(&loader, &old_dir)?;
    let new_set = PackageSet::from_loader_command(&loader, &new_dir)?;

    let old_objects = diff::analyze_revision(&old_set);
    let new_objects = diff::analyze_revision(&new_set);
    let changes = diff::compare(&old_objects, &new_objects);

    let old_info = analysis::analyze(&old_set);
    let new_info = analysis::analyze(&new_set);

    match scope {
        Scope::All => {
            for entry in impact::change_dependencies(&old_info, &new_info, &changes)? {
                let verb = match entry.change.kind {
                    ChangeKind::Added => "add",
                    ChangeKind::Removed => "remove",
                    ChangeKind::Modified => "modify",
                };
                println!(
                    "{} {} in {}, dependencies:",
                    verb, entry.change.member, entry.change.file
                );
                for (i, dep) in entry.dependents.iter().enumerate() {
                    println!("  {}. {}", i + 1, dep);
                }
            }
        }
        Scope::Service => {
            let changed_files = vcs::changed_files(repo, old, new)?;
            let services =
                impact::affected_services(&project, &old_info, &new_info, &changes, &changed_files)?;
            for service in services {
                println!("{}", service);
            }
        }
    }
    Ok(())
}

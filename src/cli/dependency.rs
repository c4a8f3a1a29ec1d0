use crate::analysis::{self, ObjectId};
use crate::error::RipplescopeError;
use crate::lang::snapshot::PackageSet;
use crate::project::Project;
use std::path::Path;

pub fn run(target: &str, repo: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let project = Project::open(repo)?;
    let loader = project.config.loader.clone().ok_or_else(|| {
        RipplescopeError::ConfigParse("no loader command configured".to_string())
    })?;

    let set = PackageSet::from_loader_command(&loader, repo)?;
    let info = analysis::analyze(&set);

    let target = ObjectId::parse(target).ok_or_else(|| {
        RipplescopeError::ConfigParse(format!(
            "{} is not a valid object id (<package>/<file>:<member>)",
            target
        ))
    })?;
    let mut dependents = info.dependents(&target)?;
    dependents.sort();

    println!("target: {}", target);
    for dep in dependents {
        println!("{}", dep);
    }
    Ok(())
}

use super::vcs;
use super::OutputFormat;
use crate::project::Project;
use std::path::Path;

pub fn run(
    old: &str,
    new: &str,
    repo: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let changed = vcs::changed_files(repo, old, new)?;

    let mut project = Project::open(repo)?;
    project.parse()?;

    match format {
        OutputFormat::Oneline => {
            for entrypoint in project.affected_entrypoints(&changed)? {
                println!("{}", entrypoint);
            }
        }
        OutputFormat::Text => project.report_impact(&changed),
    }
    Ok(())
}

//! Thin git shells: revision export and changed-file listing. The
//! engine itself never touches these directories; callers own cleanup.

use crate::error::{Result, RipplescopeError};
use std::path::Path;
use std::process::{Command, Stdio};

/// Exports `commit` of the repository at `repo` into `dir` using
/// `git archive` piped through `tar`.
pub fn export_commit(repo: &Path, commit: &str, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let archive = Command::new("git")
        .args(["archive", "--format=tar", commit])
        .current_dir(repo)
        .output()
        .map_err(|e| RipplescopeError::Git(format!("git archive: {}", e)))?;
    if !archive.status.success() {
        return Err(RipplescopeError::Git(format!(
            "git archive {} failed: {}",
            commit,
            String::from_utf8_lossy(&archive.stderr).trim()
        )));
    }

    let mut tar = Command::new("tar")
        .args(["-xf", "-"])
        .current_dir(dir)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| RipplescopeError::Git(format!("tar: {}", e)))?;
    {
        use std::io::Write;
        let stdin = tar
            .stdin
            .as_mut()
            .ok_or_else(|| RipplescopeError::Git("tar stdin unavailable".to_string()))?;
        stdin.write_all(&archive.stdout)?;
    }
    let status = tar
        .wait()
        .map_err(|e| RipplescopeError::Git(format!("tar: {}", e)))?;
    if !status.success() {
        return Err(RipplescopeError::Git(format!(
            "tar extraction of {} failed",
            commit
        )));
    }
    Ok(())
}

/// Files changed between two commits, one path per entry.
pub fn changed_files(repo: &Path, old: &str, new: &str) -> Result<Vec<String>> {
    let output = Command::new("git")
        .args(["diff", "--name-only", old, new])
        .current_dir(repo)
        .output()
        .map_err(|e| RipplescopeError::Git(format!("git diff: {}", e)))?;
    if !output.status.success() {
        return Err(RipplescopeError::Git(format!(
            "git diff failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

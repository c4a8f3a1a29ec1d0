use crate::error::{Result, RipplescopeError};
use regex::Regex;
use std::path::Path;

/// Module manifest information the analyzer needs: the module identifier
/// and the declared language version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleManifest {
    pub name: String,
    pub go_version: String,
}

pub fn parse_manifest(path: &Path) -> Result<ModuleManifest> {
    let content = std::fs::read_to_string(path)?;
    parse_manifest_content(&content)
}

fn parse_manifest_content(content: &str) -> Result<ModuleManifest> {
    let module_exp = Regex::new(r"(?m)^module (.+)$").expect("static regex");
    let version_exp = Regex::new(r"(?m)^go (.+)$").expect("static regex");

    let name = module_exp
        .captures(content)
        .map(|c| c[1].trim().to_string())
        .ok_or_else(|| RipplescopeError::ModuleManifest("module name not found".to_string()))?;

    let go_version = version_exp
        .captures(content)
        .map(|c| c[1].trim().to_string())
        .ok_or_else(|| RipplescopeError::ModuleManifest("go version not found".to_string()))?;

    Ok(ModuleManifest { name, go_version })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common() {
        let got = parse_manifest_content("module github.com/acme/sample\ngo 1.17\n").unwrap();
        assert_eq!(
            got,
            ModuleManifest {
                name: "github.com/acme/sample".to_string(),
                go_version: "1.17".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_module_name() {
        assert!(parse_manifest_content("\ngo 1.17").is_err());
    }

    #[test]
    fn test_missing_version() {
        assert!(parse_manifest_content("module github.com/acme/sample").is_err());
    }
}

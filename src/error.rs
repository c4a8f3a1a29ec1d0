use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RipplescopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("ripplescope config file not found under {0}")]
    ConfigMissing(PathBuf),
    #[error("invalid config: {0}")]
    ConfigParse(String),
    #[error("invalid module manifest: {0}")]
    ModuleManifest(String),
    #[error("failed to load packages: {0}")]
    PackageLoad(String),
    #[error("target {0} is not defined in project")]
    UnknownTarget(String),
    #[error("git: {0}")]
    Git(String),
    #[error("project: {0}")]
    Project(String),
}

pub type Result<T> = std::result::Result<T, RipplescopeError>;

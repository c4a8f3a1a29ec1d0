//! Project configuration (`ripplescope.yml` / `ripplescope.yaml`).
//!
//! Two config generations are supported. The early `0.0.x` layout nested
//! everything under a `project` key with a flat entrypoint list; the
//! current `0.1.x` layout names each service. Both are normalized into
//! the service model at load time.

use crate::error::{Result, RipplescopeError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Config {
    pub version: String,
    /// Service name -> service definition.
    pub services: BTreeMap<String, Service>,
    /// Optional override for the module manifest location.
    pub manifest: Option<String>,
    /// Project-wide hook patterns, applied to every service.
    pub hooks: Vec<String>,
    /// Toolchain bridge command producing a typed snapshot on stdout.
    pub loader: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    /// Main package of the service, relative to the project root.
    pub entrypoint: String,
    pub ignore: Vec<String>,
    pub hooks: Vec<String>,
}

#[derive(Deserialize)]
struct RawV1 {
    version: String,
    #[serde(default)]
    services: BTreeMap<String, RawService>,
    #[serde(rename = "go.mod", default)]
    manifest: Option<String>,
    #[serde(default)]
    hooks: Vec<String>,
    #[serde(default)]
    loader: Option<String>,
}

#[derive(Deserialize)]
struct RawService {
    entrypoint: String,
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default)]
    hooks: Vec<String>,
}

#[derive(Deserialize)]
struct RawV0 {
    version: String,
    project: RawV0Project,
}

#[derive(Deserialize)]
struct RawV0Project {
    #[serde(rename = "go.mod", default)]
    manifest: Option<String>,
    #[serde(default)]
    entrypoint: Vec<String>,
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default)]
    hooks: BTreeMap<String, String>,
}

impl Config {
    /// Parse a config document, dispatching on its `version` field.
    pub fn parse(content: &str) -> Result<Config> {
        let probe: serde_yaml::Value = serde_yaml::from_str(content)?;
        let version = probe
            .get("version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RipplescopeError::ConfigParse("missing version field".to_string()))?
            .to_string();

        if version.starts_with("0.0.") {
            let raw: RawV0 = serde_yaml::from_str(content)?;
            Ok(Self::from_v0(raw))
        } else {
            let raw: RawV1 = serde_yaml::from_str(content)?;
            Ok(Self::from_v1(raw))
        }
    }

    /// Locate and parse the config file in `root`. `.yaml` wins over `.yml`.
    pub fn discover(root: &Path) -> Result<Config> {
        let yaml = root.join("ripplescope.yaml");
        let yml = root.join("ripplescope.yml");
        let path = if yaml.is_file() {
            yaml
        } else if yml.is_file() {
            yml
        } else {
            return Err(RipplescopeError::ConfigMissing(root.to_path_buf()));
        };
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    fn from_v1(raw: RawV1) -> Config {
        let services = raw
            .services
            .into_iter()
            .map(|(name, svc)| {
                let service = Service {
                    name: name.clone(),
                    entrypoint: svc.entrypoint,
                    ignore: svc.ignore,
                    hooks: svc.hooks,
                };
                (name, service)
            })
            .collect();
        Config {
            version: raw.version,
            services,
            manifest: raw.manifest,
            hooks: raw.hooks,
            loader: raw.loader,
        }
    }

    /// v0 had no service names: each entrypoint becomes a service named by
    /// its normalized path, the shared ignore list applies to all of them,
    /// and named hooks attach to the matching service (or to every service
    /// when the name matches none).
    fn from_v0(raw: RawV0) -> Config {
        let mut services = BTreeMap::new();
        let service_names: Vec<String> = raw
            .project
            .entrypoint
            .iter()
            .map(|e| normalize_entrypoint(e))
            .collect();
        for (entry, name) in raw.project.entrypoint.iter().zip(&service_names) {
            let mut hooks = Vec::new();
            for (hook_name, pattern) in &raw.project.hooks {
                if hook_name == name {
                    hooks.push(pattern.clone());
                }
            }
            services.insert(
                name.clone(),
                Service {
                    name: name.clone(),
                    entrypoint: entry.clone(),
                    ignore: raw.project.ignore.clone(),
                    hooks,
                },
            );
        }
        let mut global_hooks = Vec::new();
        for (hook_name, pattern) in &raw.project.hooks {
            if !service_names.contains(hook_name) {
                global_hooks.push(pattern.clone());
            }
        }
        Config {
            version: raw.version,
            services,
            manifest: raw.project.manifest,
            hooks: global_hooks,
            loader: None,
        }
    }
}

/// Strip leading `./` and trailing `/` from an entrypoint path.
pub fn normalize_entrypoint(path: &str) -> String {
    path.trim_start_matches("./").trim_end_matches('/').to_string()
}

//! Settings file discovery and loading.
//!
//! Settings are looked up in the project root, in priority order:
//! 1. `.tracegraph.yml`
//! 2. `.tracegraph/config.yml`
//!
//! When neither exists the defaults are used.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::TraceSettings;
use crate::error::{GraphError, Result};

/// Candidate settings files for a project root, in priority order.
pub fn candidate_paths(project_root: &Path) -> Vec<PathBuf> {
    vec![
        project_root.join(".tracegraph.yml"),
        project_root.join(".tracegraph").join("config.yml"),
    ]
}

impl TraceSettings {
    /// Parse settings from YAML text.
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load settings from a specific file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GraphError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| GraphError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the first settings file found under `project_root`, or the defaults.
    pub fn discover(project_root: &Path) -> Result<Self> {
        match candidate_paths(project_root).into_iter().find(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Loading trace settings from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

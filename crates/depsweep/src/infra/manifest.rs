//! `package.json` loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::errors::DomainError;

pub const MANIFEST_FILE: &str = "package.json";

/// The parts of a project manifest this tool reads. Key order follows the file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub scripts: Map<String, Value>,
    #[serde(default)]
    pub dependencies: Map<String, Value>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: Map<String, Value>,
}

impl Manifest {
    /// Read `package.json` from a project root.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(DomainError::ManifestNotFound(root.to_path_buf()).into());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("invalid manifest {}", path.display()))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// `dependencies` keys followed by `devDependencies` keys. A name declared in both appears
    /// twice.
    pub fn candidates(&self) -> Vec<String> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .cloned()
            .collect()
    }

    /// Script command strings. Non-string values are skipped.
    pub fn script_commands(&self) -> impl Iterator<Item = &str> {
        self.scripts.values().filter_map(Value::as_str)
    }
}

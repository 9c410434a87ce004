//! The subset of `package.json` the resolver reads.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::resolver::ResolveError;

pub const MANIFEST: &str = "package.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, IgnoredAny>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, IgnoredAny>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, IgnoredAny>,
}

impl Manifest {
    /// Read `<dir>/package.json`.
    pub fn read(dir: &Path) -> Result<Self, ResolveError> {
        let path = dir.join(MANIFEST);
        let data = fs::read_to_string(&path).map_err(|source| ResolveError::ManifestRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ResolveError::ManifestParse { path, source })
    }

    /// Runtime dependencies, optional ones included, sorted by name.
    pub fn production_deps(&self) -> Vec<String> {
        let mut deps: Vec<String> = self
            .dependencies
            .keys()
            .chain(self.optional_dependencies.keys())
            .cloned()
            .collect();
        deps.sort();
        deps.dedup();
        deps
    }

    pub fn test_deps(&self) -> Vec<String> {
        self.dev_dependencies.keys().cloned().collect()
    }
}

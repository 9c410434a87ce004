//! A resolver backed by a canned dependency graph.
//!
//! Used for tests and for `depth --fixture graph.json`, where a graph is
//! described directly instead of discovered from `node_modules`:
//!
//! ```json
//! { "units": {
//!     "app":  { "deps": ["zod", "fs"], "test_deps": ["vitest"] },
//!     "fs":   { "internal": true },
//!     "zod":  {}
//! } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::resolver::{Metadata, Mode, ResolveError, Resolver};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureUnit {
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub test_deps: Vec<String>,
    /// Directory reported for the unit. Defaults to the requesting dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Canonical name reported for the unit. Defaults to the unit's key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureGraph {
    #[serde(default)]
    pub units: BTreeMap<String, FixtureUnit>,
}

impl FixtureGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace the production dependencies of) an external unit.
    #[must_use]
    pub fn unit(mut self, name: &str, deps: &[&str]) -> Self {
        self.entry(name).deps = deps.iter().map(|d| (*d).to_string()).collect();
        self
    }

    /// Add an internal unit.
    #[must_use]
    pub fn internal(mut self, name: &str, deps: &[&str]) -> Self {
        let unit = self.entry(name);
        unit.internal = true;
        unit.deps = deps.iter().map(|d| (*d).to_string()).collect();
        self
    }

    #[must_use]
    pub fn test_deps(mut self, name: &str, deps: &[&str]) -> Self {
        self.entry(name).test_deps = deps.iter().map(|d| (*d).to_string()).collect();
        self
    }

    #[must_use]
    pub fn canonical(mut self, name: &str, canonical: &str) -> Self {
        self.entry(name).canonical = Some(canonical.to_string());
        self
    }

    fn entry(&mut self, name: &str) -> &mut FixtureUnit {
        self.units.entry(name.to_string()).or_default()
    }
}

/// Serves [`FixtureGraph`] units and records every call it receives.
///
/// Dependency lists are reported in both modes; the engine is responsible
/// for not expanding locate-only lookups.
#[derive(Debug, Default)]
pub struct FixtureResolver {
    graph: FixtureGraph,
    calls: Mutex<Vec<(String, Mode)>>,
}

impl FixtureResolver {
    pub fn new(graph: FixtureGraph) -> Self {
        Self {
            graph,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = fs::read_to_string(path).map_err(|source| Error::FixtureRead {
            path: path.to_path_buf(),
            source,
        })?;
        let graph = serde_json::from_str(&data).map_err(|source| Error::FixtureParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(graph))
    }

    pub fn graph(&self) -> &FixtureGraph {
        &self.graph
    }

    /// Every `(name, mode)` the resolver was called with, in call order.
    pub fn calls(&self) -> Vec<(String, Mode)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(n, _)| n == name)
            .count()
    }
}

impl Resolver for FixtureResolver {
    fn resolve(
        &self,
        name: &str,
        source_dir: &Path,
        mode: Mode,
    ) -> Result<Metadata, ResolveError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), mode));

        let unit = self
            .graph
            .units
            .get(name)
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))?;
        Ok(Metadata {
            canonical_name: unit.canonical.clone().unwrap_or_else(|| name.to_string()),
            internal: unit.internal,
            dir: unit.dir.clone().unwrap_or_else(|| source_dir.to_path_buf()),
            deps: unit.deps.clone(),
            test_deps: unit.test_deps.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_merges_entries() {
        let g = FixtureGraph::new()
            .unit("app", &["zod"])
            .test_deps("app", &["vitest"])
            .canonical("app", "@acme/app");
        let app = &g.units["app"];
        assert_eq!(app.deps, vec!["zod"]);
        assert_eq!(app.test_deps, vec!["vitest"]);
        assert_eq!(app.canonical.as_deref(), Some("@acme/app"));
        assert!(!app.internal);
    }

    #[test]
    fn unknown_unit_is_not_found() {
        let r = FixtureResolver::new(FixtureGraph::new());
        let err = r.resolve("ghost", Path::new("."), Mode::Full).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(n) if n == "ghost"));
        assert_eq!(r.call_count("ghost"), 1);
    }

    #[test]
    fn deps_reported_in_both_modes() {
        let r = FixtureResolver::new(FixtureGraph::new().unit("a", &["b"]));
        let full = r.resolve("a", Path::new("."), Mode::Full).unwrap();
        let located = r.resolve("a", Path::new("."), Mode::LocateOnly).unwrap();
        assert_eq!(full, located);
        assert_eq!(
            r.calls(),
            vec![("a".to_string(), Mode::Full), ("a".to_string(), Mode::LocateOnly)]
        );
    }

    #[test]
    fn load_reads_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("graph.json");
        fs::write(
            &path,
            r#"{"units": {"app": {"deps": ["fs"]}, "fs": {"internal": true}}}"#,
        )
        .unwrap();

        let r = FixtureResolver::load(&path).unwrap();
        let fs_meta = r.resolve("fs", Path::new("/x"), Mode::Full).unwrap();
        assert!(fs_meta.internal);
        assert_eq!(fs_meta.dir, Path::new("/x"));
        assert_eq!(r.graph().units.len(), 2);
    }

    #[test]
    fn load_reports_bad_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("graph.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FixtureResolver::load(&path),
            Err(Error::FixtureParse { .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = FixtureResolver::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::FixtureRead { .. }));
    }
}

//! Resolves npm packages installed under `node_modules`.

pub mod locate;
pub mod manifest;

use std::path::{Path, PathBuf};

use crate::resolver::{Metadata, Mode, ResolveError, Resolver};

use self::locate::{PackageLocator, is_node_builtin, is_path_like, split_package_specifier};
use self::manifest::Manifest;

/// The production resolver: package names are looked up the way Node
/// does, and `package.json` supplies the dependency lists. Node builtins
/// that are not installed as packages are the internal units.
pub struct NpmResolver {
    locator: PackageLocator,
}

impl NpmResolver {
    pub fn new(root: &Path) -> Self {
        Self {
            locator: PackageLocator::new(root),
        }
    }

    fn package_dir(&self, name: &str, source_dir: &Path) -> Result<PathBuf, ResolveError> {
        if is_path_like(name) {
            let dir = source_dir.join(name);
            let dir = dir.canonicalize().unwrap_or(dir);
            return if dir.is_dir() {
                Ok(dir)
            } else {
                Err(ResolveError::NotFound(name.to_string()))
            };
        }
        self.locator
            .package_dir(source_dir, name)
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))
    }
}

impl Resolver for NpmResolver {
    fn resolve(
        &self,
        name: &str,
        source_dir: &Path,
        mode: Mode,
    ) -> Result<Metadata, ResolveError> {
        // Manifest keys name npm packages, so an installed `events` or
        // `buffer` shadows the builtin of the same name. Only `node:`
        // specifiers are builtins unconditionally.
        let located = if name.starts_with("node:") {
            Err(ResolveError::NotFound(name.to_string()))
        } else {
            self.package_dir(name, source_dir)
        };
        let dir = match located {
            Ok(dir) => dir,
            Err(_) if is_node_builtin(name) => {
                return Ok(Metadata {
                    canonical_name: name.to_string(),
                    internal: true,
                    ..Metadata::default()
                });
            }
            Err(e) => return Err(e),
        };
        let manifest = Manifest::read(&dir).inspect_err(|e| {
            if matches!(e, ResolveError::ManifestParse { .. }) {
                tracing::warn!(package = name, error = %e, "skipping unreadable manifest");
            }
        })?;
        let canonical_name = manifest.name.clone().unwrap_or_else(|| name.to_string());

        let (deps, test_deps) = match mode {
            Mode::Full => (manifest.production_deps(), manifest.test_deps()),
            Mode::LocateOnly => (Vec::new(), Vec::new()),
        };
        Ok(Metadata {
            canonical_name,
            internal: false,
            dir,
            deps,
            test_deps,
        })
    }

    /// Deep imports (`lodash/fp`) resolve as their package. Builtins keep
    /// their subpath so `fs/promises` stays distinct from `fs`.
    fn clean_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if is_path_like(name) || is_node_builtin(name) {
            return Some(name);
        }
        Some(split_package_specifier(name).0)
    }
}

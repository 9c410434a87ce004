//! The resolver capability the tree engine is built on.
//!
//! A [`Resolver`] answers one question: given a unit name and the directory
//! it was referenced from, what is the unit and what does it depend on? The
//! engine never looks at manifests or the filesystem itself; everything it
//! knows about a unit comes through [`Resolver::resolve`].

use std::path::{Path, PathBuf};

/// How much work a resolver call should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Identify, classify, and list dependencies.
    Full,
    /// Identify and classify only. Dependency lists may be left empty.
    LocateOnly,
}

/// What a resolver knows about one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Fully-qualified name the unit is known by.
    pub canonical_name: String,
    /// Part of the platform's standard/internal library.
    pub internal: bool,
    /// Directory the unit lives in; dependency names resolve relative to it.
    pub dir: PathBuf,
    pub deps: Vec<String>,
    pub test_deps: Vec<String>,
}

/// A node-local resolution failure. Never fatal to a run on its own.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("cannot find '{0}'")]
    NotFound(String),
    #[error("cannot read manifest '{}': {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest '{}': {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait Resolver: Send + Sync {
    /// Look up `name` as referenced from `source_dir`.
    fn resolve(&self, name: &str, source_dir: &Path, mode: Mode)
    -> Result<Metadata, ResolveError>;

    /// Normalize a dependency name before lookup.
    ///
    /// Returns `None` for placeholder names that can never be resolved;
    /// such units still appear in the tree but never reach [`Self::resolve`].
    fn clean_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        let name = name.trim();
        if name.is_empty() { None } else { Some(name) }
    }
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(
        &self,
        name: &str,
        source_dir: &Path,
        mode: Mode,
    ) -> Result<Metadata, ResolveError> {
        (**self).resolve(name, source_dir, mode)
    }

    fn clean_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        (**self).clean_name(name)
    }
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn resolve(
        &self,
        name: &str,
        source_dir: &Path,
        mode: Mode,
    ) -> Result<Metadata, ResolveError> {
        (**self).resolve(name, source_dir, mode)
    }

    fn clean_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        (**self).clean_name(name)
    }
}

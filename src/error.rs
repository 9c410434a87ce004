//! Error types for the depth CLI.

use std::path::PathBuf;

use crate::node::Node;

/// Run-level failures. Per-unit resolution failures are recorded on the
/// tree instead (see [`Node::resolved`]).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The root unit could not be located at all.
    #[error("cannot resolve root '{0}'")]
    RootUnresolvable(String),
    /// The run was cancelled before every unit was resolved.
    #[error("resolution of '{}' was cancelled", partial.name)]
    Cancelled {
        /// Whatever was resolved before cancellation took effect.
        partial: Box<Node>,
    },
    /// Cannot read a fixture graph from disk.
    #[error("cannot read fixture '{}': {source}", path.display())]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Fixture file contains invalid JSON.
    #[error("invalid fixture '{}': {source}", path.display())]
    FixtureParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// An include/exclude pattern was empty.
    #[error("invalid pattern '{0}'")]
    InvalidPattern(String),
    /// The dedicated worker pool could not be started.
    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// No `--dir` was given and the working directory is unusable.
    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
    /// Writing the report failed.
    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// User-facing hint to accompany the error message.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::RootUnresolvable(name) if name.starts_with('.') || name.starts_with('/') => {
                Some("a directory root must contain a package.json")
            }
            Self::RootUnresolvable(_) => {
                Some("is it installed? run from a directory with node_modules or pass --dir")
            }
            Self::InvalidPattern(_) => Some("patterns are non-empty substrings of package names"),
            Self::FixtureParse { .. } => Some("expected {\"units\": {\"<name>\": {...}}}"),
            Self::WorkingDir(_) => Some("pass --dir to choose where packages are resolved from"),
            _ => None,
        }
    }
}

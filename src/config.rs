//! Settings shared read-only by every node of one resolution run.

use crate::error::Error;

/// Policy for one tree resolution run.
///
/// Built once with [`TreeConfig::builder`] and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeConfig {
    /// Descend into the dependencies of internal units.
    pub resolve_internal: bool,
    /// Also follow test-only dependency edges.
    pub resolve_test: bool,
    /// 0 means unlimited.
    pub max_depth: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    /// Worker cap for the resolution pool. `None` uses the global rayon pool.
    pub jobs: Option<usize>,
}

impl TreeConfig {
    pub fn builder() -> TreeConfigBuilder {
        TreeConfigBuilder::default()
    }

    /// Whether `name` passes the include/exclude substring filters.
    ///
    /// With include patterns, a name must contain at least one of them.
    /// A name containing any exclude pattern never matches.
    pub fn matches_pattern(&self, name: &str) -> bool {
        matches_pattern(name, &self.include_patterns, &self.exclude_patterns)
    }

    /// Units at or below this depth are located but not expanded.
    pub fn is_at_max_depth(&self, depth: usize) -> bool {
        self.max_depth > 0 && depth >= self.max_depth
    }

    pub fn should_resolve_internal(&self) -> bool {
        self.resolve_internal
    }
}

pub fn matches_pattern<S: AsRef<str>>(name: &str, include: &[S], exclude: &[S]) -> bool {
    let included =
        include.is_empty() || include.iter().any(|pattern| name.contains(pattern.as_ref()));
    included && !exclude.iter().any(|pattern| name.contains(pattern.as_ref()))
}

#[derive(Debug, Default)]
#[must_use]
pub struct TreeConfigBuilder {
    config: TreeConfig,
}

impl TreeConfigBuilder {
    pub fn resolve_internal(mut self, yes: bool) -> Self {
        self.config.resolve_internal = yes;
        self
    }

    pub fn resolve_test(mut self, yes: bool) -> Self {
        self.config.resolve_test = yes;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .include_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.config.jobs = jobs.filter(|&n| n > 0);
        self
    }

    /// An empty pattern would match every name, which is never what a
    /// caller passing `--include ""` meant.
    pub fn build(self) -> Result<TreeConfig, Error> {
        let config = self.config;
        if let Some(empty) = config
            .include_patterns
            .iter()
            .chain(&config.exclude_patterns)
            .find(|p| p.is_empty())
        {
            return Err(Error::InvalidPattern(empty.clone()));
        }
        Ok(config)
    }
}

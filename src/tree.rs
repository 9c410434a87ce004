//! The tree resolution engine.
//!
//! [`Tree`] owns the state shared by every node of one run: the resolution
//! cache, the set of names already expanded, and the cancellation flag.
//! Resolution of a node fans out one rayon task per distinct dependency
//! name; each task resolves its child subtree and hands the finished child
//! back to the parent, which sorts its children once all tasks are joined.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use rayon::prelude::*;

use crate::cache::ResolutionCache;
use crate::config::TreeConfig;
use crate::error::Error;
use crate::node::{Lineage, Node};
use crate::resolver::{Mode, Resolver};

/// Stops a running [`Tree::resolve`] from issuing further resolver calls.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Marker for a subtree cut short by cancellation.
#[derive(Debug)]
struct Interrupted;

pub struct Tree<R> {
    config: TreeConfig,
    cache: ResolutionCache<R>,
    /// Names that already had a full resolver call in this run.
    seen: Mutex<HashSet<String>>,
    cancel: CancelHandle,
    pool: Option<rayon::ThreadPool>,
}

impl<R: Resolver> Tree<R> {
    pub fn new(config: TreeConfig, resolver: R) -> Result<Self, Error> {
        let pool = match config.jobs {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("depth-{i}"))
                    .build()?,
            ),
            None => None,
        };
        Ok(Self {
            config,
            cache: ResolutionCache::new(resolver),
            seen: Mutex::new(HashSet::new()),
            cancel: CancelHandle::default(),
            pool,
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResolutionCache<R> {
        &self.cache
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn has_seen(&self, name: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    fn mark_seen(&self, names: &[&str]) {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        for name in names {
            seen.insert((*name).to_string());
        }
    }

    /// Resolve `name` and its dependency subtree, starting from `source_dir`.
    ///
    /// Unresolvable dependencies are recorded in the tree; only an
    /// unresolvable root or a cancellation fails the run.
    pub fn resolve(&self, name: &str, source_dir: impl Into<PathBuf>) -> Result<Node, Error> {
        let mut root = Node::root(name, source_dir);
        let outcome = match &self.pool {
            Some(pool) => pool.install(|| self.resolve_node(&mut root, None)),
            None => self.resolve_node(&mut root, None),
        };

        if outcome.is_err() {
            return Err(Error::Cancelled {
                partial: Box::new(root),
            });
        }
        if !root.resolved {
            return Err(Error::RootUnresolvable(name.to_string()));
        }
        tracing::debug!(root = %root.name, nodes = root.len(), "resolved tree");
        Ok(root)
    }

    fn resolve_node(
        &self,
        node: &mut Node,
        parent: Option<&Lineage<'_>>,
    ) -> Result<(), Interrupted> {
        // A node counts as resolved once attempted; only a resolver error
        // flips this back.
        node.resolved = true;

        let Some(name) = self.cache.resolver().clean_name(&node.name) else {
            return Ok(());
        };
        if !self.config.matches_pattern(name) {
            tracing::trace!(name, "filtered");
            return Ok(());
        }
        let name = name.to_string();

        if self.cancel.is_cancelled() {
            node.resolved = false;
            return Err(Interrupted);
        }

        // Already-expanded names and units at the depth ceiling are only
        // located, not expanded again.
        let mode = if self.has_seen(&name) || self.config.is_at_max_depth(node.depth) {
            Mode::LocateOnly
        } else {
            Mode::Full
        };

        let start = Instant::now();
        let result = self.cache.resolve(&name, &node.source_dir, mode);
        node.elapsed = start.elapsed();
        let meta = match result {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "unresolved");
                node.resolved = false;
                return Ok(());
            }
        };
        tracing::debug!(name = %name, ?mode, elapsed = ?node.elapsed, "resolved");

        if !meta.canonical_name.is_empty() {
            node.name.clone_from(&meta.canonical_name);
        }
        if mode == Mode::Full {
            self.mark_seen(&[name.as_str(), node.name.as_str()]);
        }
        node.internal = meta.internal;

        if node.internal && !self.config.should_resolve_internal() {
            return Ok(());
        }
        if mode == Mode::LocateOnly {
            return Ok(());
        }

        // Production names claim first, so a name listed in both the
        // production and test lists is not a test-only dependency.
        let test_deps: &[String] = if self.config.resolve_test {
            &meta.test_deps
        } else {
            &[]
        };
        let mut unique: HashSet<&str> = HashSet::new();
        let pending: Vec<(&str, bool)> = meta
            .deps
            .iter()
            .map(|d| (d.as_str(), false))
            .chain(test_deps.iter().map(|d| (d.as_str(), true)))
            .filter(|&(dep, _)| dep != node.name && dep != name)
            .filter(|&(dep, _)| unique.insert(dep))
            .collect();

        let own_name = node.name.clone();
        let lineage = match parent {
            Some(p) => p.child(&own_name),
            None => Lineage::root(&own_name),
        };
        let this: &Node = node;
        let results: Vec<(Option<Node>, Result<(), Interrupted>)> = pending
            .into_par_iter()
            .map(|(dep, test)| {
                let mut child = this.child(dep, meta.dir.clone(), test);
                if !self.config.matches_pattern(&child.name) {
                    tracing::trace!(name = dep, "filtered");
                    return (None, Ok(()));
                }
                if lineage.contains(dep) {
                    tracing::debug!(
                        name = dep,
                        parent = %own_name,
                        "dependency cycles back to an ancestor"
                    );
                }
                let outcome = self.resolve_node(&mut child, Some(&lineage));
                (Some(child), outcome)
            })
            .collect();

        let mut interrupted = false;
        for (child, outcome) in results {
            interrupted |= outcome.is_err();
            node.children.extend(child);
        }
        node.sort_children();

        if interrupted { Err(Interrupted) } else { Ok(()) }
    }
}

//! Read-only queries over a resolved tree.

use std::collections::HashSet;

use serde::Serialize;

use crate::node::Node;

/// Counts over the distinct dependency names below a root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub internal: usize,
    pub external: usize,
    pub testing: usize,
    pub max_depth: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.internal + self.external
    }
}

/// Summarize every distinct name below `root`. The root itself is not
/// counted. Each name is classified by its first occurrence in traversal
/// order.
pub fn summarize(root: &Node) -> Summary {
    let mut summary = Summary::default();
    let mut names: HashSet<&str> = HashSet::new();
    for child in &root.children {
        child.walk(&mut |node, _| {
            if !names.insert(node.name.as_str()) {
                return;
            }
            if node.internal {
                summary.internal += 1;
            } else {
                summary.external += 1;
            }
            if node.test {
                summary.testing += 1;
            }
            summary.max_depth = summary.max_depth.max(node.depth);
        });
    }
    summary
}

/// Every root-to-node path ending at a node named `target`, in tree order.
pub fn explain(root: &Node, target: &str) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    root.walk(&mut |node, lineage| {
        if node.name == target {
            paths.push(lineage.names().into_iter().map(str::to_owned).collect());
        }
    });
    paths
}

//! Resolved dependency tree nodes.
//!
//! A [`Node`] is one occurrence of a unit in the tree. The same unit may
//! occur many times under different parents; occurrences are never merged,
//! so the tree mirrors the actual dependency edges. Children are owned
//! exclusively by their parent. Upward navigation goes through a borrowed
//! [`Lineage`] chain built while walking down, never through the node.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// Unit name. Rewritten to the canonical name once resolved.
    pub name: String,
    /// Directory used to resolve this unit's name.
    #[serde(skip)]
    pub source_dir: PathBuf,
    pub internal: bool,
    /// False only when the resolver reported a failure for this unit.
    pub resolved: bool,
    /// Reached only through test-only dependency edges of the parent.
    #[serde(skip)]
    pub test: bool,
    /// Distance from the root.
    #[serde(skip)]
    pub depth: usize,
    #[serde(rename = "deps")]
    pub children: Vec<Node>,
    /// Time spent in the resolver call for this node.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl Node {
    pub fn root(name: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_dir: source_dir.into(),
            internal: false,
            resolved: false,
            test: false,
            depth: 0,
            children: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// A not-yet-resolved child one level below `self`.
    pub fn child(
        &self,
        name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        test: bool,
    ) -> Self {
        Self {
            test,
            depth: self.depth + 1,
            ..Self::root(name, source_dir)
        }
    }

    /// Sort children: internal before external, then by name.
    pub fn sort_children(&mut self) {
        self.children.sort_by(by_internal_and_name);
    }

    /// Visit every node depth-first, parents before children, in sibling
    /// order. The callback receives the chain of ancestors for each node.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Node, &Lineage<'_>),
    {
        self.walk_from(&Lineage::root(&self.name), visit);
    }

    fn walk_from<'a, F>(&'a self, lineage: &Lineage<'_>, visit: &mut F)
    where
        F: FnMut(&'a Node, &Lineage<'_>),
    {
        visit(self, lineage);
        for child in &self.children {
            child.walk_from(&lineage.child(&child.name), visit);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Node::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Structural equality: names, flags, and child order. Timing and
    /// source directories are ignored.
    pub fn same_shape(&self, other: &Node) -> bool {
        self.name == other.name
            && self.internal == other.internal
            && self.resolved == other.resolved
            && self.test == other.test
            && self.depth == other.depth
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
    }
}

/// Internal units sort above external ones; ties break on name.
pub fn by_internal_and_name(a: &Node, b: &Node) -> Ordering {
    b.internal
        .cmp(&a.internal)
        .then_with(|| a.name.cmp(&b.name))
}

/// `{}` prints the name and an unresolved marker; `{:#}` also prints the
/// resolver time.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.resolved {
            f.write_str(" (unresolved)")?;
        }
        if f.alternate() && !self.elapsed.is_zero() {
            write!(f, " ({:?})", self.elapsed)?;
        }
        Ok(())
    }
}

/// Non-owning chain of ancestor names, innermost last.
#[derive(Debug, Clone, Copy)]
pub struct Lineage<'a> {
    name: &'a str,
    parent: Option<&'a Lineage<'a>>,
}

impl<'a> Lineage<'a> {
    pub fn root(name: &'a str) -> Self {
        Self { name, parent: None }
    }

    pub fn child(&'a self, name: &'a str) -> Lineage<'a> {
        Lineage {
            name,
            parent: Some(self),
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn parent(&self) -> Option<&'a Lineage<'a>> {
        self.parent
    }

    /// Whether any strict ancestor is called `name`.
    pub fn has_ancestor(&self, name: &str) -> bool {
        let mut current = self.parent;
        while let Some(l) = current {
            if l.name == name {
                return true;
            }
            current = l.parent;
        }
        false
    }

    /// Whether this entry or any ancestor is called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.has_ancestor(name)
    }

    /// Names from the root down to and including this entry.
    pub fn names(&self) -> Vec<&'a str> {
        let mut names = vec![self.name];
        let mut current = self.parent;
        while let Some(l) = current {
            names.push(l.name);
            current = l.parent;
        }
        names.reverse();
        names
    }
}

use std::collections::HashSet;

use proptest::prelude::*;

use depth::config::{TreeConfig, matches_pattern};
use depth::fixture::{FixtureGraph, FixtureResolver};
use depth::node::{Node, by_internal_and_name};
use depth::report::format_elapsed;
use depth::tree::Tree;

/// Up to 8 units `u0..u7`, each depending on a random subset of the
/// others (cycles and self-edges included). Odd units are internal.
fn arb_graph() -> impl Strategy<Value = FixtureGraph> {
    (1usize..8).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0..n, 0..4), n).prop_map(move |edges| {
            let mut graph = FixtureGraph::new();
            for (i, deps) in edges.iter().enumerate() {
                let name = format!("u{i}");
                let deps: Vec<String> = deps.iter().map(|d| format!("u{d}")).collect();
                let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
                graph = if i % 2 == 1 {
                    graph.internal(&name, &deps)
                } else {
                    graph.unit(&name, &deps)
                };
            }
            graph
        })
    })
}

fn check_structure(node: &Node, max_depth: usize) -> Result<(), TestCaseError> {
    prop_assert!(node.resolved, "{} unresolved", node.name);
    if max_depth > 0 {
        prop_assert!(node.depth <= max_depth);
    }
    let mut names = HashSet::new();
    for pair in node.children.windows(2) {
        prop_assert!(by_internal_and_name(&pair[0], &pair[1]).is_le());
    }
    for child in &node.children {
        prop_assert_eq!(child.depth, node.depth + 1);
        prop_assert!(names.insert(child.name.as_str()), "duplicate sibling {}", child.name);
        prop_assert_ne!(&child.name, &node.name);
        check_structure(child, max_depth)?;
    }
    Ok(())
}

proptest! {
    /// Exclusion always wins over inclusion.
    #[test]
    fn excluded_names_never_match(
        name in "[a-z@/-]{0,20}",
        include in prop::collection::vec("[a-z]{1,3}", 0..3),
        exclude in prop::collection::vec("[a-z]{1,3}", 1..3),
    ) {
        let hit = exclude.iter().any(|p| name.contains(p.as_str()));
        if hit {
            prop_assert!(!matches_pattern(&name, include.as_slice(), exclude.as_slice()));
        }
    }

    /// With no patterns at all, every name matches.
    #[test]
    fn empty_filters_match_everything(name in "\\PC{0,40}") {
        let none: &[String] = &[];
        prop_assert!(matches_pattern(&name, none, none));
    }

    /// Any name containing one of the includes, and none of the excludes, matches.
    #[test]
    fn included_names_match(
        prefix in "[a-z]{0,5}",
        pattern in "[a-z]{1,4}",
        suffix in "[a-z]{0,5}",
    ) {
        let name = format!("{prefix}{pattern}{suffix}");
        let none: &[&str] = &[];
        prop_assert!(matches_pattern(&name, &[pattern.as_str()][..], none));
    }

    /// Every resolved tree is well formed, and every name reaches the
    /// resolver at most once.
    #[test]
    fn random_graphs_resolve_to_well_formed_trees(
        graph in arb_graph(),
        max_depth in 0usize..4,
        internal in any::<bool>(),
    ) {
        let config = TreeConfig::builder()
            .max_depth(max_depth)
            .resolve_internal(internal)
            .build()
            .unwrap();
        let units: Vec<String> = graph.units.keys().cloned().collect();
        let tree = Tree::new(config, FixtureResolver::new(graph)).unwrap();
        let root = tree.resolve("u0", ".").unwrap();

        check_structure(&root, max_depth)?;
        for name in &units {
            prop_assert!(tree.cache().resolver().call_count(name) <= 1, "{} resolved twice", name);
        }
    }

    /// format_elapsed never produces an empty string.
    #[test]
    fn format_elapsed_never_empty(micros in 0u64..100_000_000) {
        let s = format_elapsed(std::time::Duration::from_micros(micros));
        prop_assert!(s.ends_with('s'), "{s}");
    }
}

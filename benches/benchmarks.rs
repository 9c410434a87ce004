use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::{Path, PathBuf};

use depth::config::TreeConfig;
use depth::fixture::{FixtureGraph, FixtureResolver};
use depth::npm::NpmResolver;
use depth::tree::Tree;

fn npm_root() -> PathBuf {
    std::env::var("DEPTH_BENCH_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/depth-bench-app"))
}

/// `width` units per layer, each depending on every unit of the next layer.
fn layered_graph(layers: usize, width: usize) -> FixtureGraph {
    let mut graph = FixtureGraph::new();
    let name = |layer: usize, i: usize| format!("l{layer}-{i}");
    let top: Vec<String> = (0..width).map(|i| name(0, i)).collect();
    let top: Vec<&str> = top.iter().map(String::as_str).collect();
    graph = graph.unit("app", &top);
    for layer in 0..layers {
        let next: Vec<String> = if layer + 1 < layers {
            (0..width).map(|i| name(layer + 1, i)).collect()
        } else {
            Vec::new()
        };
        let next: Vec<&str> = next.iter().map(String::as_str).collect();
        for i in 0..width {
            graph = graph.unit(&name(layer, i), &next);
        }
    }
    graph
}

fn write_package(dir: &Path, name: &str, deps: &[String]) {
    fs::create_dir_all(dir).unwrap();
    let deps: Vec<String> = deps.iter().map(|d| format!("\"{d}\":\"*\"")).collect();
    fs::write(
        dir.join("package.json"),
        format!(r#"{{"name":"{name}","dependencies":{{{}}}}}"#, deps.join(",")),
    )
    .unwrap();
}

/// A flat node_modules with a chain of packages, each depending on the next four.
fn synthetic_project(packages: usize) -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let name = |i: usize| format!("pkg-{i}");
    let deps_of = |i: usize| ((i + 1)..packages.min(i + 5)).map(name).collect::<Vec<_>>();
    write_package(tmp.path(), "app", &deps_of(0));
    for i in 1..packages {
        write_package(&tmp.path().join("node_modules").join(name(i)), &name(i), &deps_of(i));
    }
    tmp
}

fn bench_fixture_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixture_tree");
    for width in [4, 8] {
        let graph = layered_graph(5, width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &graph, |b, graph| {
            b.iter(|| {
                let resolver = FixtureResolver::new(graph.clone());
                let tree = Tree::new(TreeConfig::default(), resolver).unwrap();
                tree.resolve(black_box("app"), ".").unwrap()
            })
        });
    }
    group.finish();
}

fn bench_single_thread(c: &mut Criterion) {
    let graph = layered_graph(5, 8);
    let config = TreeConfig::builder().jobs(Some(1)).build().unwrap();
    c.bench_function("fixture_tree_jobs_1", |b| {
        b.iter(|| {
            let tree = Tree::new(config.clone(), FixtureResolver::new(graph.clone())).unwrap();
            tree.resolve(black_box("app"), ".").unwrap()
        })
    });
}

fn bench_npm_synthetic(c: &mut Criterion) {
    let project = synthetic_project(200);
    let root = project.path().canonicalize().unwrap();
    let mut group = c.benchmark_group("npm_tree");
    group.sample_size(20);
    group.bench_function("synthetic_200", |b| {
        b.iter(|| {
            let tree = Tree::new(TreeConfig::default(), NpmResolver::new(&root)).unwrap();
            tree.resolve(black_box("."), &root).unwrap()
        })
    });
    group.finish();
}

fn bench_npm_real(c: &mut Criterion) {
    let root = npm_root();
    if !root.join("package.json").exists() {
        eprintln!("Skipping: {} not found", root.display());
        return;
    }
    let mut group = c.benchmark_group("npm_tree");
    group.sample_size(10);
    group.bench_function("real_project", |b| {
        b.iter(|| {
            let tree = Tree::new(TreeConfig::default(), NpmResolver::new(&root)).unwrap();
            tree.resolve(black_box("."), &root)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_fixture_tree,
    bench_single_thread,
    bench_npm_synthetic,
    bench_npm_real,
);
criterion_main!(benches);

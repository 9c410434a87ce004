#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use depth::fixture::FixtureGraph;

/// A self-contained npm project for integration tests.
///
/// Structure:
///   package.json              -> my-app: deps express, zod; dev vitest
///   node_modules/express      -> deps debug, events, path (builtin)
///   node_modules/events       -> deps inherits (installed, shadows the builtin)
///   node_modules/inherits     -> no deps
///   node_modules/debug        -> deps ms
///   node_modules/ms           -> no deps
///   node_modules/zod          -> no deps
///   node_modules/vitest       -> deps ms
///
/// Properties:
///   - `ms` is reachable via express->debug->ms and (with --test) vitest->ms
///   - `path` is the only internal (builtin) unit; `events` is a package
///   - `zod` is a direct leaf
pub struct NpmProject {
    pub dir: tempfile::TempDir,
}

impl NpmProject {
    /// Create the fixture. Caller must keep the returned value alive
    /// (dropping `TempDir` deletes the files).
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write_manifest(
            root,
            r#"{"name":"my-app","version":"1.0.0",
                "dependencies":{"express":"^4","zod":"^3"},
                "devDependencies":{"vitest":"^1"}}"#,
        );
        write_manifest(
            &root.join("node_modules/express"),
            r#"{"name":"express","dependencies":{"debug":"2","events":"3","path":"*"}}"#,
        );
        write_manifest(
            &root.join("node_modules/events"),
            r#"{"name":"events","dependencies":{"inherits":"2"}}"#,
        );
        write_manifest(&root.join("node_modules/inherits"), r#"{"name":"inherits"}"#);
        write_manifest(
            &root.join("node_modules/debug"),
            r#"{"name":"debug","dependencies":{"ms":"2"}}"#,
        );
        write_manifest(&root.join("node_modules/ms"), r#"{"name":"ms"}"#);
        write_manifest(&root.join("node_modules/zod"), r#"{"name":"zod"}"#);
        write_manifest(
            &root.join("node_modules/vitest"),
            r#"{"name":"vitest","dependencies":{"ms":"2"}}"#,
        );

        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }
}

pub fn write_manifest(dir: &Path, json: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("package.json"), json).unwrap();
}

/// root -> {X, Y}, Y -> {X}. X is a leaf.
pub fn explain_graph() -> FixtureGraph {
    FixtureGraph::new()
        .unit("root", &["X", "Y"])
        .unit("Y", &["X"])
        .unit("X", &[])
}

/// A graph mixing internal and external units where every repeated name
/// is a leaf, so the resolved shape does not depend on task scheduling.
///
///   app -> express, zod, fs
///   express -> debug, path
///   debug -> ms
///   fs -> events
pub fn app_graph() -> FixtureGraph {
    FixtureGraph::new()
        .unit("app", &["zod", "express", "fs"])
        .unit("express", &["debug", "path"])
        .unit("debug", &["ms"])
        .unit("ms", &[])
        .unit("zod", &[])
        .internal("fs", &["events"])
        .internal("path", &[])
        .internal("events", &[])
}

/// Serialize a fixture graph into `dir/graph.json` for CLI tests.
pub fn write_fixture(dir: &Path, graph: &FixtureGraph) -> PathBuf {
    let path = dir.join("graph.json");
    fs::write(&path, serde_json::to_string_pretty(graph).unwrap()).unwrap();
    path
}

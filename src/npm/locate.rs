use oxc_resolver::{ResolveOptions, Resolver};
use std::fs;
use std::path::{Path, PathBuf};

use super::manifest::{MANIFEST, Manifest};

const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Builtins that only exist behind the `node:` scheme.
const NODE_PREFIXED_ONLY: &[&str] = &["sea", "sqlite", "test"];

/// Whether `specifier` names a Node.js builtin, with or without `node:`.
/// Subpaths like `fs/promises` count as their builtin.
pub fn is_node_builtin(specifier: &str) -> bool {
    if let Some(stripped) = specifier.strip_prefix("node:") {
        let base = stripped.split('/').next().unwrap_or(stripped);
        return stripped.starts_with("internal/")
            || NODE_PREFIXED_ONLY.contains(&base)
            || is_node_builtin(stripped);
    }
    let base = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&base)
}

/// Directory names and relative/absolute paths, as opposed to package names.
pub fn is_path_like(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('/') || Path::new(name).is_absolute()
}

/// Split a bare specifier into (package_name, optional_subpath).
/// "@aws-sdk/client-bedrock" -> ("@aws-sdk/client-bedrock", None)
/// "@aws-sdk/client-bedrock/types" -> ("@aws-sdk/client-bedrock", Some("types"))
/// "lodash/fp" -> ("lodash", Some("fp"))
/// "lodash" -> ("lodash", None)
pub fn split_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    if let Some(scoped) = specifier.strip_prefix('@') {
        if let Some(first_slash) = scoped.find('/') {
            let after_name = &scoped[first_slash + 1..];
            if let Some(second_slash) = after_name.find('/') {
                let pkg_end = 1 + first_slash + 1 + second_slash;
                return (&specifier[..pkg_end], Some(&specifier[pkg_end + 1..]));
            }
        }
        (specifier, None)
    } else if let Some(slash) = specifier.find('/') {
        (&specifier[..slash], Some(&specifier[slash + 1..]))
    } else {
        (specifier, None)
    }
}

/// Detect the pnpm virtual store directory by reading .modules.yaml or falling
/// back to the default node_modules/.pnpm location.
fn detect_pnpm_virtual_store(root: &Path) -> Option<PathBuf> {
    let modules_yaml = root.join("node_modules/.modules.yaml");
    if !modules_yaml.exists() {
        return None;
    }

    if let Ok(content) = fs::read_to_string(&modules_yaml) {
        for line in content.lines() {
            if let Some(value) = line.trim().strip_prefix("virtualStoreDir:") {
                let dir = value.trim().trim_matches('\'').trim_matches('"');
                let path = if Path::new(dir).is_absolute() {
                    PathBuf::from(dir)
                } else {
                    root.join("node_modules").join(dir)
                };
                if path.is_dir() {
                    return Some(path);
                }
            }
        }
    }

    let default = root.join("node_modules/.pnpm");
    default.is_dir().then_some(default)
}

fn has_manifest(dir: &Path) -> bool {
    dir.join(MANIFEST).is_file()
}

/// Finds the directory an installed package lives in.
pub struct PackageLocator {
    entry_resolver: Resolver,
    /// Path to pnpm virtual store (e.g. /project/node_modules/.pnpm), if detected
    pnpm_virtual_store: Option<PathBuf>,
}

impl PackageLocator {
    pub fn new(root: &Path) -> Self {
        let pnpm_virtual_store = detect_pnpm_virtual_store(root);
        let mut modules = vec!["node_modules".into()];

        // With pnpm's default hoist-pattern most transitive deps get
        // symlinks under .pnpm/node_modules.
        if let Some(ref vs) = pnpm_virtual_store {
            let hoisted = vs.join("node_modules");
            if hoisted.is_dir() {
                modules.push(hoisted.to_string_lossy().into_owned());
            }
        }

        let entry_resolver = Resolver::new(ResolveOptions {
            extensions: vec![
                ".js".into(),
                ".mjs".into(),
                ".cjs".into(),
                ".json".into(),
                ".node".into(),
            ],
            condition_names: vec![
                "node".into(),
                "import".into(),
                "require".into(),
                "default".into(),
            ],
            main_fields: vec!["module".into(), "main".into()],
            modules,
            ..ResolveOptions::default()
        });

        Self {
            entry_resolver,
            pnpm_virtual_store,
        }
    }

    /// Locate `package` as required from `source_dir`.
    ///
    /// Tries Node's `node_modules` lookup through each ancestor first, then
    /// the pnpm virtual store, then resolves the package entry point and
    /// walks up to the manifest that owns it.
    pub fn package_dir(&self, source_dir: &Path, package: &str) -> Option<PathBuf> {
        find_in_node_modules(source_dir, package)
            .or_else(|| {
                self.pnpm_virtual_store
                    .as_deref()
                    .and_then(|vs| find_in_virtual_store(vs, package))
            })
            .or_else(|| self.entry_package_dir(source_dir, package))
    }

    fn entry_package_dir(&self, source_dir: &Path, package: &str) -> Option<PathBuf> {
        let entry = self
            .entry_resolver
            .resolve(source_dir, package)
            .ok()?
            .into_path_buf();
        owning_package_dir(&entry)
    }
}

/// The nearest ancestor of `entry` whose `package.json` has a `name`.
/// Nested manifests such as `dist/esm/package.json` holding only
/// `{"type":"module"}` are skipped.
fn owning_package_dir(entry: &Path) -> Option<PathBuf> {
    entry
        .ancestors()
        .skip(1)
        .filter(|dir| has_manifest(dir))
        .find(|dir| Manifest::read(dir).is_ok_and(|m| m.name.is_some()))
        .map(Path::to_path_buf)
}

fn find_in_node_modules(source_dir: &Path, package: &str) -> Option<PathBuf> {
    source_dir
        .ancestors()
        .filter(|dir| dir.file_name().is_none_or(|n| n != "node_modules"))
        .map(|dir| dir.join("node_modules").join(package))
        .find(|candidate| has_manifest(candidate))
}

/// Search the pnpm virtual store for `.pnpm/<encoded_name>@*/node_modules/<name>/`.
fn find_in_virtual_store(virtual_store: &Path, package: &str) -> Option<PathBuf> {
    // @scope/name -> @scope+name
    let encoded = package.replace('/', "+");

    let entries = fs::read_dir(virtual_store).ok()?;
    entries
        .flatten()
        .filter_map(|entry| {
            let dir_name = entry.file_name();
            // Match at the @ separator, not a prefix of a longer name.
            let version = dir_name
                .to_string_lossy()
                .strip_prefix(encoded.as_str())?
                .strip_prefix('@')
                .map(StoreVersion::parse)?;
            let dir = entry.path().join("node_modules").join(package);
            has_manifest(&dir).then_some((version, dir))
        })
        // Several installed versions: the highest wins.
        .max()
        .map(|(_, dir)| dir)
}

/// Version part of a virtual store entry, e.g. `1.10.0` in
/// `foo@1.10.0_react@18.2.0` or `2.0.0-beta.1` in `foo@2.0.0-beta.1`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct StoreVersion {
    numbers: Vec<u64>,
    /// Releases sort above their pre-releases.
    release: bool,
    pre: String,
}

impl StoreVersion {
    fn parse(raw: &str) -> Self {
        // pnpm appends peer suffixes as `_peer@x` or `(peer@x)`.
        let raw = raw.split(['_', '(']).next().unwrap_or(raw);
        let (core, pre) = raw.split_once('-').unwrap_or((raw, ""));
        let core = core.split_once('+').map_or(core, |(c, _)| c);
        Self {
            numbers: core.split('.').map(|n| n.parse().unwrap_or(0)).collect(),
            release: pre.is_empty(),
            pre: pre.to_string(),
        }
    }
}

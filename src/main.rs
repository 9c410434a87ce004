use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use depth::config::TreeConfig;
use depth::error::Error;
use depth::fixture::FixtureResolver;
use depth::npm::NpmResolver;
use depth::resolver::Resolver;
use depth::tree::Tree;
use depth::{query, report};

#[derive(Parser, Debug)]
#[command(name = "depth", version, about = "Visualize the dependency tree of npm packages")]
struct Cli {
    /// Package names or package directories to resolve
    #[arg(required = true)]
    names: Vec<String>,

    /// Resolve dependencies of internal (Node.js builtin) modules
    #[arg(long, env = "DEPTH_INTERNAL")]
    internal: bool,

    /// Also resolve devDependencies
    #[arg(long, env = "DEPTH_TEST")]
    test: bool,

    /// Maximum depth of dependencies to resolve (0 for unlimited)
    #[arg(long, default_value_t = 0, env = "DEPTH_MAX")]
    max: usize,

    /// Only resolve packages whose name contains one of these substrings
    #[arg(long, visible_alias = "pattern", value_delimiter = ',', env = "DEPTH_INCLUDE")]
    include: Vec<String>,

    /// Never resolve packages whose name contains one of these substrings
    #[arg(long, value_delimiter = ',', env = "DEPTH_EXCLUDE")]
    exclude: Vec<String>,

    /// Output the tree as JSON
    #[arg(long)]
    json: bool,

    /// Show every path from the root to this package
    #[arg(long, value_name = "NAME", conflicts_with = "json")]
    explain: Option<String>,

    /// Show time spent resolving each package
    #[arg(long)]
    elapsed: bool,

    /// Limit the number of resolver threads
    #[arg(long, env = "DEPTH_JOBS")]
    jobs: Option<usize>,

    /// Directory to resolve packages from [default: current directory]
    #[arg(long, env = "DEPTH_DIR")]
    dir: Option<PathBuf>,

    /// Resolve against a JSON fixture graph instead of node_modules
    #[arg(long, env = "DEPTH_FIXTURE")]
    fixture: Option<PathBuf>,
}

impl Cli {
    fn tree_config(&self) -> Result<TreeConfig, Error> {
        TreeConfig::builder()
            .resolve_internal(self.internal)
            .resolve_test(self.test)
            .max_depth(self.max)
            .include(self.include.iter().cloned())
            .exclude(self.exclude.iter().cloned())
            .jobs(self.jobs)
            .build()
    }
}

/// A run-ending error, tagged with the root it happened on.
struct Failure {
    root: Option<String>,
    error: Error,
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self { root: None, error }
    }
}

impl From<io::Error> for Failure {
    fn from(e: io::Error) -> Self {
        Error::Output(e).into()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DEPTH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure { root, error }) => {
            match root {
                Some(name) => eprintln!("'{name}': FATAL: {error}"),
                None => eprintln!("error: {error}"),
            }
            if let Some(hint) = error.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Failure> {
    let config = cli.tree_config()?;
    let source_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(Error::WorkingDir)?,
    };

    let resolver: Box<dyn Resolver> = match &cli.fixture {
        Some(path) => Box::new(FixtureResolver::load(path)?),
        None => Box::new(NpmResolver::new(&source_dir)),
    };
    let tree = Tree::new(config, resolver)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in &cli.names {
        let start = Instant::now();
        let root = tree.resolve(name, &source_dir).map_err(|error| Failure {
            root: Some(name.clone()),
            error,
        })?;
        let elapsed = start.elapsed();

        if cli.json {
            report::write_json(&mut out, &root)?;
            continue;
        }

        if let Some(target) = &cli.explain {
            report::write_explain(&mut out, &query::explain(&root, target))?;
            continue;
        }

        report::write_tree(&mut out, &root, cli.elapsed)?;
        report::write_summary(&mut out, &query::summarize(&root))?;
        out.flush()?;
        eprintln!("Resolved <{name}> in {}", report::format_elapsed(elapsed));
    }
    Ok(())
}

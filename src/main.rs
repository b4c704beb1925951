//! docgen — generate Markdown API docs from JSDoc comments.
//!
//! `docgen -i . -o docs` parses `src/**` and writes one page per documented
//! identifier, mirroring the source tree under `docs/`.

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use docgen::{BuildConfig, CliSettings};

#[derive(Parser)]
#[command(
    name = "docgen",
    about = "Generate a tree of Markdown API docs from JSDoc comments"
)]
struct Cli {
    /// Only parse these files instead of the whole source tree.
    files: Vec<PathBuf>,

    /// Project directory (default: config file directory or the current one)
    #[arg(short = 'i', long)]
    input_dir: Option<PathBuf>,

    /// Source subdirectory not mirrored into the output tree (default: src)
    #[arg(short = 'p', long)]
    input_dir_prefix: Option<PathBuf>,

    /// Output directory (default: <input-dir>/docs)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Merge the generated tree into this directory afterwards
    #[arg(short = 'c', long)]
    copy_to_dir: Option<PathBuf>,

    /// Documentation site adapter, e.g. docusaurus
    #[arg(short = 'd', long)]
    documentor: Option<String>,

    /// Prefix for every sidebar entry
    #[arg(short = 's', long)]
    sidebar_header: Option<String>,

    /// Manifest section the sidebar entries go under (default: docs)
    #[arg(long)]
    section_key: Option<String>,

    /// Manifest path relative to the output directory (default: sidebars.json)
    #[arg(long)]
    manifest_path: Option<PathBuf>,

    /// Copy the manifest here as well
    #[arg(long)]
    manifest_copy_to: Option<PathBuf>,

    /// Render only these kinds. Can be specified multiple times.
    #[arg(short = 'k', long = "kind")]
    kinds: Vec<String>,

    /// Glob pattern of sources to parse. Can be specified multiple times.
    #[arg(long = "pattern")]
    patterns: Vec<String>,

    /// Config file (default: ./docgen.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log every build step
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = env::current_dir().context("failed to read current directory")?;
    let mut config = match &cli.config {
        Some(path) => BuildConfig::load(&absolutize(&cwd, path))
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => BuildConfig::discover(&cwd)
            .context("failed to load config file")?
            .unwrap_or_default(),
    };
    if config.input_dir.is_none() {
        config.input_dir = Some(cwd.clone());
    }

    config.apply(CliSettings {
        input_dir: cli.input_dir.map(|p| absolutize(&cwd, &p)),
        input_dir_prefix: cli.input_dir_prefix,
        output_dir: cli.output_dir.map(|p| absolutize(&cwd, &p)),
        copy_to_dir: cli.copy_to_dir,
        patterns: cli.patterns,
        files: cli.files.iter().map(|p| absolutize(&cwd, p)).collect(),
        kinds: cli.kinds,
        documentor: cli.documentor,
        sidebar_header: cli.sidebar_header,
        section_key: cli.section_key,
        manifest_path: cli.manifest_path,
        manifest_copy_to: cli.manifest_copy_to.map(|p| absolutize(&cwd, &p)),
    });

    let resolved = config.resolve()?;
    let output_dir = resolved.output_dir.clone();
    docgen::build_resolved(resolved).context("documentation build failed")?;
    println!("Documentation generated in {}", output_dir.display());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "docgen=debug" } else { "docgen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve `path` against `cwd`; `components()` also drops `.` segments.
fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    cwd.join(path).components().collect()
}

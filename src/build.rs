//! Build orchestration: parse, index, render, decorate, write, finalize.
//!
//! A build moves through [`BuildState`] in order and either reaches
//! [`BuildState::Done`] or stops in [`BuildState::Aborted`] on the first
//! error. Files written before an abort stay on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::adapter::SiteAdapter;
use crate::artifact::ArtifactRenderer;
use crate::config::{BuildConfig, ResolvedConfig, Sources};
use crate::error::{BuildError, Result};
use crate::fsutil;
use crate::index::{IndexEntry, KindIndex};
use crate::manifest::ManifestAccumulator;
use crate::model::{IdentifierRecord, Kind};
use crate::parser::{self, CommentParser, ParseError, SourceParser};
use crate::path_map::PathMapper;
use crate::template::{SelectorRenderer, TemplateRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Configuring,
    Parsing,
    Indexing,
    Rendering,
    Finalizing,
    Done,
    Aborted,
}

/// What a finished build produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Every artifact written, in render order.
    pub files: Vec<PathBuf>,
    /// The manifest, when the site adapter produced one.
    pub manifest: Option<PathBuf>,
    /// The directory the output tree was merged into.
    pub copied_to: Option<PathBuf>,
}

/// Drives one build with a pluggable parser and template renderer.
pub struct DocBuild<'a, P: CommentParser + ?Sized, R: TemplateRenderer + ?Sized> {
    parser: &'a P,
    renderer: &'a R,
    state: BuildState,
}

impl<'a, P: CommentParser + ?Sized, R: TemplateRenderer + ?Sized> DocBuild<'a, P, R> {
    pub fn new(parser: &'a P, renderer: &'a R) -> Self {
        Self {
            parser,
            renderer,
            state: BuildState::Configuring,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Validate `config` and run the build.
    pub fn run(&mut self, config: &BuildConfig) -> Result<BuildReport> {
        self.enter(BuildState::Configuring);
        match config.resolve() {
            Ok(resolved) => self.execute(resolved),
            Err(e) => {
                self.enter(BuildState::Aborted);
                Err(e)
            }
        }
    }

    /// Run the build from an already validated configuration.
    pub fn execute(&mut self, config: ResolvedConfig) -> Result<BuildReport> {
        let result = self.stages(&config);
        match &result {
            Ok(_) => self.enter(BuildState::Done),
            Err(e) => {
                tracing::debug!(error = %e, "build aborted");
                self.enter(BuildState::Aborted);
            }
        }
        result
    }

    fn enter(&mut self, next: BuildState) {
        tracing::debug!(from = ?self.state, to = ?next, "build state");
        self.state = next;
    }

    fn stages(&mut self, config: &ResolvedConfig) -> Result<BuildReport> {
        self.enter(BuildState::Parsing);
        let files = match &config.sources {
            Sources::Patterns(patterns) => parser::expand_globs(patterns, &config.input_dir)
                .map_err(|e| match e {
                    ParseError::Pattern { .. } => BuildError::Config(e.to_string()),
                    other => other.into(),
                })?,
            Sources::Files(files) => files.clone(),
        };
        tracing::debug!(count = files.len(), "parsing source files");
        let records = self.parser.parse(&files)?;

        let mut report = BuildReport::default();
        if records.is_empty() {
            tracing::info!("no documented identifiers found");
            return Ok(report);
        }

        self.enter(BuildState::Indexing);
        let mapper = PathMapper::new(&config.root);
        let index = KindIndex::build(&records, &mapper)?;
        tracing::debug!(records = records.len(), items = index.len(), "indexed");

        self.enter(BuildState::Rendering);
        let adapter = SiteAdapter::from_config(config.documentor.as_ref());
        let mut manifest = ManifestAccumulator::new();
        report.files = self.render_all(config, &records, &index, &adapter, &mut manifest)?;

        self.enter(BuildState::Finalizing);
        if let Some(json) = manifest.finalize() {
            report.manifest = Some(write_manifest(config, &json)?);
        }
        if let Some(copy_to) = config.copy_to_dir.as_ref().filter(|_| config.output_dir.is_dir()) {
            let copied = fsutil::merge_dir(&config.output_dir, copy_to)?;
            tracing::debug!(count = copied.len(), to = %copy_to.display(), "merged output");
            report.copied_to = Some(copy_to.clone());
        }

        tracing::info!(
            files = report.files.len(),
            output = %config.output_dir.display(),
            "documentation generated"
        );
        Ok(report)
    }

    fn render_all(
        &self,
        config: &ResolvedConfig,
        records: &[IdentifierRecord],
        index: &KindIndex,
        adapter: &SiteAdapter,
        manifest: &mut ManifestAccumulator,
    ) -> Result<Vec<PathBuf>> {
        let artifacts = ArtifactRenderer::new(self.renderer, records);
        let mut claimed = HashSet::new();
        let mut written = Vec::new();

        for kind in index.kinds() {
            if !config.includes(kind) {
                tracing::debug!(kind = %kind, "skipping kind");
                continue;
            }
            for entry in index.get(kind) {
                let dir = output_subdir(&config.output_dir, &entry.dir);
                fsutil::ensure_dir(&dir)?;

                let stem = claim_stem(&dir, kind, entry, &mut claimed);
                let target = artifacts
                    .render(kind, &entry.name, &entry.dir, &stem)
                    .map_err(|source| BuildError::Render {
                        kind: kind.to_string(),
                        name: entry.name.clone(),
                        source,
                    })?;
                let target = adapter.decorate(target, manifest);

                let path = dir.join(format!("{stem}.md"));
                fsutil::write_file(&path, &target.body)?;
                tracing::debug!(kind = %kind, path = %path.display(), "wrote artifact");
                written.push(path);
            }
        }
        Ok(written)
    }
}

fn output_subdir(output_dir: &Path, dir: &str) -> PathBuf {
    if dir.is_empty() {
        output_dir.to_path_buf()
    } else {
        output_dir.join(dir)
    }
}

/// Pick a file stem in `dir` no earlier item of this build has used:
/// `{name}`, then `{name}.{kind}`, then `{name}.{kind}.2`, `.3`, ...
fn claim_stem(
    dir: &Path,
    kind: &Kind,
    entry: &IndexEntry,
    claimed: &mut HashSet<PathBuf>,
) -> String {
    let base = file_stem(&entry.name);
    let mut stem = base.clone();
    let mut attempt = 1;
    while !claimed.insert(dir.join(format!("{stem}.md"))) {
        attempt += 1;
        stem = match attempt {
            2 => format!("{base}.{kind}"),
            n => format!("{base}.{kind}.{}", n - 1),
        };
    }
    if attempt > 1 {
        tracing::warn!(
            name = %entry.name,
            kind = %kind,
            file = %format!("{stem}.md"),
            "output path already used, writing under another name"
        );
    }
    stem
}

// Identifier names such as `module:utils/string` must not create directories
fn file_stem(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

fn write_manifest(config: &ResolvedConfig, json: &str) -> Result<PathBuf> {
    let manifest_path = config
        .documentor
        .as_ref()
        .map(|doc| doc.manifest_path())
        .unwrap_or_else(|| Path::new("sidebars.json"));
    let path = config.output_dir.join(manifest_path);
    if let Some(parent) = path.parent() {
        fsutil::ensure_dir(parent)?;
    }
    fsutil::write_file(&path, json)?;
    tracing::debug!(path = %path.display(), "wrote manifest");

    if let Some(copy_to) = config.documentor.as_ref().and_then(|d| d.manifest_copy_to.as_ref()) {
        let target = fsutil::copy_file(&path, copy_to)?;
        tracing::debug!(path = %target.display(), "copied manifest");
    }
    Ok(path)
}

/// Build with the built-in source parser and selector renderer.
pub fn build(config: &BuildConfig) -> Result<BuildReport> {
    build_resolved(config.resolve()?)
}

/// [`build`] for a configuration the caller already resolved.
pub fn build_resolved(resolved: ResolvedConfig) -> Result<BuildReport> {
    let renderer = SelectorRenderer::new(PathMapper::new(&resolved.root));
    DocBuild::new(&SourceParser, &renderer).execute(resolved)
}

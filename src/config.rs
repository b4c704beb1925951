//! Build configuration.
//!
//! Settings come from an optional `docgen.toml` and from command-line
//! flags; flags win. [`BuildConfig::resolve`] validates the result and
//! fills in defaults before a build starts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BuildError, Result};
use crate::model::Kind;
use crate::path_map::normalize;

/// Configuration filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "docgen.toml";

const DEFAULT_PREFIX: &str = "src";
const DEFAULT_OUTPUT_DIR: &str = "docs";
const DEFAULT_SECTION_KEY: &str = "docs";
const DEFAULT_MANIFEST_PATH: &str = "sidebars.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Site adapter settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentorConfig {
    /// Adapter identifier, e.g. `docusaurus`.
    pub name: Option<String>,
    /// Manifest section the navigation entries go under.
    pub section_key: Option<String>,
    /// Prefix for every navigation path.
    pub header: Option<String>,
    /// Manifest location relative to the output directory.
    pub manifest_path: Option<PathBuf>,
    /// Extra location the manifest is copied to.
    pub manifest_copy_to: Option<PathBuf>,
}

impl DocumentorConfig {
    pub fn section_key(&self) -> &str {
        self.section_key.as_deref().unwrap_or(DEFAULT_SECTION_KEY)
    }

    pub fn manifest_path(&self) -> &Path {
        self.manifest_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MANIFEST_PATH))
    }
}

/// Unvalidated build settings.
///
/// Relative paths resolve against `input_dir`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project directory (required).
    pub input_dir: Option<PathBuf>,
    /// Source subdirectory that is not mirrored into the output tree.
    pub input_dir_prefix: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Directory the whole output tree is merged into after the build.
    pub copy_to_dir: Option<PathBuf>,
    /// Glob patterns, files or directories to parse. Defaults to the
    /// prefix directory.
    pub patterns: Vec<String>,
    /// Explicit subset of files to parse; overrides `patterns`.
    #[serde(skip)]
    pub files: Vec<PathBuf>,
    /// Kind tags to render. Empty selects every top-level kind.
    pub kinds: Vec<String>,
    pub documentor: Option<DocumentorConfig>,
}

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub input_dir: Option<PathBuf>,
    pub input_dir_prefix: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub copy_to_dir: Option<PathBuf>,
    pub patterns: Vec<String>,
    pub files: Vec<PathBuf>,
    pub kinds: Vec<String>,
    pub documentor: Option<String>,
    pub sidebar_header: Option<String>,
    pub section_key: Option<String>,
    pub manifest_path: Option<PathBuf>,
    pub manifest_copy_to: Option<PathBuf>,
}

impl BuildConfig {
    /// Load a TOML config file. Relative paths in the file resolve against
    /// the file's directory.
    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: BuildConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.input_dir = Some(match config.input_dir.take() {
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        });
        if let Some(out) = config.output_dir.take() {
            config.output_dir = Some(base.join(out));
        }
        if let Some(copy) = config.copy_to_dir.take() {
            config.copy_to_dir = Some(base.join(copy));
        }
        if let Some(doc) = config.documentor.as_mut() {
            if let Some(copy) = doc.manifest_copy_to.take() {
                doc.manifest_copy_to = Some(base.join(copy));
            }
        }
        Ok(config)
    }

    /// Look for [`CONFIG_FILENAME`] in `dir`.
    pub fn discover(dir: &Path) -> std::result::Result<Option<Self>, ConfigError> {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            Self::load(&candidate).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Override loaded values with non-empty CLI settings.
    pub fn apply(&mut self, cli: CliSettings) {
        if cli.input_dir.is_some() {
            self.input_dir = cli.input_dir;
        }
        if cli.input_dir_prefix.is_some() {
            self.input_dir_prefix = cli.input_dir_prefix;
        }
        if cli.output_dir.is_some() {
            self.output_dir = cli.output_dir;
        }
        if cli.copy_to_dir.is_some() {
            self.copy_to_dir = cli.copy_to_dir;
        }
        if !cli.patterns.is_empty() {
            self.patterns = cli.patterns;
        }
        if !cli.files.is_empty() {
            self.files = cli.files;
        }
        if !cli.kinds.is_empty() {
            self.kinds = cli.kinds;
        }

        let touches_documentor = cli.documentor.is_some()
            || cli.sidebar_header.is_some()
            || cli.section_key.is_some()
            || cli.manifest_path.is_some()
            || cli.manifest_copy_to.is_some();
        if touches_documentor {
            let doc = self.documentor.get_or_insert_with(DocumentorConfig::default);
            if cli.documentor.is_some() {
                doc.name = cli.documentor;
            }
            if cli.sidebar_header.is_some() {
                doc.header = cli.sidebar_header;
            }
            if cli.section_key.is_some() {
                doc.section_key = cli.section_key;
            }
            if cli.manifest_path.is_some() {
                doc.manifest_path = cli.manifest_path;
            }
            if cli.manifest_copy_to.is_some() {
                doc.manifest_copy_to = cli.manifest_copy_to;
            }
        }
    }

    /// Validate and fill in defaults.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let input_dir = self
            .input_dir
            .clone()
            .ok_or_else(|| BuildError::Config("an input directory is required".to_string()))?;
        if !input_dir.is_absolute() {
            return Err(BuildError::Config(format!(
                "input directory must be absolute: {}",
                input_dir.display()
            )));
        }

        let prefix = self
            .input_dir_prefix
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFIX));
        let root = input_dir.join(prefix);
        let output_dir = normalize(
            &input_dir.join(
                self.output_dir
                    .as_deref()
                    .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR)),
            ),
        );
        let copy_to_dir = self
            .copy_to_dir
            .as_ref()
            .map(|dir| normalize(&input_dir.join(dir)));
        if let Some(copy) = copy_to_dir.as_ref().filter(|c| c.starts_with(&output_dir)) {
            return Err(BuildError::Config(format!(
                "copy directory {} is inside the output directory",
                copy.display()
            )));
        }

        let sources = if !self.files.is_empty() {
            Sources::Files(self.files.iter().map(|f| input_dir.join(f)).collect())
        } else if !self.patterns.is_empty() {
            Sources::Patterns(self.patterns.clone())
        } else {
            Sources::Patterns(vec![root.to_string_lossy().into_owned()])
        };

        let documentor = self.documentor.clone().map(|mut doc| {
            doc.manifest_copy_to = doc.manifest_copy_to.map(|p| input_dir.join(p));
            doc
        });

        Ok(ResolvedConfig {
            root,
            output_dir,
            copy_to_dir,
            sources,
            kinds: self.kinds.iter().map(|k| Kind::from_tag(k)).collect(),
            documentor,
            input_dir,
        })
    }
}

/// Where the parser's input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sources {
    /// Glob patterns, files or directories, relative to the input directory.
    Patterns(Vec<String>),
    /// Explicit, already resolved file list.
    Files(Vec<PathBuf>),
}

/// Validated configuration with absolute paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub input_dir: PathBuf,
    /// `input_dir` joined with the prefix; source paths are mirrored
    /// relative to this.
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub copy_to_dir: Option<PathBuf>,
    pub sources: Sources,
    pub kinds: Vec<Kind>,
    pub documentor: Option<DocumentorConfig>,
}

impl ResolvedConfig {
    /// Whether items of `kind` are rendered.
    pub fn includes(&self, kind: &Kind) -> bool {
        if self.kinds.is_empty() {
            // rendered inside their parent's page unless selected
            !matches!(kind, Kind::Constructor | Kind::Member)
        } else {
            self.kinds.contains(kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn abs(p: &str) -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(format!("C:{}", p))
        } else {
            PathBuf::from(p)
        }
    }

    #[test]
    fn missing_input_dir_is_a_config_error() {
        let err = BuildConfig::default().resolve().unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn relative_input_dir_is_rejected() {
        let config = BuildConfig {
            input_dir: Some(PathBuf::from("proj")),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(BuildError::Config(_))));
    }

    #[test]
    fn defaults() {
        let config = BuildConfig {
            input_dir: Some(abs("/proj")),
            ..Default::default()
        };
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.root, abs("/proj").join("src"));
        assert_eq!(resolved.output_dir, abs("/proj").join("docs"));
        assert_eq!(resolved.copy_to_dir, None);
        assert_eq!(
            resolved.sources,
            Sources::Patterns(vec![abs("/proj").join("src").to_string_lossy().into_owned()])
        );
        assert!(resolved.includes(&Kind::Function));
        assert!(resolved.includes(&Kind::Module));
        assert!(resolved.includes(&Kind::Other("callback".into())));
        assert!(!resolved.includes(&Kind::Member));
        assert!(!resolved.includes(&Kind::Constructor));
    }

    #[test]
    fn relative_paths_resolve_against_input_dir() {
        let config = BuildConfig {
            input_dir: Some(abs("/proj")),
            output_dir: Some(PathBuf::from("out")),
            copy_to_dir: Some(PathBuf::from("external-docs")),
            files: vec![PathBuf::from("src/a.js")],
            ..Default::default()
        };
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.output_dir, abs("/proj").join("out"));
        assert_eq!(resolved.copy_to_dir, Some(abs("/proj").join("external-docs")));
        assert_eq!(resolved.sources, Sources::Files(vec![abs("/proj").join("src/a.js")]));
    }

    #[test]
    fn copy_dir_inside_output_is_rejected() {
        let config = BuildConfig {
            input_dir: Some(abs("/proj")),
            copy_to_dir: Some(PathBuf::from("docs/mirror")),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(BuildError::Config(_))));
    }

    #[test]
    fn copy_dir_inside_output_is_rejected_after_dot_segments() {
        let config = BuildConfig {
            input_dir: Some(abs("/proj")),
            output_dir: Some(PathBuf::from("./docs")),
            copy_to_dir: Some(PathBuf::from("docs/../docs/mirror")),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(BuildError::Config(_))));
    }

    #[test]
    fn copy_dir_next_to_output_is_accepted() {
        let config = BuildConfig {
            input_dir: Some(abs("/proj")),
            copy_to_dir: Some(PathBuf::from("docs/../mirror")),
            ..Default::default()
        };
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.copy_to_dir, Some(abs("/proj").join("mirror")));
    }

    #[test]
    fn explicit_kinds_replace_defaults() {
        let config = BuildConfig {
            input_dir: Some(abs("/proj")),
            kinds: vec!["module".to_string(), "member".to_string()],
            ..Default::default()
        };
        let resolved = config.resolve().unwrap();
        assert!(resolved.includes(&Kind::Member));
        assert!(!resolved.includes(&Kind::Function));
    }

    #[test]
    fn cli_overrides_file() {
        let mut config = BuildConfig {
            input_dir: Some(abs("/proj")),
            output_dir: Some(PathBuf::from("from-file")),
            documentor: Some(DocumentorConfig {
                name: Some("docusaurus".to_string()),
                header: Some("file-header".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        config.apply(CliSettings {
            output_dir: Some(PathBuf::from("from-cli")),
            sidebar_header: Some("api".to_string()),
            ..Default::default()
        });

        assert_eq!(config.output_dir, Some(PathBuf::from("from-cli")));
        let doc = config.documentor.unwrap();
        assert_eq!(doc.name.as_deref(), Some("docusaurus"));
        assert_eq!(doc.header.as_deref(), Some("api"));
        assert_eq!(doc.section_key(), "docs");
        assert_eq!(doc.manifest_path(), Path::new("sidebars.json"));
    }

    #[test]
    fn load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
input_dir_prefix = "lib"
output_dir = "api-docs"
kinds = ["class", "function"]

[documentor]
name = "docusaurus"
header = "api"
manifest_copy_to = "website/sidebars.json"
"#,
        )
        .unwrap();

        let config = BuildConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(config.input_dir.as_deref(), Some(dir.path()));
        assert_eq!(config.output_dir, Some(dir.path().join("api-docs")));
        assert_eq!(config.kinds, vec!["class", "function"]);
        let doc = config.documentor.unwrap();
        assert_eq!(doc.manifest_copy_to, Some(dir.path().join("website/sidebars.json")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "outptu_dir = \"typo\"\n").unwrap();
        assert!(matches!(
            BuildConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn no_config_file_is_fine() {
        let dir = TempDir::new().unwrap();
        assert!(BuildConfig::discover(dir.path()).unwrap().is_none());
    }
}

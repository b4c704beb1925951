//! docgen: turn JSDoc-annotated sources into a tree of Markdown files.
//!
//! Every documented identifier becomes `{output}/{dir}/{name}.md`, where
//! `dir` mirrors the identifier's source directory below the input root.
//! A site adapter can decorate each page and collect a navigation manifest
//! (`sidebars.json` for Docusaurus).
//!
//! ```no_run
//! use docgen::BuildConfig;
//!
//! let config = BuildConfig {
//!     input_dir: Some("/proj".into()),
//!     ..Default::default()
//! };
//! let report = docgen::build(&config)?;
//! println!("{} files", report.files.len());
//! # Ok::<(), docgen::BuildError>(())
//! ```

pub mod adapter;
pub mod artifact;
pub mod build;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod index;
pub mod manifest;
pub mod model;
pub mod parser;
pub mod path_map;
pub mod template;
pub mod toc;

pub use build::{build, build_resolved, BuildReport, BuildState, DocBuild};
pub use config::{BuildConfig, CliSettings, DocumentorConfig, ResolvedConfig};
pub use error::{BuildError, Result};
pub use model::{IdentifierRecord, Kind};
pub use parser::{CommentParser, SourceParser};
pub use template::{SelectorRenderer, TemplateRenderer};

//! Source discovery and dispatch by file extension.

pub mod jsdoc;
pub mod json;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::model::IdentifierRecord;

/// File extensions scanned when a directory is given as input.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid template data in {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported file type: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("invalid glob pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Turns a list of input files into identifier records, in file order.
pub trait CommentParser {
    fn parse(&self, files: &[PathBuf]) -> Result<Vec<IdentifierRecord>, ParseError>;
}

/// The built-in [`CommentParser`]: JSDoc comments for script sources,
/// template data for `.json` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceParser;

impl CommentParser for SourceParser {
    fn parse(&self, files: &[PathBuf]) -> Result<Vec<IdentifierRecord>, ParseError> {
        let mut records = Vec::new();
        for path in files {
            let content = fs::read_to_string(path).map_err(|source| ParseError::Read {
                path: path.clone(),
                source,
            })?;
            records.extend(parse_file(path, &content)?);
        }
        Ok(records)
    }
}

/// Parse one file's content based on its extension.
pub fn parse_file(path: &Path, content: &str) -> Result<Vec<IdentifierRecord>, ParseError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => json::parse(content).map_err(|source| ParseError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Some(ext) if SOURCE_EXTENSIONS.contains(&ext) => Ok(jsdoc::parse(content, Some(path))),
        _ => Err(ParseError::Unsupported(path.to_path_buf())),
    }
}

/// Expand glob patterns into a list of real file paths.
///
/// Plain files are taken as given; directories are scanned recursively for
/// [`SOURCE_EXTENSIONS`]. Relative patterns resolve against `base`.
pub fn expand_globs(patterns: &[String], base: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = base.join(pattern);
        if path.is_file() {
            files.push(path);
            continue;
        }
        if path.is_dir() {
            files.extend(scan_dir(&path));
            continue;
        }

        let full = path.to_string_lossy();
        let matches: Vec<_> = glob::glob(&full)
            .map_err(|source| ParseError::Pattern {
                pattern: pattern.clone(),
                source,
            })?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            tracing::warn!(pattern = %pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn scan_dir(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            !e.path()
                .components()
                .any(|c| c.as_os_str() == "node_modules")
        })
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
        })
        .map(|e| e.into_path())
        .collect()
}

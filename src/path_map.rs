//! Mirror an identifier's source location into the output tree.

use std::path::{Component, Path, PathBuf};

use crate::error::{BuildError, Result};

/// Maps source files below `root` to output subdirectories.
///
/// `root` is the input directory joined with the input prefix, so
/// `/proj` + `src` turns `/proj/src/lib/foo.js` into `lib`.
#[derive(Debug, Clone)]
pub struct PathMapper {
    root: PathBuf,
}

impl PathMapper {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize(root.as_ref()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of `source` relative to the root, `/`-separated.
    ///
    /// An absent source maps to the empty string (the output root). A
    /// source that resolves outside the root is an error.
    pub fn map(&self, source: Option<&Path>) -> Result<String> {
        let Some(source) = source else {
            return Ok(String::new());
        };

        let resolved = normalize(&self.root.join(source));
        let relative = resolved
            .strip_prefix(&self.root)
            .map_err(|_| BuildError::OutsideRoot {
                path: source.to_path_buf(),
                root: self.root.clone(),
            })?;

        let dir = relative.parent().unwrap_or_else(|| Path::new(""));
        let parts: Vec<String> = dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

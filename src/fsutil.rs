//! Filesystem primitives used by the build.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// Create `dir` and its parents. An existing directory is not an error.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(BuildError::io("create directory", dir, e)),
    }
}

/// Write `contents` to `path`, replacing any existing file.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| BuildError::io("write", path, e))
}

/// Copy one file, creating the target's parent directories.
///
/// When `to` is an existing directory the file keeps its name inside it.
pub fn copy_file(from: &Path, to: &Path) -> Result<PathBuf> {
    let target = match from.file_name() {
        Some(name) if to.is_dir() => to.join(name),
        _ => to.to_path_buf(),
    };
    let copy_err = |source| BuildError::Copy {
        from: from.to_path_buf(),
        to: target.clone(),
        source,
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    fs::copy(from, &target).map_err(copy_err)?;
    Ok(target)
}

/// Recursively merge every file under `src` into `dest`, overwriting files
/// that already exist there. Returns the copied target paths.
pub fn merge_dir(src: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let copy_err = |source| BuildError::Copy {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    };
    fs::create_dir_all(dest).map_err(copy_err)?;

    let mut copied = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| copy_err(io::Error::from(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::Copy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                source,
            })?;
        }
        fs::copy(entry.path(), &target).map_err(|source| BuildError::Copy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            source,
        })?;
        copied.push(target);
    }
    Ok(copied)
}

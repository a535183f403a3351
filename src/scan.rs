//! Discovery of class directories in capture trees.
//!
//! A class directory is any directory that directly holds `.jpg` captures.
//! Trees are walked with `walkdir`, which iterates with its own stack, so
//! deeply nested inputs never grow the call stack.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::BricksetError;

pub const IMAGE_EXTENSION: &str = "jpg";

/// Finds every directory under `root` (inclusive) that directly contains at
/// least one capture, sorted by path.
///
/// Directories in `exclude` are pruned together with their subtrees; the
/// pipeline passes its output root here so exported links are never scanned
/// as captures.
pub fn find_class_dirs(root: &Path, exclude: &[PathBuf]) -> Result<Vec<PathBuf>, BricksetError> {
    if !root.is_dir() {
        return Err(BricksetError::Traverse {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let excluded: Vec<PathBuf> = exclude
        .iter()
        .filter_map(|path| fs::canonicalize(path).ok())
        .collect();

    let mut class_dirs = BTreeSet::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && is_excluded(entry.path(), &excluded)));

    for entry in walker {
        let entry = entry.map_err(|source| BricksetError::Traverse {
            path: root.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && is_capture(entry.path()) {
            if let Some(parent) = entry.path().parent() {
                class_dirs.insert(parent.to_path_buf());
            }
        }
    }

    Ok(class_dirs.into_iter().collect())
}

/// Lists the captures directly inside `dir`, sorted by path.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, BricksetError> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_capture(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn is_capture(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excluded: &[PathBuf]) -> bool {
    if excluded.is_empty() {
        return false;
    }
    fs::canonicalize(path)
        .map(|canonical| excluded.contains(&canonical))
        .unwrap_or(false)
}

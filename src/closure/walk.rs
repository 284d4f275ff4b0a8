use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::classifier::FileClassifier;
use crate::closure::FileSet;
use crate::error::WalkError;

/// Recursively collect files below `root` that `classifier` includes in `mode`.
///
/// Directories are keyed by canonical path in `visited`, so symlink cycles
/// terminate and repeated calls over overlapping roots do not rescan.
/// Classification gates files only; every subdirectory is descended.
///
/// A root that cannot be opened is an error. Unreadable subdirectories are
/// logged and skipped.
pub fn find_files(
    root: &Path,
    classifier: &FileClassifier,
    mode: &str,
    files: &mut FileSet,
    visited: &mut HashSet<PathBuf>,
) -> Result<(), WalkError> {
    let root_err = |source: std::io::Error| WalkError::Root {
        path: root.display().to_string(),
        source,
    };

    let real = root.canonicalize().map_err(root_err)?;
    if !real.is_dir() {
        return Err(WalkError::NotADirectory(root.display().to_string()));
    }

    let walker = WalkDir::new(&real)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            match entry.path().canonicalize() {
                Ok(dir) => visited.insert(dir),
                Err(e) => {
                    tracing::warn!(dir = %entry.path().display(), error = %e, "cannot resolve directory");
                    false
                }
            }
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(root_err(e.into())),
            Err(e) => {
                if e.loop_ancestor().is_some() {
                    tracing::debug!(error = %e, "skipping symlink loop");
                } else {
                    tracing::warn!(error = %e, "cannot list directory");
                }
                continue;
            }
        };

        if entry.file_type().is_file() && classifier.is_included(entry.path(), mode)? {
            let path = entry.path();
            files.insert(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
        }
    }

    Ok(())
}

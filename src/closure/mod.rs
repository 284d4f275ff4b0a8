//! Building the set of files in scope.
//!
//! - [`manifest`]: parse dependency manifests produced by the build tool.
//! - [`build_tool`]: run the build tool to obtain those manifests.
//! - [`walk`]: classify every file below a directory instead.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::error::ManifestError;

pub mod build_tool;
pub mod manifest;
pub mod walk;

/// Absolute, canonical file paths in scope for a run.
pub type FileSet = BTreeSet<PathBuf>;

/// Resolve `path` against `base` into an absolute path. Existing files are
/// canonicalized; missing ones are normalized lexically.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    let joined = base.join(path);
    joined
        .canonicalize()
        .unwrap_or_else(|_| lexical_normalize(&joined))
}

fn lexical_normalize(path: &Path) -> PathBuf {
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

/// File set from pre-generated manifests, unioned. Manifest paths that are
/// relative and missing from the working directory are taken from `build_dir`.
pub fn collect_from_manifests(
    build_dir: &Path,
    deps_file: Option<&Path>,
    targets_file: Option<&Path>,
) -> Result<FileSet, ManifestError> {
    let mut files = FileSet::new();
    if let Some(deps) = deps_file {
        manifest::parse_deps_file(&relative_to(build_dir, deps), build_dir, &mut files)?;
    }
    if let Some(targets) = targets_file {
        manifest::parse_targets_file(&relative_to(build_dir, targets), build_dir, &mut files)?;
    }
    Ok(files)
}

fn relative_to(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

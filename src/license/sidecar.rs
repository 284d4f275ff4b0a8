//! License inheritance from SPDX documents placed next to the sources.
//!
//! A directory carries a sidecar when it directly contains a `*.spdx` file or
//! a subdirectory with `spdx` in its name. Sidecars are SPDX tag-value
//! documents: `FileName:` sections attribute `LicenseConcluded:` /
//! `LicenseInfoInFile:` to one file, while `PackageLicenseConcluded:` /
//! `PackageLicenseDeclared:` cover every other file below the directory.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::closure::resolve_path;

const SIDECAR_SUFFIX: &str = ".spdx";
const SIDECAR_DIR_MARKER: &str = "spdx";

/// Identifiers extracted from the sidecar documents of one directory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SidecarDoc {
    pub package_ids: BTreeSet<String>,
    pub file_ids: HashMap<PathBuf, BTreeSet<String>>,
}

impl SidecarDoc {
    /// Merge one tag-value document. `FileName:` values are resolved
    /// against `base`.
    pub fn merge(&mut self, base: &Path, content: &str) {
        let mut current_file: Option<PathBuf> = None;

        for line in content.lines() {
            let Some((tag, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match tag.trim() {
                "FileName" => {
                    let name = value.trim_start_matches("./");
                    current_file = Some(resolve_path(base, Path::new(name)));
                }
                "PackageName" => current_file = None,
                "LicenseConcluded" | "LicenseInfoInFile" => {
                    if let (Some(file), true) = (&current_file, is_assertion(value)) {
                        self.file_ids
                            .entry(file.clone())
                            .or_default()
                            .insert(value.to_string());
                    }
                }
                "PackageLicenseConcluded" | "PackageLicenseDeclared" => {
                    if is_assertion(value) {
                        self.package_ids.insert(value.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    /// Identifiers inherited by `file`: its own section if it has one,
    /// otherwise the package-level identifiers.
    pub fn ids_for(&self, file: &Path) -> BTreeSet<String> {
        self.file_ids
            .get(file)
            .cloned()
            .unwrap_or_else(|| self.package_ids.clone())
    }
}

fn is_assertion(value: &str) -> bool {
    !value.is_empty()
        && !value.eq_ignore_ascii_case("NOASSERTION")
        && !value.eq_ignore_ascii_case("NONE")
}

/// Per-directory memo of sidecar lookups.
///
/// `own` records what a directory itself holds; `nearest` maps a directory to
/// the closest ancestor (or itself) holding a sidecar, so siblings resolve
/// without touching the file system again.
#[derive(Debug, Default)]
pub struct SpdxSidecarCache {
    own: HashMap<PathBuf, Option<Arc<SidecarDoc>>>,
    nearest: HashMap<PathBuf, Option<PathBuf>>,
}

impl SpdxSidecarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers inherited by the absolute path `file`.
    pub fn lookup(&mut self, file: &Path) -> BTreeSet<String> {
        let Some(dir) = file.parent() else {
            return BTreeSet::new();
        };
        let Some(holder) = self.nearest_sidecar(dir) else {
            return BTreeSet::new();
        };
        match self.own.get(&holder) {
            Some(Some(doc)) => doc.ids_for(file),
            _ => BTreeSet::new(),
        }
    }

    /// Number of directories whose listing has been read.
    #[cfg(test)]
    pub fn scanned_dirs(&self) -> usize {
        self.own.len()
    }

    fn nearest_sidecar(&mut self, dir: &Path) -> Option<PathBuf> {
        let mut visited = Vec::new();
        let mut current = Some(dir);

        let found = loop {
            let Some(d) = current else {
                break None;
            };
            if let Some(hit) = self.nearest.get(d) {
                break hit.clone();
            }
            visited.push(d.to_path_buf());
            if self.own_sidecar(d).is_some() {
                break Some(d.to_path_buf());
            }
            current = d.parent();
        };

        for d in visited {
            self.nearest.insert(d, found.clone());
        }
        found
    }

    fn own_sidecar(&mut self, dir: &Path) -> Option<Arc<SidecarDoc>> {
        if let Some(cached) = self.own.get(dir) {
            return cached.clone();
        }
        let doc = scan_dir(dir).map(Arc::new);
        self.own.insert(dir.to_path_buf(), doc.clone());
        doc
    }
}

/// Read the sidecar documents held directly by `dir`, if any.
fn scan_dir(dir: &Path) -> Option<SidecarDoc> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "cannot list directory for sidecars");
            return None;
        }
    };

    let mut documents = Vec::new();
    let mut found = false;

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if path.is_file() && name.ends_with(SIDECAR_SUFFIX) {
            found = true;
            documents.push(path);
        } else if path.is_dir() && name.contains(SIDECAR_DIR_MARKER) {
            found = true;
            documents.extend(sidecar_files_in(&path));
        }
    }

    if !found {
        return None;
    }

    documents.sort();
    let mut doc = SidecarDoc::default();
    for path in documents {
        match fs::read_to_string(&path) {
            Ok(content) => doc.merge(dir, &content),
            Err(e) => tracing::warn!(file = %path.display(), error = %e, "cannot read SPDX sidecar"),
        }
    }
    tracing::debug!(dir = %dir.display(), packages = doc.package_ids.len(), files = doc.file_ids.len(), "loaded SPDX sidecar");
    Some(doc)
}

fn sidecar_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .map(|n| n.to_string_lossy().to_lowercase().ends_with(SIDECAR_SUFFIX))
                    .unwrap_or(false)
        })
        .collect()
}

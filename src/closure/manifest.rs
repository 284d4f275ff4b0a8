//! Dependency manifest parsing.
//!
//! Two shapes are understood:
//!
//! ```text
//! # targets list: one path per line
//! ../src/main.c
//! ../include/app.h
//!
//! # dependency records: target line, then indented dependencies
//! app/main.c.obj: #deps 2, deps mtime 1700000000 (VALID)
//!     ../src/main.c
//!     ../include/app.h
//! ```

use std::path::Path;

use crate::closure::{resolve_path, FileSet};
use crate::error::ManifestError;

/// Classification of a single manifest line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// Blank or comment only.
    Empty,
    /// Non-indented, ends with `:` and an optional `# comment`.
    Target,
    /// Indented path with an optional trailing `# comment`.
    Dependency(&'a str),
    Invalid,
}

fn classify_line(raw: &str) -> Line<'_> {
    let line = raw.trim_end();
    let body = line.trim_start();

    if body.is_empty() || body.starts_with('#') {
        return Line::Empty;
    }

    if line.starts_with(char::is_whitespace) {
        let path = match body.find('#') {
            Some(pos) => body[..pos].trim_end(),
            None => body,
        };
        return Line::Dependency(path);
    }

    if is_target(line) {
        Line::Target
    } else {
        Line::Invalid
    }
}

fn is_target(line: &str) -> bool {
    line.ends_with(':')
        || line
            .match_indices(':')
            .any(|(i, _)| line[i + 1..].trim_start().starts_with('#'))
}

/// Parse Makefile-style dependency records, adding every dependency resolved
/// against `root` to `files`. `source` names the manifest in errors.
pub fn parse_deps(content: &str, source: &str, root: &Path, files: &mut FileSet) -> Result<(), ManifestError> {
    let mut in_target = false;

    for (index, raw) in content.lines().enumerate() {
        match classify_line(raw) {
            Line::Empty => {}
            Line::Target => in_target = true,
            Line::Dependency(path) if in_target => {
                files.insert(resolve_path(root, Path::new(path)));
            }
            Line::Dependency(_) | Line::Invalid => {
                return Err(ManifestError::Parse {
                    file: source.to_string(),
                    line: index + 1,
                });
            }
        }
    }

    Ok(())
}

/// Parse a flat list of paths. Blank lines, comments and target headers are skipped.
pub fn parse_targets(content: &str, root: &Path, files: &mut FileSet) {
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || is_target(line) {
            continue;
        }
        files.insert(resolve_path(root, Path::new(line)));
    }
}

/// Read a dependency-records manifest from disk.
pub fn parse_deps_file(manifest: &Path, root: &Path, files: &mut FileSet) -> Result<(), ManifestError> {
    let content = read_manifest(manifest)?;
    parse_deps(&content, &manifest.display().to_string(), root, files)
}

/// Read a targets-list manifest from disk.
pub fn parse_targets_file(manifest: &Path, root: &Path, files: &mut FileSet) -> Result<(), ManifestError> {
    let content = read_manifest(manifest)?;
    parse_targets(&content, root, files);
    Ok(())
}

fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
        path: path.display().to_string(),
        source: e,
    })
}

//! Error types for each stage of a run.
//!
//! Configuration, manifest and build tool errors are fatal and bubble up to
//! `main` through `anyhow`. [`FileReadError`] and [`DetectError`] are
//! per-file and only move the file into the "no license detected" bucket.

use std::path::PathBuf;
use std::time::Duration;

/// Malformed or self-contradictory configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config {path}: {source}")]
    ParseYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON config {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unsupported config format for {0}: .{1}")]
    UnsupportedFormat(String, String),

    #[error("License text '{id}' has none of 'text', 'detect-text' or 'detect-pattern'")]
    MissingLicenseText { id: String },

    #[error("License text '{id}' is empty after normalization")]
    EmptyLicenseText { id: String },

    #[error("License text '{id}' has unbalanced <regex> delimiters")]
    UnbalancedRegex { id: String },

    #[error("Invalid pattern for {id}: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("License text for '{inner}' is part of '{outer}'; matching would depend on order")]
    AmbiguousLicenseText { inner: String, outer: String },

    #[error("File type #{index} has neither 'extensions' nor 'regexp'")]
    MissingFileTypePattern { index: usize },

    #[error("No file type rule matches '{path}' in mode '{mode}'; add a fallback rule")]
    NoFallbackRule { path: String, mode: String },
}

/// Failure while reading a dependency manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("{file}:{line}: Cannot parse dependency file")]
    Parse { file: String, line: usize },

    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while walking a directory tree.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("Cannot open walk root \"{path}\": {source}")]
    Root {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Walk root \"{0}\" is not a directory")]
    NotADirectory(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The external build tool could not produce a manifest.
#[derive(Debug, thiserror::Error)]
pub enum BuildToolError {
    #[error("Build directory \"{0}\" does not exist")]
    MissingBuildDirectory(String),

    #[error("Build directory \"{0}\" does not contain \"build.ninja\" file")]
    MissingBuildFile(String),

    #[error("Unable to start \"{command}\" command: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("\"{command}\" command timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("\"{command}\" command exited with error code {code}: {stderr}")]
    Exit {
        command: String,
        code: i32,
        stderr: String,
    },
}

/// A candidate file could not be opened or read.
#[derive(Debug, thiserror::Error)]
#[error("{}:0: Error reading file: {source}", .path.display())]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Per-file detection failure under the stricter tag policy.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("{}: file declares more than one identifier: {}", .path.display(), .ids.join(", "))]
    AmbiguousTag { path: PathBuf, ids: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parse_display() {
        let err = ManifestError::Parse {
            file: "deps.txt".to_string(),
            line: 7,
        };
        assert_eq!(err.to_string(), "deps.txt:7: Cannot parse dependency file");
    }

    #[test]
    fn test_build_tool_exit_includes_stderr() {
        let err = BuildToolError::Exit {
            command: "ninja -t deps".to_string(),
            code: 1,
            stderr: "ninja: error: loading 'build.ninja'".to_string(),
        };
        assert!(err.to_string().contains("loading 'build.ninja'"));
        assert!(err.to_string().contains("error code 1"));
    }

    #[test]
    fn test_ambiguous_tag_lists_ids() {
        let err = DetectError::AmbiguousTag {
            path: PathBuf::from("/src/a.c"),
            ids: vec!["MIT".to_string(), "BSD-3-Clause".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "/src/a.c: file declares more than one identifier: MIT, BSD-3-Clause"
        );
    }
}

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;

/// How a corpus entry recognizes its license in normalized file text.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Normalized literal, matched by substring containment.
    Literal(String),
    /// Literal segments interleaved with regex islands, matched by search.
    Pattern(Regex),
}

impl Matcher {
    /// Test already-normalized text.
    pub fn is_match(&self, normalized: &str) -> bool {
        match self {
            Matcher::Literal(text) => normalized.contains(text.as_str()),
            Matcher::Pattern(re) => re.is_match(normalized),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LicenseEntry {
    pub id: String,
    pub matcher: Matcher,
}

/// A compiled file classification rule.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    /// Anchored so that `is_match` is a full match of the path.
    pub pattern: Regex,
    pub applicability: HashSet<String>,
    pub category: String,
    pub exclude: bool,
}

/// A file in scope, with its content once read.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub content: Option<String>,
}

impl FileRecord {
    pub fn new(path: PathBuf) -> Self {
        Self { path, content: None }
    }
}

/// One finalized license bucket.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseBucket {
    /// Normalized (trimmed, lower-cased) identifier; empty for "no license detected".
    pub id: String,
    /// Identifier as first seen.
    pub display_name: String,
    pub files: BTreeSet<PathBuf>,
    pub count: usize,
}

/// Finalized result of a run, buckets in first-encounter order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total_files: usize,
    pub buckets: Vec<LicenseBucket>,
}

impl Report {
    pub fn bucket(&self, id: &str) -> Option<&LicenseBucket> {
        let key = id.trim().to_lowercase();
        self.buckets.iter().find(|b| b.id == key)
    }
}

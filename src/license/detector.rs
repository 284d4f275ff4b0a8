use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;

use crate::config::{Config, TagPolicy};
use crate::error::{ConfigError, DetectError};
use crate::license::corpus::Corpus;
use crate::license::sidecar::SpdxSidecarCache;

/// Detection session: owns the corpus, the tag matcher and the sidecar cache.
///
/// Runs three independent strategies per file and unions their results:
/// - explicit `SPDX-License-Identifier:` style tags,
/// - canonical license texts from the [`Corpus`],
/// - SPDX sidecar documents in an ancestor directory.
#[derive(Debug)]
pub struct Detector {
    corpus: Corpus,
    tag_re: Regex,
    tag_policy: TagPolicy,
    sidecars: SpdxSidecarCache,
}

impl Detector {
    pub fn new(corpus: Corpus, tag_marker: &str, tag_policy: TagPolicy) -> Result<Self, ConfigError> {
        Ok(Self {
            corpus,
            tag_re: tag_regex(tag_marker)?,
            tag_policy,
            sidecars: SpdxSidecarCache::new(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(Corpus::load(config)?, &config.tag_marker, config.multiple_tags)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// All identifiers found for `path` with content `text`. An empty set
    /// means nothing was detected.
    pub fn detect(&mut self, path: &Path, text: &str) -> Result<BTreeSet<String>, DetectError> {
        let tags = self.detect_tags(text);
        if self.tag_policy == TagPolicy::Reject && tags.len() > 1 {
            return Err(DetectError::AmbiguousTag {
                path: path.to_path_buf(),
                ids: tags,
            });
        }

        let mut ids: BTreeSet<String> = tags.into_iter().collect();
        ids.extend(self.detect_text(text));
        ids.extend(self.detect_sidecar(path));
        Ok(ids)
    }

    /// Identifiers declared by tags, in order of first appearance,
    /// de-duplicated case-insensitively.
    pub fn detect_tags(&self, text: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut ids = Vec::new();
        for caps in self.tag_re.captures_iter(text) {
            let id = caps[1].trim();
            if id.is_empty() {
                continue;
            }
            if seen.insert(id.to_lowercase()) {
                ids.push(id.to_string());
            }
        }
        ids
    }

    pub fn detect_text(&self, text: &str) -> BTreeSet<String> {
        self.corpus.matches(text).into_iter().map(str::to_string).collect()
    }

    pub fn detect_sidecar(&mut self, path: &Path) -> BTreeSet<String> {
        self.sidecars.lookup(path)
    }
}

/// `<marker>` followed by optional spaces/colon, capturing the identifier
/// expression up to the first character outside `[A-Za-z0-9 ().+-]`.
fn tag_regex(marker: &str) -> Result<Regex, ConfigError> {
    let pattern = format!(r"(?i){}\s*:?\s*([a-z0-9 ().+\-]+)", regex::escape(marker));
    Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
        id: "tag-marker".to_string(),
        source: e,
    })
}

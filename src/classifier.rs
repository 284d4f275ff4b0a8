use std::path::Path;

use regex::Regex;

use crate::config::{Config, FileType};
use crate::error::ConfigError;
use crate::models::ClassificationRule;

const DEFAULT_MODES: &str = "app,global";
const DEFAULT_CATEGORY: &str = "Uncategorised";

/// Ordered file type rules. The first rule that applies to the requested
/// mode and fully matches the path decides, whether it includes or excludes.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    rules: Vec<ClassificationRule>,
}

impl FileClassifier {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let rules = config
            .file_types
            .iter()
            .enumerate()
            .map(|(index, ft)| compile_rule(index, ft))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// The rule deciding `path` in `mode`. Having no such rule means the
    /// configuration lacks a fallback.
    pub fn classify(&self, path: &Path, mode: &str) -> Result<&ClassificationRule, ConfigError> {
        let path_str = path.to_string_lossy();
        let rule = self
            .rules
            .iter()
            .filter(|rule| rule.applicability.contains(mode))
            .find(|rule| rule.pattern.is_match(&path_str))
            .ok_or_else(|| ConfigError::NoFallbackRule {
                path: path_str.to_string(),
                mode: mode.to_string(),
            })?;
        tracing::trace!(file = %path_str, category = %rule.category, exclude = rule.exclude, "classified");
        Ok(rule)
    }

    pub fn is_included(&self, path: &Path, mode: &str) -> Result<bool, ConfigError> {
        Ok(!self.classify(path, mode)?.exclude)
    }
}

fn compile_rule(index: usize, ft: &FileType) -> Result<ClassificationRule, ConfigError> {
    let source = match (&ft.extensions, &ft.regexp) {
        (Some(exts), _) => format!(r".*\.({})", exts.items().join("|")),
        (None, Some(re)) => re.clone(),
        (None, None) => return Err(ConfigError::MissingFileTypePattern { index }),
    };

    let pattern = Regex::new(&format!("^(?:{source})$")).map_err(|e| ConfigError::InvalidPattern {
        id: format!("file-types[{index}]"),
        source: e,
    })?;

    let applicability = match &ft.applies_to {
        Some(list) => list.items(),
        None => crate::config::explode_list(DEFAULT_MODES),
    }
    .into_iter()
    .collect();

    Ok(ClassificationRule {
        pattern,
        applicability,
        category: ft
            .category
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        exclude: ft.exclude,
    })
}

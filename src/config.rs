use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure, deserialized from
/// `.license-report/config.yaml` (or `.yml`, `.toml`, `.json`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Canonical license texts making up the detection corpus.
    #[serde(default)]
    pub license_texts: Vec<LicenseText>,
    /// Ordered file classification rules. The last rule for every mode
    /// should be a catch-all.
    #[serde(default = "default_file_types")]
    pub file_types: Vec<FileType>,
    /// What to do when a file carries more than one `SPDX-License-Identifier` tag.
    #[serde(default)]
    pub multiple_tags: TagPolicy,
    /// Marker token introducing an explicit identifier, matched case-insensitively.
    #[serde(default = "default_tag_marker")]
    pub tag_marker: String,
    /// Keep digits when normalizing license texts and file contents.
    #[serde(default)]
    pub normalize_digits: bool,
}

/// One corpus item. Exactly one of the text fields is used, in the order
/// `detect-pattern`, `detect-text`, `text`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LicenseText {
    pub id: String,
    /// Full canonical license text.
    pub text: Option<String>,
    /// Shorter excerpt used instead of `text` for matching.
    pub detect_text: Option<String>,
    /// Template with `<regex>...</regex>` islands for variable spans.
    pub detect_pattern: Option<String>,
}

/// One file classification rule.
#[derive(Debug, Clone, Deserialize)]
pub struct FileType {
    /// Extension list, e.g. `"c, h"` or `[c, h]`.
    pub extensions: Option<StringList>,
    /// Raw full-match regular expression applied to the path.
    pub regexp: Option<String>,
    /// Modes this rule applies to. Defaults to `app,global`.
    #[serde(rename = "for")]
    pub applies_to: Option<StringList>,
    pub category: Option<String>,
    #[serde(default)]
    pub exclude: bool,
}

/// A list given either as a `,`/`;` separated string or as a sequence.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    One(String),
    Many(Vec<String>),
}

impl StringList {
    pub fn items(&self) -> Vec<String> {
        match self {
            StringList::One(s) => explode_list(s),
            StringList::Many(v) => v.iter().flat_map(|s| explode_list(s)).collect(),
        }
    }
}

/// Split `"a, b;c"` into `["a", "b", "c"]`, dropping empty items.
pub fn explode_list(text: &str) -> Vec<String> {
    text.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Policy for files that declare several distinct identifiers via tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagPolicy {
    /// Every declared identifier is reported.
    #[default]
    Union,
    /// The file is reported as undetected and a diagnostic is emitted.
    Reject,
}

fn default_tag_marker() -> String {
    "SPDX-License-Identifier".to_string()
}

fn default_file_types() -> Vec<FileType> {
    fn rule(extensions: Option<&str>, regexp: Option<&str>, category: &str, exclude: bool) -> FileType {
        FileType {
            extensions: extensions.map(|e| StringList::One(e.to_string())),
            regexp: regexp.map(str::to_string),
            applies_to: None,
            category: Some(category.to_string()),
            exclude,
        }
    }

    vec![
        rule(None, Some(r".*/\.git/.*"), "VCS", true),
        rule(
            Some("c, h, cc, cpp, cxx, hpp, hxx, S, s, ld, rs, py, go, java, js, ts"),
            None,
            "Source",
            false,
        ),
        rule(None, Some(r".*/(CMakeLists\.txt|Makefile|Kconfig[^/]*|[^/]*\.cmake)"), "Build", false),
        rule(None, Some(".*"), "Other", true),
    ]
}

impl Default for Config {
    /// Built-in configuration used when no config file is found: an empty
    /// corpus (only tags and sidecars are detected) and common source
    /// extensions with an excluding fallback rule.
    fn default() -> Self {
        Config {
            license_texts: Vec::new(),
            file_types: default_file_types(),
            multiple_tags: TagPolicy::Union,
            tag_marker: default_tag_marker(),
            normalize_digits: false,
        }
    }
}

impl Config {
    /// Load configuration from a file, picking the parser by extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
                path: path.display().to_string(),
                source: e,
            }),
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::ParseJson {
                path: path.display().to_string(),
                source: e,
            }),
            "toml" => toml::from_str(&content).map_err(|e| ConfigError::ParseToml {
                path: path.display().to_string(),
                source: e,
            }),
            _ => Err(ConfigError::UnsupportedFormat(
                path.display().to_string(),
                ext,
            )),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.license-report/config.{yaml,yml,toml,json}`
/// 3. `~/.config/license-report/config.yaml`
/// 4. Built-in [`Config::default`]
///
/// A config file that exists but fails to parse is an error, not a fallthrough.
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = config_override {
        return Config::from_file(path);
    }

    let project_dir = project_path.join(".license-report");
    for name in ["config.yaml", "config.yml", "config.toml", "config.json"] {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            return Config::from_file(&candidate);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-report")
            .join("config.yaml");
        if home_config.exists() {
            return Config::from_file(&home_config);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_explode_list() {
        assert_eq!(explode_list("c, h;cpp ,"), vec!["c", "h", "cpp"]);
        assert!(explode_list("").is_empty());
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
license-texts:
  - id: MIT
    text: Permission is hereby granted, free of charge
  - id: BSD-3-Clause
    detect-pattern: "Copyright (c) <regex>.*</regex> Redistribution and use"
file-types:
  - extensions: c, h
    for: app
    category: Source
  - regexp: ".*"
    exclude: true
multiple-tags: reject
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.license_texts.len(), 2);
        assert_eq!(config.license_texts[0].id, "MIT");
        assert!(config.license_texts[1].detect_pattern.is_some());
        assert_eq!(config.file_types.len(), 2);
        assert_eq!(
            config.file_types[0].applies_to.as_ref().unwrap().items(),
            vec!["app"]
        );
        assert!(config.file_types[1].exclude);
        assert_eq!(config.multiple_tags, TagPolicy::Reject);
        assert_eq!(config.tag_marker, "SPDX-License-Identifier");
        assert!(!config.normalize_digits);
    }

    #[test]
    fn test_parse_toml_config_with_list_extensions() {
        let content = r#"
normalize-digits = true

[[license-texts]]
id = "Apache-2.0"
detect-text = "Licensed under the Apache License, Version 2.0"

[[file-types]]
extensions = ["c", "h"]
for = "app, global"
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert!(config.normalize_digits);
        assert_eq!(config.multiple_tags, TagPolicy::Union);
        let ft = &config.file_types[0];
        assert_eq!(ft.extensions.as_ref().unwrap().items(), vec!["c", "h"]);
        assert_eq!(ft.applies_to.as_ref().unwrap().items(), vec!["app", "global"]);
    }

    #[test]
    fn test_missing_file_types_uses_defaults() {
        let config: Config = serde_yaml::from_str("license-texts: []").unwrap();
        assert!(!config.file_types.is_empty());
        let last = config.file_types.last().unwrap();
        assert_eq!(last.regexp.as_deref(), Some(".*"));
    }

    #[test]
    fn test_load_config_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".license-report");
        fs::create_dir(&cfg_dir).unwrap();
        let mut f = fs::File::create(cfg_dir.join("config.yaml")).unwrap();
        writeln!(f, "license-texts:\n  - id: ISC\n    text: Permission to use, copy, modify").unwrap();

        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.license_texts.len(), 1);
        assert_eq!(config.license_texts[0].id, "ISC");
    }

    #[test]
    fn test_unsupported_format() {
        let mut f = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        writeln!(f, "x=1").unwrap();
        let err = Config::from_file(f.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_, _)));
    }
}

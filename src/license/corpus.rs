use regex::Regex;

use crate::config::{Config, LicenseText};
use crate::error::ConfigError;
use crate::license::normalize::{normalize_text, Normalization};
use crate::models::{LicenseEntry, Matcher};

const REGEX_OPEN: &str = "<regex>";
const REGEX_CLOSE: &str = "</regex>";

/// Ordered set of canonical license texts, loaded once per run.
#[derive(Debug, Clone)]
pub struct Corpus {
    entries: Vec<LicenseEntry>,
    normalization: Normalization,
}

impl Corpus {
    /// Build the corpus from configuration, rejecting entries whose texts
    /// overlap so that matching never depends on entry order.
    pub fn load(config: &Config) -> Result<Self, ConfigError> {
        Self::from_texts(
            &config.license_texts,
            Normalization::from_keep_digits(config.normalize_digits),
        )
    }

    pub fn from_texts(texts: &[LicenseText], normalization: Normalization) -> Result<Self, ConfigError> {
        let entries = texts
            .iter()
            .map(|t| compile_entry(t, normalization))
            .collect::<Result<Vec<_>, _>>()?;

        check_overlap(&entries)?;

        Ok(Self {
            entries,
            normalization,
        })
    }

    pub fn entries(&self) -> &[LicenseEntry] {
        &self.entries
    }

    /// Identifiers of every entry found in `text`. Text is normalized once;
    /// all entries are tested.
    pub fn matches(&self, text: &str) -> Vec<&str> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let normalized = normalize_text(text, self.normalization);
        self.entries
            .iter()
            .filter(|e| e.matcher.is_match(&normalized))
            .map(|e| e.id.as_str())
            .collect()
    }
}

fn compile_entry(text: &LicenseText, normalization: Normalization) -> Result<LicenseEntry, ConfigError> {
    let matcher = if let Some(template) = &text.detect_pattern {
        Matcher::Pattern(compile_template(&text.id, template, normalization)?)
    } else {
        let raw = text
            .detect_text
            .as_deref()
            .or(text.text.as_deref())
            .ok_or_else(|| ConfigError::MissingLicenseText {
                id: text.id.clone(),
            })?;
        let normalized = normalize_text(raw, normalization);
        if normalized.is_empty() {
            return Err(ConfigError::EmptyLicenseText {
                id: text.id.clone(),
            });
        }
        Matcher::Literal(normalized)
    };

    Ok(LicenseEntry {
        id: text.id.clone(),
        matcher,
    })
}

/// Compile a `literal <regex>re</regex> literal ...` template. Literal
/// segments are normalized and escaped, regex segments are used verbatim.
pub fn compile_template(id: &str, template: &str, normalization: Normalization) -> Result<Regex, ConfigError> {
    let unbalanced = || ConfigError::UnbalancedRegex { id: id.to_string() };

    let mut pattern = String::new();
    let mut rest = template;
    loop {
        match rest.find(REGEX_OPEN) {
            Some(start) => {
                let literal = &rest[..start];
                if literal.contains(REGEX_CLOSE) {
                    return Err(unbalanced());
                }
                pattern.push_str(&regex::escape(&normalize_text(literal, normalization)));

                let island = &rest[start + REGEX_OPEN.len()..];
                let end = island.find(REGEX_CLOSE).ok_or_else(unbalanced)?;
                pattern.push_str(&island[..end]);
                rest = &island[end + REGEX_CLOSE.len()..];
            }
            None => {
                if rest.contains(REGEX_CLOSE) {
                    return Err(unbalanced());
                }
                pattern.push_str(&regex::escape(&normalize_text(rest, normalization)));
                break;
            }
        }
    }

    let re = Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
        id: format!("'{id}'"),
        source: e,
    })?;

    // A pattern that matches nothing at all would tag every file.
    if re.is_match("") {
        return Err(ConfigError::EmptyLicenseText { id: id.to_string() });
    }

    Ok(re)
}

/// Reject any pair of differently-named entries where one entry matches the
/// other's literal text. Patterns cannot be compared with each other, but a
/// pattern that matches a literal entry is caught here too.
fn check_overlap(entries: &[LicenseEntry]) -> Result<(), ConfigError> {
    for outer in entries {
        let Matcher::Literal(outer_text) = &outer.matcher else {
            continue;
        };
        for inner in entries {
            if inner.id.eq_ignore_ascii_case(&outer.id) {
                continue;
            }
            if inner.matcher.is_match(outer_text) {
                return Err(ConfigError::AmbiguousLicenseText {
                    inner: inner.id.clone(),
                    outer: outer.id.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str, body: &str) -> LicenseText {
        LicenseText {
            id: id.to_string(),
            text: Some(body.to_string()),
            detect_text: None,
            detect_pattern: None,
        }
    }

    fn pattern(id: &str, template: &str) -> LicenseText {
        LicenseText {
            id: id.to_string(),
            text: None,
            detect_text: None,
            detect_pattern: Some(template.to_string()),
        }
    }

    #[test]
    fn test_literal_match_ignores_formatting() {
        let corpus = Corpus::from_texts(
            &[text("MIT", "Permission is hereby granted, free of charge, to any person")],
            Normalization::Letters,
        )
        .unwrap();
        let source = "/*\n * Permission is hereby granted, free of charge,\n * to any person obtaining\n */";
        assert_eq!(corpus.matches(source), vec!["MIT"]);
        assert!(corpus.matches("int main() {}").is_empty());
    }

    #[test]
    fn test_detect_text_preferred_over_text() {
        let t = LicenseText {
            id: "Apache-2.0".to_string(),
            text: Some("Apache License Version 2.0 January 2004 full text".to_string()),
            detect_text: Some("Licensed under the Apache License".to_string()),
            detect_pattern: None,
        };
        let corpus = Corpus::from_texts(&[t], Normalization::Letters).unwrap();
        assert_eq!(
            corpus.matches("// Licensed under the Apache License, Version 2.0"),
            vec!["Apache-2.0"]
        );
    }

    #[test]
    fn test_all_matching_entries_reported() {
        let corpus = Corpus::from_texts(
            &[
                text("MIT", "Permission is hereby granted free of charge"),
                text("Zlib", "This software is provided as-is without any express"),
            ],
            Normalization::Letters,
        )
        .unwrap();
        let source = "Permission is hereby granted, free of charge.\nThis software is provided 'as-is', without any express warranty.";
        assert_eq!(corpus.matches(source), vec!["MIT", "Zlib"]);
    }

    #[test]
    fn test_template_with_regex_island() {
        let corpus = Corpus::from_texts(
            &[pattern(
                "BSD-3-Clause",
                "Copyright (c) <regex>[a-z]*</regex> All rights reserved. Redistribution and use",
            )],
            Normalization::Letters,
        )
        .unwrap();
        let source = "Copyright (c) 2019-2023 Nordic Semiconductor ASA\n All rights reserved.\n\n Redistribution and use in source";
        assert_eq!(corpus.matches(source), vec!["BSD-3-Clause"]);
        assert!(corpus.matches("Copyright (c) Someone. Redistribution").is_empty());
    }

    #[test]
    fn test_compile_template_escapes_literals() {
        let re = compile_template("X", "Alpha<regex>(beta)?</regex>Gamma", Normalization::Letters).unwrap();
        assert_eq!(re.as_str(), "alpha(beta)?gamma");
        assert!(re.is_match("xxalphagammaxx"));
        assert!(re.is_match("alphabetagamma"));
    }

    #[test]
    fn test_unbalanced_template_rejected() {
        let err = compile_template("X", "alpha <regex>.*", Normalization::Letters).unwrap_err();
        assert!(matches!(err, ConfigError::UnbalancedRegex { .. }));
        let err = compile_template("X", "alpha .*</regex> beta", Normalization::Letters).unwrap_err();
        assert!(matches!(err, ConfigError::UnbalancedRegex { .. }));
    }

    #[test]
    fn test_invalid_regex_island_rejected() {
        let err = compile_template("X", "alpha <regex>(</regex> beta", Normalization::Letters).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_pattern_matching_everything_rejected() {
        let err = compile_template("X", "<regex>.*</regex>", Normalization::Letters).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyLicenseText { .. }));
    }

    #[test]
    fn test_contained_text_rejected() {
        let err = Corpus::from_texts(
            &[
                text("GPL-2.0", "This program is free software; you can redistribute it"),
                text("GPL-short", "free software"),
            ],
            Normalization::Letters,
        )
        .unwrap_err();
        match err {
            ConfigError::AmbiguousLicenseText { inner, outer } => {
                assert_eq!(inner, "GPL-short");
                assert_eq!(outer, "GPL-2.0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pattern_overlapping_literal_rejected() {
        let err = Corpus::from_texts(
            &[
                text("MIT", "Permission is hereby granted free of charge"),
                pattern("Loose", "hereby<regex>[a-z]+</regex>charge"),
            ],
            Normalization::Letters,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousLicenseText { .. }));
    }

    #[test]
    fn test_same_id_alternatives_allowed() {
        let corpus = Corpus::from_texts(
            &[
                text("MIT", "Permission is hereby granted free of charge"),
                text("MIT", "hereby granted"),
            ],
            Normalization::Letters,
        )
        .unwrap();
        assert_eq!(corpus.entries().len(), 2);
    }

    #[test]
    fn test_missing_and_empty_text_rejected() {
        let missing = LicenseText {
            id: "X".to_string(),
            text: None,
            detect_text: None,
            detect_pattern: None,
        };
        assert!(matches!(
            Corpus::from_texts(&[missing], Normalization::Letters).unwrap_err(),
            ConfigError::MissingLicenseText { .. }
        ));
        assert!(matches!(
            Corpus::from_texts(&[text("Y", "2.0 -- 1999")], Normalization::Letters).unwrap_err(),
            ConfigError::EmptyLicenseText { .. }
        ));
    }

    #[test]
    fn test_canonical_text_matches_only_itself() {
        let apache = "Licensed under the Apache License, Version 2.0 (the \"License\"); you may not use this file except in compliance with the License.";
        let corpus = Corpus::from_texts(
            &[
                text("Apache-2.0", apache),
                text("MIT", "Permission is hereby granted, free of charge"),
            ],
            Normalization::Letters,
        )
        .unwrap();
        assert_eq!(corpus.matches(apache), vec!["Apache-2.0"]);
    }
}

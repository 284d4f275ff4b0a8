/// Which characters survive normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Normalization {
    /// ASCII letters only.
    #[default]
    Letters,
    /// ASCII letters and digits.
    LettersAndDigits,
}

impl Normalization {
    pub fn from_keep_digits(keep_digits: bool) -> Self {
        if keep_digits {
            Normalization::LettersAndDigits
        } else {
            Normalization::Letters
        }
    }

    fn keeps(self, c: char) -> bool {
        match self {
            Normalization::Letters => c.is_ascii_alphabetic(),
            Normalization::LettersAndDigits => c.is_ascii_alphanumeric(),
        }
    }
}

/// Reduce license text to a lower-case run of letters (and optionally digits)
/// so that comment markers, line wrapping and punctuation do not affect matching.
pub fn normalize_text(text: &str, mode: Normalization) -> String {
    text.chars()
        .filter(|&c| mode.keeps(c))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_comment_decoration() {
        let a = normalize_text(" * Permission is hereby granted,\n * free of charge", Normalization::Letters);
        let b = normalize_text("Permission is hereby granted, free of charge", Normalization::Letters);
        assert_eq!(a, b);
        assert_eq!(a, "permissionisherebygrantedfreeofcharge");
    }

    #[test]
    fn test_digits() {
        assert_eq!(normalize_text("Version 2.0", Normalization::Letters), "version");
        assert_eq!(
            normalize_text("Version 2.0", Normalization::LettersAndDigits),
            "version20"
        );
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(normalize_text("Copyright © Jürgen", Normalization::Letters), "copyrightjrgen");
    }
}

use crate::config::TextPolicy;
use crate::constants::ALLOWED_SYMBOLS;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

/// Reduces extracted text to a single-line, transport-safe character set.
///
/// Steps, in order:
/// - NFKD decomposition, then every non-ASCII character is dropped
///   (accents fall off their base letter, other scripts disappear)
/// - C0/C1 control characters become spaces
/// - whitespace runs collapse to one space
/// - characters outside letters, digits, `À..=ž`, [`ALLOWED_SYMBOLS`] and whitespace are removed
/// - leading/trailing whitespace is trimmed
///
/// Removing characters can leave two spaces side by side, so whitespace is
/// collapsed again after the filter. That keeps `normalize` idempotent.
///
/// With `fold_ascii` disabled the text is NFKC-composed instead and letters or
/// digits of any script survive, which keeps Arabic OCR output. The filtered
/// text is composed once more so the result is stable under a second pass.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    fold_ascii: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(&TextPolicy::default())
    }
}

impl TextNormalizer {
    pub fn new(policy: &TextPolicy) -> Self {
        Self {
            fold_ascii: policy.fold_ascii,
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        let folded: String = if self.fold_ascii {
            text.nfkd().filter(char::is_ascii).collect()
        } else {
            text.nfkc().collect()
        };

        let without_controls: String = folded
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        let filtered: String = collapse_whitespace(&without_controls)
            .chars()
            .filter(|&c| self.is_allowed(c))
            .collect();

        // Dropping a character can bring composable neighbours together (Hangul jamo)
        let filtered: String = if self.fold_ascii {
            filtered
        } else {
            filtered.nfkc().collect()
        };

        collapse_whitespace(&filtered).trim().to_string()
    }

    /// Normalize a JSON value; anything that is not a string yields an empty string
    pub fn normalize_value(&self, value: &Value) -> String {
        match value {
            Value::String(text) => self.normalize(text),
            _ => String::new(),
        }
    }

    fn is_allowed(&self, c: char) -> bool {
        c.is_ascii_alphanumeric()
            || ('\u{C0}'..='\u{17E}').contains(&c)
            || ALLOWED_SYMBOLS.contains(&c)
            || c.is_whitespace()
            || (!self.fold_ascii && c.is_alphanumeric())
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "Marché public n° 2024/17 : fourniture d'équipements",
        "Appel d’offres\t\tnational\n\n\r\nouvert",
        "مناقصة عامة Tender 12",
        "price * qty = 100 € ~ 12 $",
        "ligature ﬁnance ﬂow",
        "ctrl\u{0}\u{7}\u{1f}chars\u{85}here",
        "x ** ^^ y",
        "漢字 and kana カタカナ",
        "émoji 🎉 party",
        "\u{1100}*\u{1161}",
    ];

    #[test]
    fn test_strips_accents() {
        let normalizer = TextNormalizer::default();
        assert_eq!(
            normalizer.normalize("Marché public n° 12, équipements"),
            "Marche public n 12, equipements"
        );
    }

    #[test]
    fn test_collapses_whitespace_and_controls() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("  a\t\tb\n\nc\u{0}d  "), "a b c d");
    }

    #[test]
    fn test_removes_disallowed_symbols_without_double_spaces() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("x * y"), "x y");
        assert_eq!(normalizer.normalize("a <b> [c] {d}"), "a b c d");
    }

    #[test]
    fn test_keeps_allowed_punctuation() {
        let normalizer = TextNormalizer::default();
        let text = "Q1: (yes/no)? 50% - \"ok\"; contact@example.org #1!";
        assert_eq!(normalizer.normalize(text), text);
    }

    #[test]
    fn test_compatibility_decomposition() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("ﬁnance"), "finance");
    }

    #[test]
    fn test_non_latin_scripts_folded_away() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("مناقصة عامة Tender 12"), "Tender 12");
    }

    #[test]
    fn test_keeps_non_latin_when_fold_disabled() {
        let normalizer = TextNormalizer::new(&TextPolicy {
            fold_ascii: false,
            ..TextPolicy::default()
        });
        assert_eq!(normalizer.normalize("مناقصة  Marché"), "مناقصة Marché");
    }

    #[test]
    fn test_recomposes_after_filter() {
        let normalizer = TextNormalizer::new(&TextPolicy {
            fold_ascii: false,
            ..TextPolicy::default()
        });
        let once = normalizer.normalize("\u{1100}*\u{1161}");
        assert_eq!(once, "\u{AC00}");
        assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn test_idempotent() {
        for policy in [
            TextPolicy::default(),
            TextPolicy {
                fold_ascii: false,
                ..TextPolicy::default()
            },
        ] {
            let normalizer = TextNormalizer::new(&policy);
            for sample in SAMPLES {
                let once = normalizer.normalize(sample);
                let twice = normalizer.normalize(&once);
                assert_eq!(once, twice, "not idempotent for {:?}", sample);
            }
        }
    }

    #[test]
    fn test_output_within_allow_list() {
        let normalizer = TextNormalizer::default();
        for sample in SAMPLES {
            let out = normalizer.normalize(sample);
            assert!(
                out.chars().all(|c| c.is_ascii_alphanumeric()
                    || ALLOWED_SYMBOLS.contains(&c)
                    || ('\u{C0}'..='\u{17E}').contains(&c)
                    || c == ' '),
                "unexpected character in {:?}",
                out
            );
            assert!(!out.contains("  "));
            assert_eq!(out, out.trim());
        }
    }

    #[test]
    fn test_non_string_value_is_empty() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize_value(&Value::Null), "");
        assert_eq!(normalizer.normalize_value(&serde_json::json!(42)), "");
        assert_eq!(normalizer.normalize_value(&serde_json::json!(["a"])), "");
        assert_eq!(normalizer.normalize_value(&serde_json::json!(" é ")), "e");
    }
}

//! Translation quality validation.
//!
//! Checks that format specifiers (`%@`, `%lld`, `%1$@`, ...) survive
//! translation. Problems are reported, never fixed: the caller logs them and
//! keeps the translation.

use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing warnings about a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Check if the report is clean (no warnings)
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validator for translated catalog strings.
pub struct TranslationValidator;

static FORMAT_SPECIFIER_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Validate that a translation keeps the source's format specifiers.
    ///
    /// Positional specifiers may be reordered, so specifiers are compared as
    /// sorted lists.
    pub fn validate(source: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::default();

        let mut expected = Self::extract_format_specifiers(source);
        let mut actual = Self::extract_format_specifiers(translated);
        expected.sort();
        actual.sort();
        if expected != actual {
            report.warnings.push(format!(
                "Format specifier mismatch: source has {:?}, translation has {:?}",
                expected, actual
            ));
        }

        if !source.trim().is_empty() && translated.trim().is_empty() {
            report
                .warnings
                .push("Translation is empty for a non-empty source".to_string());
        }

        report
    }

    /// Extract printf-style format specifiers, including `%@` and `%%`
    fn extract_format_specifiers(text: &str) -> Vec<String> {
        let regex = FORMAT_SPECIFIER_REGEX.get_or_init(|| {
            Regex::new(
                r"%(?:\d+\$)?[-+ 0#]*(?:\d+|\*)?(?:\.(?:\d+|\*))?(?:hh|h|ll|l|q|z|t|j|L)?[@dDiuUxXoOfFeEgGcCsSpaA%]",
            )
            .unwrap()
        });

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_object_and_integer_specifiers() {
        let specs = TranslationValidator::extract_format_specifiers("%@ has %lld new messages");
        assert_eq!(specs, vec!["%@", "%lld"]);
    }

    #[test]
    fn test_extract_positional_and_precision_specifiers() {
        let specs = TranslationValidator::extract_format_specifiers("%2$@ paid %1$.2f (100%%)");
        assert_eq!(specs, vec!["%2$@", "%1$.2f", "%%"]);
    }

    #[test]
    fn test_extract_no_specifiers() {
        assert!(TranslationValidator::extract_format_specifiers("Plain text").is_empty());
    }

    #[test]
    fn test_validate_clean_translation() {
        let report = TranslationValidator::validate("%@ liked your post", "%@ さんがいいねしました");
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_validate_reordered_positional_specifiers() {
        let report = TranslationValidator::validate("%1$@ sent %2$lld files", "%2$lld 个文件由 %1$@ 发送");
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_validate_missing_specifier() {
        let report = TranslationValidator::validate("%lld items", "項目");
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Format specifier mismatch"));
    }

    #[test]
    fn test_validate_altered_specifier() {
        let report = TranslationValidator::validate("Hello %@", "Hola % @");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_validate_empty_translation() {
        let report = TranslationValidator::validate("Save", "  ");
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("Translation is empty")));
    }
}

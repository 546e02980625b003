//! Language registry: display names for catalog language identifiers.
//!
//! Catalogs identify languages with Xcode identifiers (`zh-Hans`, `pt-PT`).
//! The model gets better results from an explicit name, so prompts use
//! [`LanguageRegistry::display_name`]. Unknown identifiers are passed through
//! as-is.

use std::sync::OnceLock;

/// Metadata for a known language identifier.
#[derive(Debug, Clone)]
pub struct LanguageInfo {
    /// Xcode language identifier (e.g., "en", "zh-Hans")
    pub code: &'static str,

    /// English name of the language (e.g., "Simplified Chinese")
    pub name: &'static str,
}

/// Global language registry singleton.
///
/// Immutable after first access.
pub struct LanguageRegistry {
    languages: Vec<LanguageInfo>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Look up a language by identifier (case-insensitive).
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageInfo> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// Prompt-friendly name, e.g. `Simplified Chinese (zh-Hans)`.
    pub fn display_name(&self, code: &str) -> String {
        match self.get_by_code(code) {
            Some(lang) => format!("{} ({})", lang.name, code),
            None => code.to_string(),
        }
    }
}

fn default_languages() -> Vec<LanguageInfo> {
    const LANGUAGES: &[(&str, &str)] = &[
        ("en", "English"),
        ("en-GB", "British English"),
        ("en-AU", "Australian English"),
        ("zh-Hans", "Simplified Chinese"),
        ("zh-Hant", "Traditional Chinese"),
        ("zh-HK", "Traditional Chinese (Hong Kong)"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("es", "Spanish"),
        ("es-419", "Latin American Spanish"),
        ("pt-PT", "European Portuguese"),
        ("pt-BR", "Brazilian Portuguese"),
        ("fr", "French"),
        ("fr-CA", "Canadian French"),
        ("de", "German"),
        ("it", "Italian"),
        ("nl", "Dutch"),
        ("sv", "Swedish"),
        ("da", "Danish"),
        ("nb", "Norwegian Bokmål"),
        ("fi", "Finnish"),
        ("pl", "Polish"),
        ("cs", "Czech"),
        ("sk", "Slovak"),
        ("hu", "Hungarian"),
        ("ro", "Romanian"),
        ("el", "Greek"),
        ("tr", "Turkish"),
        ("ru", "Russian"),
        ("uk", "Ukrainian"),
        ("ar", "Arabic"),
        ("he", "Hebrew"),
        ("hi", "Hindi"),
        ("th", "Thai"),
        ("vi", "Vietnamese"),
        ("id", "Indonesian"),
        ("ms", "Malay"),
    ];

    LANGUAGES
        .iter()
        .map(|&(code, name)| LanguageInfo { code, name })
        .collect()
}

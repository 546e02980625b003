//! String catalog document model (`.xcstrings`).
//!
//! Only the fields the translator reads or writes are typed. Everything else
//! is captured in `extra` maps and written back verbatim, so catalogs produced
//! by newer Xcode versions survive a round trip.

mod writer;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

pub use writer::{save_atomic, to_pretty_json};

/// Comment marker that excludes an entry from translation
pub const IGNORE_MARKER: &str = "ignore xcstrings";

/// `extractionState` given to entries created empty
pub const MANUAL_EXTRACTION_STATE: &str = "manual";

/// File name Xcode uses for Info.plist string catalogs
pub const INFO_PLIST_FILE_NAME: &str = "InfoPlist.xcstrings";

/// A whole string catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub source_language: String,

    #[serde(default)]
    pub strings: IndexMap<String, Entry>,

    /// Unknown top-level fields (e.g. `version`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-key record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localizations: Option<IndexMap<String, Localization>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_translate: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One language's translation of a key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Localization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_unit: Option<StringUnit>,

    /// `variations`, `substitutions` and anything else Xcode adds
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A translated value and its review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringUnit {
    pub state: TranslationState,
    pub value: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Review state of a string unit. Unrecognized states round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TranslationState {
    New,
    Translated,
    NeedsReview,
    Other(String),
}

impl TranslationState {
    pub fn as_str(&self) -> &str {
        match self {
            TranslationState::New => "new",
            TranslationState::Translated => "translated",
            TranslationState::NeedsReview => "needs_review",
            TranslationState::Other(state) => state,
        }
    }
}

impl From<String> for TranslationState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "new" => TranslationState::New,
            "translated" => TranslationState::Translated,
            "needs_review" => TranslationState::NeedsReview,
            _ => TranslationState::Other(state),
        }
    }
}

impl From<TranslationState> for String {
    fn from(state: TranslationState) -> Self {
        match state {
            TranslationState::Other(state) => state,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TranslationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StringUnit {
    pub fn translated(value: impl Into<String>) -> Self {
        Self {
            state: TranslationState::Translated,
            value: value.into(),
            extra: Map::new(),
        }
    }
}

impl Localization {
    /// The string unit value, if any
    pub fn value(&self) -> Option<&str> {
        self.string_unit.as_ref().map(|unit| unit.value.as_str())
    }

    /// Translated with a non-empty value
    pub fn is_satisfied(&self) -> bool {
        self.string_unit
            .as_ref()
            .is_some_and(|unit| unit.state == TranslationState::Translated && !unit.value.is_empty())
    }

    /// Carries plural/device variations instead of a plain string unit
    pub fn has_variations(&self) -> bool {
        self.string_unit.is_none() && self.extra.contains_key("variations")
    }
}

impl Entry {
    /// `{}` in the file
    pub fn is_empty(&self) -> bool {
        self.comment.is_none()
            && self.extraction_state.is_none()
            && self.localizations.is_none()
            && self.should_translate.is_none()
            && self.extra.is_empty()
    }

    /// Excluded from translation by comment marker or `shouldTranslate: false`
    pub fn is_ignored(&self) -> bool {
        let marked = self
            .comment
            .as_deref()
            .is_some_and(|comment| comment.contains(IGNORE_MARKER));
        marked || self.should_translate == Some(false)
    }

    /// The localizations map, created if missing
    pub fn localizations_mut(&mut self) -> &mut IndexMap<String, Localization> {
        self.localizations.get_or_insert_with(IndexMap::new)
    }

    pub fn localization(&self, language: &str) -> Option<&Localization> {
        self.localizations.as_ref()?.get(language)
    }

    /// Store a translated value, keeping any other fields of an existing localization
    pub fn set_translation(&mut self, language: &str, value: impl Into<String>) {
        let localization = self
            .localizations_mut()
            .entry(language.to_string())
            .or_default();
        let extra = localization
            .string_unit
            .take()
            .map(|unit| unit.extra)
            .unwrap_or_default();
        localization.string_unit = Some(StringUnit {
            extra,
            ..StringUnit::translated(value)
        });
    }
}

/// What kind of keys a catalog holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// Keys are (usually) the source text itself
    Localizable,
    /// Keys are Info.plist keys such as `NSCameraUsageDescription`
    InfoPlist,
}

impl CatalogKind {
    pub fn from_path(path: &Path) -> Self {
        let is_info_plist = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == INFO_PLIST_FILE_NAME);

        if is_info_plist {
            CatalogKind::InfoPlist
        } else {
            CatalogKind::Localizable
        }
    }
}

impl Catalog {
    /// Parse a catalog from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse string catalog JSON")
    }

    /// Read and parse a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read string catalog: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid string catalog: {}", path.display()))
    }

    /// Atomically rewrite the catalog file
    pub fn save(&self, path: &Path) -> Result<()> {
        save_atomic(self, path)
    }

    /// Value of `key` in the source language, if present
    pub fn source_value(&self, key: &str) -> Option<&str> {
        self.strings
            .get(key)?
            .localization(&self.source_language)?
            .value()
    }
}

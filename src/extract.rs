use crate::catalog::{Catalog, CatalogKind, MANUAL_EXTRACTION_STATE};
use tracing::{debug, warn};

/// One pending (language, key) translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub language: String,
    pub key: String,
    /// Text sent for translation
    pub source: String,
}

/// Inputs to [`extract_work_items`]
#[derive(Debug, Clone)]
pub struct ExtractOptions<'a> {
    pub languages: &'a [String],
    /// Tag entries created empty with `extractionState: manual`
    pub mark_extraction_manual: bool,
    pub kind: CatalogKind,
}

/// Work found in a catalog, plus counts for reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Pending items in catalog key order
    pub items: Vec<WorkItem>,
    pub keys_scanned: usize,
    pub keys_skipped: usize,
    /// (language, key) pairs already translated
    pub satisfied: usize,
}

impl Extraction {
    /// Pending items for one language, in catalog key order
    pub fn for_language(&self, language: &str) -> Vec<WorkItem> {
        self.items
            .iter()
            .filter(|item| item.language == language)
            .cloned()
            .collect()
    }
}

/// Scan the catalog for (language, key) pairs that need translation.
///
/// Entries that are not skipped are normalized in place: empty entries get an
/// empty `localizations` map (and optionally `extractionState: manual`), and
/// entries missing `localizations` get one.
pub fn extract_work_items(catalog: &mut Catalog, options: &ExtractOptions<'_>) -> Extraction {
    let mut extraction = Extraction::default();
    let source_language = catalog.source_language.clone();

    for (key, entry) in catalog.strings.iter_mut() {
        extraction.keys_scanned += 1;

        if key.is_empty() {
            debug!("Skipping empty key");
            extraction.keys_skipped += 1;
            continue;
        }

        if entry.is_ignored() {
            debug!("Skipping {:?}: marked as not translatable", key);
            extraction.keys_skipped += 1;
            continue;
        }

        if entry.is_empty() && options.mark_extraction_manual {
            entry.extraction_state = Some(MANUAL_EXTRACTION_STATE.to_string());
        }
        let localizations = entry.localizations_mut();

        let source_value = localizations
            .get(&source_language)
            .and_then(|localization| localization.value());
        let source = match (source_value, options.kind) {
            (Some(value), _) => value.to_string(),
            (None, CatalogKind::Localizable) => key.clone(),
            (None, CatalogKind::InfoPlist) => {
                warn!(
                    "Skipping {:?}: no {} value in Info.plist catalog",
                    key, source_language
                );
                extraction.keys_skipped += 1;
                continue;
            }
        };

        for language in options.languages {
            match localizations.get(language) {
                Some(localization) if localization.is_satisfied() => {
                    debug!("{}: {{{}: {}}} has been translated", language, key, source);
                    extraction.satisfied += 1;
                }
                Some(localization) if localization.has_variations() => {
                    debug!("{}: {:?} has variations, leaving untouched", language, key);
                    extraction.satisfied += 1;
                }
                _ => extraction.items.push(WorkItem {
                    language: language.clone(),
                    key: key.clone(),
                    source: source.clone(),
                }),
            }
        }
    }

    extraction
}

use crate::batch::plan_batches;
use crate::catalog::{Catalog, CatalogKind};
use crate::config::Config;
use crate::extract::{extract_work_items, ExtractOptions, WorkItem};
use crate::gemini::translate_batch;
use crate::languages::LanguageRegistry;
use crate::validator::TranslationValidator;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters for one run of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Keys in the catalog
    pub keys_scanned: usize,
    /// Keys excluded (empty key, ignore marker, `shouldTranslate: false`)
    pub keys_skipped: usize,
    /// (language, key) pairs that were already translated
    pub already_translated: usize,
    /// (language, key) pairs that needed a value
    pub pending: usize,
    /// Pending pairs filled without a remote call
    pub resolved_locally: usize,
    pub batches: usize,
    /// Strings merged from remote responses
    pub translated: usize,
    /// Requests sent, including failed attempts
    pub api_requests: u32,
    pub api_failures: u32,
}

/// Translate everything pending in the configured catalog
pub async fn run(config: &Config) -> Result<RunReport> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    run_with_client(&client, config).await
}

/// [`run`] with a caller-provided HTTP client
pub async fn run_with_client(client: &reqwest::Client, config: &Config) -> Result<RunReport> {
    let path = config.catalog_path.as_path();
    let mut catalog = Catalog::load(path)?;
    info!(
        "Loaded {} ({} keys, source language {})",
        path.display(),
        catalog.strings.len(),
        catalog.source_language
    );

    let options = ExtractOptions {
        languages: &config.target_languages,
        mark_extraction_manual: config.mark_extraction_manual,
        kind: CatalogKind::from_path(path),
    };
    let extraction = extract_work_items(&mut catalog, &options);

    let mut report = RunReport {
        keys_scanned: extraction.keys_scanned,
        keys_skipped: extraction.keys_skipped,
        already_translated: extraction.satisfied,
        pending: extraction.items.len(),
        ..RunReport::default()
    };
    info!(
        "{} pairs already translated, {} pending",
        report.already_translated, report.pending
    );

    let language_count = config.target_languages.len();
    for (index, language) in config.target_languages.iter().enumerate() {
        let display_name = LanguageRegistry::get().display_name(language);
        let (local, remote): (Vec<WorkItem>, Vec<WorkItem>) = extraction
            .for_language(language)
            .into_iter()
            .partition(|item| resolves_locally(&catalog, item));

        info!(
            "[{}/{}] {}: {} strings to translate",
            index + 1,
            language_count,
            display_name,
            local.len() + remote.len()
        );

        for item in &local {
            debug!("{}: {:?} copied from source", language, item.key);
            merge(&mut catalog, item, &item.source);
        }
        report.resolved_locally += local.len();

        let batches = plan_batches(language, remote, config.batch_size);
        let batch_count = batches.len();
        for (batch_index, batch) in batches.iter().enumerate() {
            info!(
                "[{}/{}] {}: batch {}/{} ({} strings, {} bytes)",
                index + 1,
                language_count,
                display_name,
                batch_index + 1,
                batch_count,
                batch.len(),
                batch.encoded_len()
            );

            let result = translate_batch(client, config, batch).await;
            report.batches += 1;
            report.api_requests += result.attempts;
            report.api_failures += result.attempts.saturating_sub(1);

            for (item, translation) in batch.items.iter().zip(&result.translations) {
                let validation = TranslationValidator::validate(&item.source, translation);
                if !validation.is_clean() {
                    for warning in &validation.warnings {
                        warn!("{}: {:?}: {}", language, item.key, warning);
                    }
                }
                info!("{}: {} => {}", language, item.source, translation);
                merge(&mut catalog, item, translation);
            }
            report.translated += batch.len();

            catalog.save(path)?;
        }
    }

    // Persists normalization and locally resolved pairs
    catalog.save(path)?;

    info!(
        "Finished: {} translated, {} resolved locally, {} API requests",
        report.translated, report.resolved_locally, report.api_requests
    );
    Ok(report)
}

/// Pairs whose value is known without asking the model.
///
/// A source-language pair is copied only when the entry has a source-language
/// value; a key used as fallback may be written in any language.
fn resolves_locally(catalog: &Catalog, item: &WorkItem) -> bool {
    if item.source.trim().is_empty() {
        return true;
    }
    item.language == catalog.source_language && catalog.source_value(&item.key).is_some()
}

fn merge(catalog: &mut Catalog, item: &WorkItem, value: &str) {
    match catalog.strings.get_mut(&item.key) {
        Some(entry) => entry.set_translation(&item.language, value),
        None => warn!("{:?} vanished from the catalog, dropping its translation", item.key),
    }
}

use crate::retry::BackoffPolicy;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LANGUAGE_CODES: &str = "en,zh-Hans,zh-Hant";
pub const DEFAULT_BATCH_SIZE: usize = 4000;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct Config {
    // Catalog
    pub catalog_path: PathBuf,
    pub target_languages: Vec<String>,
    pub app_category: Option<String>,
    pub mark_extraction_manual: bool,

    // Gemini
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_url: String,

    // Pacing
    pub batch_size: usize,
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub backoff: BackoffPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_value)
    }

    /// Load configuration from a `key = value` file.
    ///
    /// Keys missing from the file fall back to the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut values = HashMap::new();
        let entries = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        for entry in entries {
            let (key, value) = entry
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            values.insert(key.trim().to_lowercase(), value);
        }

        Self::from_lookup(|key| {
            values
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| env_value(key))
        })
    }

    /// Build and validate a config from a key lookup (file-style lowercase keys)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("gemini_api_key").context("gemini_api_key not provided")?;
        let catalog_path = lookup("xcstrings_file_path")
            .map(PathBuf::from)
            .context("xcstrings_file_path not provided")?;
        if !catalog_path.is_file() {
            bail!(
                "xcstrings file {} does not exist",
                catalog_path.display()
            );
        }

        let target_languages = parse_language_codes(
            &lookup("language_codes").unwrap_or_else(|| DEFAULT_LANGUAGE_CODES.to_string()),
        );
        if target_languages.is_empty() {
            bail!("language_codes must name at least one language");
        }

        let backoff_base = Duration::from_millis(parse_number(&lookup, "backoff_base_ms", 1000)?);
        let backoff_max = Duration::from_millis(parse_number(&lookup, "backoff_max_ms", 60_000)?);

        Ok(Self {
            catalog_path,
            target_languages,
            app_category: lookup("app_category"),
            mark_extraction_manual: lookup("untranslated_state")
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),

            gemini_api_key,
            gemini_model: lookup("gemini_model").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_url: lookup("gemini_api_url")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),

            batch_size: parse_number(&lookup, "batch_size", DEFAULT_BATCH_SIZE as u64)? as usize,
            request_delay: Duration::from_millis(parse_number(&lookup, "request_delay_ms", 1000)?),
            request_timeout: Duration::from_secs(parse_number(&lookup, "request_timeout_secs", 300)?),
            backoff: BackoffPolicy::new(backoff_base).with_max_delay(backoff_max),
        })
    }
}

/// Environment variable for a file-style key, e.g. `batch_size` -> `BATCH_SIZE`
fn env_value(key: &str) -> Option<String> {
    std::env::var(key.to_uppercase())
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, value)),
        None => Ok(default),
    }
}

/// Split a comma separated list, dropping blanks and duplicates
fn parse_language_codes(raw: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }
    codes
}

/// Config pointing at a mock server with fast retries
#[cfg(test)]
pub(crate) fn test_config(api_url: &str) -> Config {
    Config {
        catalog_path: PathBuf::from("Localizable.xcstrings"),
        target_languages: vec!["ja".to_string()],
        app_category: None,
        mark_extraction_manual: false,
        gemini_api_key: "test-gemini-key".to_string(),
        gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        gemini_api_url: api_url.to_string(),
        batch_size: DEFAULT_BATCH_SIZE,
        request_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        backoff: BackoffPolicy::new(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(50)),
    }
}

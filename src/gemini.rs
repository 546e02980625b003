use crate::batch::Batch;
use crate::config::Config;
use crate::framing::{decode_response, encode_payload, frame, DecodeError, DELIMITER};
use crate::languages::LanguageRegistry;
use crate::retry::with_retry_forever;
use crate::ticker::ElapsedTicker;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::info;

/// Gemini `generateContent` request
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Failures of a single translation attempt. All of them are retried.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to send request to Gemini API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Gemini API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse Gemini response: {0}")]
    InvalidBody(#[source] reqwest::Error),

    #[error("Gemini response contained no text")]
    NoText,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A translated batch, aligned with its items
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTranslation {
    pub translations: Vec<String>,
    /// Requests made, including failed ones
    pub attempts: u32,
}

/// Build the translation prompt for a batch
fn build_translation_prompt(
    batch: &Batch,
    target_language: &str,
    app_category: Option<&str>,
) -> String {
    let mut prompt = format!(
        r#"You are a professional localization service provider specializing in translating content for specific languages, cultures, and categories.
For example:
{example_in}
The translation is:
{example_out}

Translate the following content to {target_language}"#,
        example_in = frame(&encode_payload(&["Hello", "World", "Google"])),
        example_out = frame(&encode_payload(&["你好", "世界", "Google"])),
        target_language = target_language,
    );

    if let Some(category) = app_category {
        prompt.push_str(&format!(" for an app in the {} category", category));
    }

    prompt.push_str(&format!(
        ".\nEach item is separated by {delim}. Return exactly {count} items separated by {delim}, in the same order, wrapped in {start}...{end}. Keep the structure of each item (such as line breaks and format specifiers like %@ or %lld) in your response.\n\n{payload}",
        delim = DELIMITER,
        count = batch.len(),
        start = crate::framing::START_MARKER,
        end = crate::framing::END_MARKER,
        payload = frame(&batch.encode()),
    ));

    prompt
}

/// `{api_url}/{model}:generateContent`
fn endpoint(config: &Config) -> String {
    format!(
        "{}/{}:generateContent",
        config.gemini_api_url.trim_end_matches('/'),
        config.gemini_model
    )
}

/// One request/response round trip, returning the model's text
async fn generate_content(
    client: &reqwest::Client,
    config: &Config,
    request: &GenerateContentRequest,
) -> Result<String, RemoteError> {
    let response = client
        .post(endpoint(config))
        .header("x-goog-api-key", &config.gemini_api_key)
        .header("Content-Type", "application/json")
        .json(request)
        .send()
        .await
        .map_err(RemoteError::Transport)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        return Err(RemoteError::Status { status, body });
    }

    let parsed: GenerateContentResponse =
        response.json().await.map_err(RemoteError::InvalidBody)?;

    parsed.first_text().ok_or(RemoteError::NoText)
}

/// One full attempt: request, then decode against the batch's sources
async fn attempt_batch(
    client: &reqwest::Client,
    config: &Config,
    request: &GenerateContentRequest,
    batch: &Batch,
    label: &str,
) -> Result<Vec<String>, RemoteError> {
    info!("{}: sending request", label);
    let ticker = ElapsedTicker::start(label, Duration::from_secs(1));
    let result = generate_content(client, config, request).await;
    ticker.stop().await;

    let text = result?;
    let translations = decode_response(&text, &batch.sources())?;
    Ok(translations)
}

/// Translate a batch, retrying until the service returns a well-formed answer.
///
/// The returned translations have the same length and order as `batch.items`.
pub async fn translate_batch(
    client: &reqwest::Client,
    config: &Config,
    batch: &Batch,
) -> BatchTranslation {
    let target_language = LanguageRegistry::get().display_name(&batch.language);
    let prompt = build_translation_prompt(
        batch,
        &target_language,
        config.app_category.as_deref(),
    );
    let request = GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part { text: Some(prompt) }],
        }],
    };
    let label = format!(
        "Translation of {} strings to {}",
        batch.len(),
        target_language
    );

    if !config.request_delay.is_zero() {
        sleep(config.request_delay).await;
    }

    let retried = with_retry_forever(&config.backoff, &label, || {
        attempt_batch(client, config, &request, batch, &label)
    })
    .await;

    BatchTranslation {
        translations: retried.value,
        attempts: retried.attempts,
    }
}

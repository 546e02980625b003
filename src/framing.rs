//! Request/response framing for batched translation.
//!
//! A batch travels as its source strings joined by [`DELIMITER`] and wrapped
//! in [`START_MARKER`]/[`END_MARKER`]. The model answers in free text; only
//! the first framed region of the answer is kept.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Separator between items of a batch payload
pub const DELIMITER: &str = "||";

/// Marks the start of the payload
pub const START_MARKER: &str = "<Start>";

/// Marks the end of the payload
pub const END_MARKER: &str = "<End>";

static FRAME_REGEX: OnceLock<Regex> = OnceLock::new();

/// Errors raised while decoding a model response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("framing markers <Start>...<End> not found in response")]
    MissingMarkers,

    #[error("expected {expected} translated segments, got {actual}")]
    SegmentMismatch { expected: usize, actual: usize },
}

/// Join source strings into a single payload
pub fn encode_payload<S: AsRef<str>>(sources: &[S]) -> String {
    sources
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Wrap a payload in framing markers
pub fn frame(payload: &str) -> String {
    format!("{}{}{}", START_MARKER, payload, END_MARKER)
}

/// Extract the trimmed payload between the first pair of markers
pub fn extract_payload(response: &str) -> Result<&str, DecodeError> {
    let regex = FRAME_REGEX.get_or_init(|| {
        Regex::new(&format!(
            r"(?s){}(.*?){}",
            regex::escape(START_MARKER),
            regex::escape(END_MARKER)
        ))
        .unwrap()
    });

    regex
        .captures(response)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .ok_or(DecodeError::MissingMarkers)
}

/// Split a payload into exactly `expected` segments.
///
/// A single expected segment is the whole payload, even if it contains the
/// delimiter.
pub fn split_segments(payload: &str, expected: usize) -> Result<Vec<String>, DecodeError> {
    if expected == 1 {
        return Ok(vec![payload.to_string()]);
    }

    let segments: Vec<String> = payload.split(DELIMITER).map(str::to_string).collect();
    if segments.len() != expected {
        return Err(DecodeError::SegmentMismatch {
            expected,
            actual: segments.len(),
        });
    }

    Ok(segments)
}

/// Trim a translated segment at the edges where its source has no whitespace
pub fn align_whitespace(source: &str, translated: &str) -> String {
    let mut aligned = translated;
    if !source.starts_with(char::is_whitespace) {
        aligned = aligned.trim_start();
    }
    if !source.ends_with(char::is_whitespace) {
        aligned = aligned.trim_end();
    }
    aligned.to_string()
}

/// Decode a full model response into translations aligned with `sources`
pub fn decode_response<S: AsRef<str>>(
    response: &str,
    sources: &[S],
) -> Result<Vec<String>, DecodeError> {
    let payload = extract_payload(response)?;
    let segments = split_segments(payload, sources.len())?;

    Ok(sources
        .iter()
        .zip(segments)
        .map(|(source, segment)| align_whitespace(source.as_ref(), &segment))
        .collect())
}

//! Plan extraction: isolate the JSON object in noisy model output.
//!
//! Generative backends wrap their JSON in prose, code fences, or trailing
//! commentary. Extraction takes the span from the first `{` to the last `}`
//! inclusive and hands it to `serde_json`. Brace scanning is a best-effort
//! boundary, not a JSON parser; strict parsing of the isolated span is the
//! validator.
//!
//! [`try_extract`] reports why nothing was produced. [`extract_plan`] and
//! [`extract_suggestions`] log that reason and return `None`, since an absent
//! plan is a normal outcome for callers.

use crate::types::{ChartPlan, ChartSuggestions};
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No `{ ... }` span in the text (possibly still streaming, or empty).
    #[error("no JSON object found in {len} bytes of output")]
    NoObject { len: usize },
    #[error("malformed JSON object: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The substring from the first `{` to the last `}` inclusive.
///
/// Returns `None` when either brace is missing or the last `}` precedes the
/// first `{`.
pub fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Extract and strictly parse the outermost JSON object in `text`.
pub fn try_extract<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let span = object_span(text).ok_or(ExtractError::NoObject { len: text.len() })?;
    Ok(serde_json::from_str(span)?)
}

/// Extract a [`ChartPlan`], or `None` when the output holds no valid plan.
pub fn extract_plan(text: &str) -> Option<ChartPlan> {
    recover(try_extract(text), "chart plan")
}

/// Extract [`ChartSuggestions`], or `None` when the output holds none.
pub fn extract_suggestions(text: &str) -> Option<ChartSuggestions> {
    recover(try_extract(text), "chart suggestions")
}

fn recover<T>(res: Result<T, ExtractError>, what: &str) -> Option<T> {
    match res {
        Ok(value) => Some(value),
        Err(err @ ExtractError::NoObject { .. }) => {
            tracing::debug!(%err, "no {what} in output");
            None
        }
        Err(err) => {
            tracing::warn!(%err, "could not parse {what}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

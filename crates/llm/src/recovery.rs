//! Recovery of JSON objects from free-text generator output.
//!
//! Models are asked for bare JSON but routinely wrap it in code fences,
//! preface it with prose, or leave raw control characters inside string
//! literals. Strategies are tried in order from cheapest to most
//! invasive; truncated output is reported as such instead of being
//! "repaired" into a half-object.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("fence pattern compiles")
});

#[derive(Debug, Error)]
pub enum JsonRecoveryError {
    /// An object opens but never closes. The request likely ran out of
    /// output tokens; retry with a larger budget rather than parsing a
    /// fragment.
    #[error("Response appears truncated (unterminated JSON object): {preview}")]
    Truncated { preview: String },

    /// Valid JSON was found but it does not match the expected shape.
    #[error("Recovered JSON does not match the expected shape: {source}")]
    Shape { source: serde_json::Error },

    /// No strategy produced parsable JSON.
    #[error("No recoverable JSON object in response: {preview}")]
    Exhausted { preview: String },
}

/// Extract and deserialize the one JSON object a response should contain.
pub fn recover<T: DeserializeOwned>(raw: &str) -> Result<T, JsonRecoveryError> {
    let trimmed = raw.trim();

    let mut candidates: Vec<Cow<'_, str>> = vec![Cow::Borrowed(trimmed)];
    if let Some(captures) = FENCED_BLOCK.captures(trimmed) {
        if let Some(inner) = captures.get(1) {
            push_sliced(&mut candidates, inner.as_str().trim());
        }
    }
    push_sliced(&mut candidates, trimmed);

    for candidate in &candidates {
        match attempt::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(Some(shape)) => return Err(shape),
            Err(None) => {}
        }
    }

    // Nothing parsed. Distinguish "cut off mid-object" from "no JSON".
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(open), Some(close)) if close > open => Err(JsonRecoveryError::Exhausted {
            preview: preview(trimmed),
        }),
        (Some(_), _) => Err(JsonRecoveryError::Truncated {
            preview: preview(trimmed),
        }),
        (None, _) => Err(JsonRecoveryError::Exhausted {
            preview: preview(trimmed),
        }),
    }
}

/// Add the outermost `{...}` slice of `text` and its control-character
/// cleaned form as candidates.
fn push_sliced<'a>(candidates: &mut Vec<Cow<'a, str>>, text: &'a str) {
    if let (Some(open), Some(close)) = (text.find('{'), text.rfind('}')) {
        if close > open {
            let slice = &text[open..=close];
            candidates.push(Cow::Borrowed(slice));
            candidates.push(Cow::Owned(escape_control_chars(slice)));
        }
    }
}

/// `Ok` on success, `Err(Some(..))` when the JSON is valid but the wrong
/// shape, `Err(None)` when the candidate is not JSON at all.
fn attempt<T: DeserializeOwned>(candidate: &str) -> Result<T, Option<JsonRecoveryError>> {
    match serde_json::from_str::<T>(candidate) {
        Ok(value) => Ok(value),
        Err(typed_err) => match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(_) => Err(Some(JsonRecoveryError::Shape { source: typed_err })),
            Err(_) => Err(None),
        },
    }
}

/// Escape raw control characters inside JSON string literals, leaving
/// structural whitespace alone.
fn escape_control_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    for ch in input.chars() {
        if !in_string {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
            continue;
        }
        if escaped {
            out.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                out.push(ch);
                escaped = true;
            }
            '"' => {
                out.push(ch);
                in_string = false;
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 120;
    let mut out: String = text.chars().take(MAX_CHARS).collect();
    if text.chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}

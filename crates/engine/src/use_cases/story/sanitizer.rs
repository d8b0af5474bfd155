//! Extraction of typed records from free-form model output.
//!
//! Models wrap JSON in fences, prepend commentary, or append a second
//! example object. The sanitizer strips fences, tries the whole text, then
//! scans for balanced top-level `{...}` spans (string and escape aware) and
//! accepts exactly one distinct candidate that deserializes and validates.
//! Several distinct valid candidates are rejected as ambiguous.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A record shape a stage expects back from the model.
pub trait StageRecord: DeserializeOwned {
    /// Schema-conformance check beyond what deserialization enforces.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    #[error("model returned an empty response")]
    Empty,
    #[error("no structured record found in response")]
    NoRecord,
    #[error("malformed record: {0}")]
    Syntax(String),
    #[error("record does not match expected shape: {0}")]
    Schema(String),
    #[error("{0} distinct records found, refusing to guess")]
    Ambiguous(usize),
}

/// Parse `text` into `T`, failing on anything but a single conforming record.
pub fn parse<T: StageRecord>(text: &str) -> Result<T, SanitizeError> {
    if text.trim().is_empty() {
        return Err(SanitizeError::Empty);
    }

    let cleaned = strip_fences(text);
    let cleaned = cleaned.trim();

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(cleaned) {
        return conform::<T>(value).map(|(record, _)| record);
    }

    let mut conforming: Vec<(T, Value)> = Vec::new();
    let mut first_schema_error = None;
    let mut first_syntax_error = None;

    let spans = record_spans(cleaned);
    if spans.is_empty() {
        return Err(SanitizeError::NoRecord);
    }

    for span in spans {
        let value = match serde_json::from_str::<Value>(span) {
            Ok(value) => value,
            Err(e) => {
                first_syntax_error.get_or_insert_with(|| e.to_string());
                continue;
            }
        };
        match conform::<T>(value) {
            Ok((record, value)) => {
                if !conforming.iter().any(|(_, seen)| *seen == value) {
                    conforming.push((record, value));
                }
            }
            Err(e) => {
                first_schema_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    match conforming.len() {
        1 => Ok(conforming.remove(0).0),
        0 => Err(match (first_schema_error, first_syntax_error) {
            (Some(schema), _) => SanitizeError::Schema(schema),
            (None, Some(syntax)) => SanitizeError::Syntax(syntax),
            (None, None) => SanitizeError::NoRecord,
        }),
        n => Err(SanitizeError::Ambiguous(n)),
    }
}

/// Parse `text`, returning `fallback` (and logging why) on any failure.
pub fn parse_or<T: StageRecord>(text: &str, fallback: T, context: &str) -> T {
    match parse(text) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(
                context = context,
                error = %e,
                original = %text,
                "Failed to parse model response, using fallback"
            );
            fallback
        }
    }
}

fn conform<T: StageRecord>(value: Value) -> Result<(T, Value), SanitizeError> {
    let record: T =
        serde_json::from_value(value.clone()).map_err(|e| SanitizeError::Schema(e.to_string()))?;
    record.validate().map_err(SanitizeError::Schema)?;
    Ok((record, value))
}

/// Remove Markdown code fences (```json and bare ```).
pub fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        // Drop a language tag directly after the opening fence
        let tag_len = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphanumeric())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if rest[..tag_len].eq_ignore_ascii_case("json") {
            rest = &rest[tag_len..];
        }
    }
    out.push_str(rest);
    out
}

/// Balanced top-level `{...}` spans. Braces inside JSON strings do not count.
fn record_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            // Quotes only open strings inside a candidate; prose quotes are ignored
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        spans.push(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    spans
}

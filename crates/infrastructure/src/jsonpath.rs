//! JSON-path evaluator for body extraction
//!
//! Supports the subset extraction rules use: `$`, dotted fields,
//! `field[0]` indexing, `['quoted key']` and `[*]`, which applies the rest
//! of the path to every element and collects the matches into an array.

use courier_application::{DispatchError, DispatchResult, JsonPathEvaluator};
use serde_json::Value;

/// Error type for path parsing.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum JsonPathError {
    /// The path does not start at the root.
    #[error("JSON path must start with '$': {0}")]
    MissingRoot(String),

    /// An index is neither a number, `*` nor a quoted key.
    #[error("invalid array index: {0}")]
    InvalidIndex(String),

    /// A bracket was opened and never closed.
    #[error("unclosed bracket in JSON path: {0}")]
    UnclosedBracket(String),
}

impl From<JsonPathError> for DispatchError {
    fn from(err: JsonPathError) -> Self {
        Self::Extraction(err.to_string())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
    Wildcard,
}

/// Default [`JsonPathEvaluator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleJsonPath;

impl JsonPathEvaluator for SimpleJsonPath {
    fn get(&self, document: &Value, path: &str) -> DispatchResult<Option<Value>> {
        Ok(query(document, path)?)
    }
}

/// Resolves `path` against `document`.
///
/// # Errors
///
/// Returns an error if the path cannot be parsed. A path that parses but
/// matches nothing is `Ok(None)`.
pub fn query(document: &Value, path: &str) -> Result<Option<Value>, JsonPathError> {
    Ok(select(document, &parse(path)?))
}

fn select(current: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(current.clone());
    };
    match segment {
        Segment::Field(name) => current.get(name.as_str()).and_then(|v| select(v, rest)),
        Segment::Index(idx) => current.get(*idx).and_then(|v| select(v, rest)),
        Segment::Wildcard => {
            let items = current.as_array()?;
            Some(Value::Array(
                items.iter().filter_map(|item| select(item, rest)).collect(),
            ))
        }
    }
}

fn parse(path: &str) -> Result<Vec<Segment>, JsonPathError> {
    let trimmed = path.trim();
    let Some(rest) = trimmed.strip_prefix('$') else {
        return Err(JsonPathError::MissingRoot(trimmed.to_string()));
    };

    let mut segments = Vec::new();
    let mut field = String::new();
    let mut chars = rest.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => push_field(&mut segments, &mut field),
            '[' => {
                push_field(&mut segments, &mut field);
                let mut inner = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(JsonPathError::UnclosedBracket(trimmed.to_string()));
                }
                segments.push(bracket_segment(inner.trim())?);
            }
            _ => field.push(ch),
        }
    }
    push_field(&mut segments, &mut field);
    Ok(segments)
}

fn push_field(segments: &mut Vec<Segment>, field: &mut String) {
    if !field.is_empty() {
        segments.push(Segment::Field(std::mem::take(field)));
    }
}

fn bracket_segment(inner: &str) -> Result<Segment, JsonPathError> {
    if inner == "*" {
        return Ok(Segment::Wildcard);
    }
    for quote in ['\'', '"'] {
        if let Some(key) = inner
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return Ok(Segment::Field(key.to_string()));
        }
    }
    inner
        .parse()
        .map(Segment::Index)
        .map_err(|_| JsonPathError::InvalidIndex(inner.to_string()))
}

//! Path-addressed mutation of nested documents.
//!
//! A path such as `experience.0.bullets.2` is parsed into tagged segments and
//! resolved against the JSON shape of the document. Every segment is checked
//! against the container it actually lands on, so a path that does not fit
//! the document fails with `EditError::MalformedPath` instead of writing
//! somewhere unexpected.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("value written at '{path}' does not fit the document: {source}")]
    IncompatibleValue {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl EditError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        EditError::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Record key, e.g. `jobTitle`.
    Field(String),
    /// Sequence position, e.g. `0`.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "field '{name}'"),
            PathSegment::Index(i) => write!(f, "index {i}"),
        }
    }
}

/// A parsed, non-empty dot-delimited path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, EditError> {
        if raw.is_empty() {
            return Err(EditError::malformed(raw, "path is empty"));
        }

        let segments = raw
            .split('.')
            .enumerate()
            .map(|(pos, part)| parse_segment(raw, pos, part))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn parse_segment(raw: &str, pos: usize, part: &str) -> Result<PathSegment, EditError> {
    if part.is_empty() {
        return Err(EditError::malformed(
            raw,
            format!("segment {pos} is empty"),
        ));
    }
    if part.bytes().all(|b| b.is_ascii_digit()) {
        let index = part.parse::<usize>().map_err(|_| {
            EditError::malformed(raw, format!("index '{part}' is too large"))
        })?;
        return Ok(PathSegment::Index(index));
    }
    Ok(PathSegment::Field(part.to_string()))
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "record",
    }
}

fn child<'a>(node: &'a Value, segment: &PathSegment) -> Result<&'a Value, String> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Field(name)) => {
            map.get(name).ok_or_else(|| format!("record has no field '{name}'"))
        }
        (Value::Array(items), PathSegment::Index(i)) => items
            .get(*i)
            .ok_or_else(|| format!("index {i} is past the end of a sequence of length {}", items.len())),
        (other, segment) => Err(format!("{segment} cannot address a {}", kind_name(other))),
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &PathSegment) -> Result<&'a mut Value, String> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Field(name)) => map
            .get_mut(name)
            .ok_or_else(|| format!("record has no field '{name}'")),
        (Value::Array(items), PathSegment::Index(i)) => {
            let len = items.len();
            items
                .get_mut(*i)
                .ok_or_else(|| format!("index {i} is past the end of a sequence of length {len}"))
        }
        (other, segment) => Err(format!("{segment} cannot address a {}", kind_name(other))),
    }
}

/// Returns a copy of `root` with `value` placed at `path`.
///
/// Only existing locations can be written: sequences never grow and records
/// never gain keys. `root` itself is left untouched.
pub fn set_value(root: &Value, path: &FieldPath, value: Value) -> Result<Value, EditError> {
    let mut updated = root.clone();
    let mut current = &mut updated;
    for segment in path.segments() {
        current = child_mut(current, segment).map_err(|reason| EditError::malformed(path.as_str(), reason))?;
    }
    *current = value;
    Ok(updated)
}

/// Borrows the value at `path`.
pub fn get_value<'a>(root: &'a Value, path: &FieldPath) -> Result<&'a Value, EditError> {
    path.segments().iter().try_fold(root, |node, segment| {
        child(node, segment).map_err(|reason| EditError::malformed(path.as_str(), reason))
    })
}

/// Typed wrapper over [`set_value`]: encodes `doc`, places `value`, decodes the
/// result back into `T`. A value that does not fit the target field's type
/// yields `IncompatibleValue`.
pub fn set<T>(doc: &T, path: &FieldPath, value: Value) -> Result<T, EditError>
where
    T: Serialize + DeserializeOwned,
{
    let tree = serde_json::to_value(doc)?;
    let updated = set_value(&tree, path, value)?;
    serde_json::from_value(updated).map_err(|source| EditError::IncompatibleValue {
        path: path.to_string(),
        source,
    })
}

pub fn get<T: Serialize>(doc: &T, path: &FieldPath) -> Result<Value, EditError> {
    let tree = serde_json::to_value(doc)?;
    get_value(&tree, path).cloned()
}

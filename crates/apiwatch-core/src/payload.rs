//! Safe access into upstream response documents.
//!
//! Responses are loosely shaped JSON. Every lookup here returns `None`
//! instead of failing when a key is missing or an intermediate value is
//! not a container.

use crate::record::RawResponse;
use serde_json::Value;
use std::borrow::Cow;

/// Why a response could not be turned into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    Missing,
    Empty,
    Malformed,
    NotAnObject,
}

/// A decoded response document (always a JSON object at the top level)
#[derive(Debug, Clone, PartialEq)]
pub struct Payload<'a> {
    root: Cow<'a, Value>,
}

impl<'a> Payload<'a> {
    /// Decode a raw response into a document.
    ///
    /// Structured responses are borrowed as-is, text is decoded as JSON.
    pub fn parse(raw: &'a RawResponse) -> Result<Self, ParseFailure> {
        let root = match raw {
            RawResponse::Missing => return Err(ParseFailure::Missing),
            RawResponse::Structured(Value::Null) => return Err(ParseFailure::Missing),
            RawResponse::Structured(value) => Cow::Borrowed(value),
            RawResponse::Text(text) => {
                if text.trim().is_empty() {
                    return Err(ParseFailure::Empty);
                }
                let value: Value =
                    serde_json::from_str(text).map_err(|_| ParseFailure::Malformed)?;
                Cow::Owned(value)
            }
        };

        if !root.is_object() {
            return Err(ParseFailure::NotAnObject);
        }

        Ok(Self { root })
    }

    /// Wrap an existing document
    pub fn from_value(value: &'a Value) -> Result<Self, ParseFailure> {
        if value.is_object() {
            Ok(Self {
                root: Cow::Borrowed(value),
            })
        } else {
            Err(ParseFailure::NotAnObject)
        }
    }

    /// Resolve a dot-separated path such as `data.data.message`
    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve_path(&self.root, path)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }
}

/// Resolve a dot-separated path; numeric segments index into arrays.
pub fn resolve_path<'v>(data: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(data);
    }

    let mut current = data;
    for part in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a JSON value as display text (strings without quotes)
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Whether a value carries no usable content.
///
/// Null, empty strings, empty containers, `false` and zero count as blank.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
    }
}

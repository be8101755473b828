//! Path keys and the plain-value lens.
//!
//! Paths address nodes from the root of a tree. They render as JSON Pointers
//! (RFC 6901) in logs and error messages.

use std::borrow::Cow;
use std::fmt;

use serde_json::{Map, Value};

use crate::lens::Lens;

/// A single step in a path: a record field or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathKey {
    Key(String),
    Index(usize),
}

/// Keys from the root of a tree to one of its nodes.
pub type Path = Vec<PathKey>;

impl PathKey {
    /// Returns the index this key addresses in a sequence, if any.
    ///
    /// String keys count when they are canonical non-negative integers.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathKey::Index(index) => Some(*index),
            PathKey::Key(key) if is_valid_index(key) => key.parse().ok(),
            PathKey::Key(_) => None,
        }
    }

    /// Returns the key this step addresses in a record.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathKey::Key(key) => Cow::Borrowed(key),
            PathKey::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Key(key) => f.write_str(&escape_component(key)),
            PathKey::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        PathKey::Key(key.to_owned())
    }
}

impl From<String> for PathKey {
    fn from(key: String) -> Self {
        PathKey::Key(key)
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

/// Formats a path as a JSON Pointer. The root path is the empty string.
pub fn format_path(path: &[PathKey]) -> String {
    let mut out = String::new();
    for key in path {
        out.push('/');
        out.push_str(&key.to_string());
    }
    out
}

/// Returns `prefix` followed by `path`.
pub fn prefixed(prefix: &[PathKey], path: &[PathKey]) -> Path {
    let mut out = Vec::with_capacity(prefix.len() + path.len());
    out.extend_from_slice(prefix);
    out.extend_from_slice(path);
    out
}

fn escape_component(component: &str) -> Cow<'_, str> {
    if !component.contains('/') && !component.contains('~') {
        return Cow::Borrowed(component);
    }
    // `~` first, or the `~1` produced for `/` would be escaped again.
    Cow::Owned(component.replace('~', "~0").replace('/', "~1"))
}

fn is_valid_index(key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    let bytes = key.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

fn read(context: &Value, key: &PathKey) -> Value {
    match context {
        Value::Object(map) => map.get(key.as_key().as_ref()).cloned(),
        Value::Array(items) => key.as_index().and_then(|index| items.get(index)).cloned(),
        _ => None,
    }
    .unwrap_or(Value::Null)
}

/// A lens onto `key` of a plain record or sequence.
///
/// Reading a missing key yields `null`. Writing a value equal to the current
/// one returns the context unchanged; otherwise the container is copied with
/// the key written. Sequences are padded with `null` up to the index, and a
/// scalar context is replaced by a record holding just the key.
pub fn value_at(key: impl Into<PathKey>) -> Lens<Value, Value> {
    let key = key.into();
    let read_key = key.clone();
    Lens::new(
        move |context: &Value| read(context, &read_key),
        move |value: Value, context: &Value| {
            if read(context, &key) == value {
                return context.clone();
            }
            match context {
                Value::Array(items) => match key.as_index() {
                    Some(index) => {
                        let mut items = items.clone();
                        if index >= items.len() {
                            items.resize(index + 1, Value::Null);
                        }
                        items[index] = value;
                        Value::Array(items)
                    }
                    None => {
                        tracing::debug!(key = %key, "ignoring non-index key on a sequence");
                        context.clone()
                    }
                },
                Value::Object(map) => {
                    let mut map = map.clone();
                    map.insert(key.as_key().into_owned(), value);
                    Value::Object(map)
                }
                _ => {
                    let mut map = Map::new();
                    map.insert(key.as_key().into_owned(), value);
                    Value::Object(map)
                }
            }
        },
    )
}

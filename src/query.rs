//! # Request Context
//!
//! The serializer never sees an HTTP request. It only needs something that can
//! answer "what was sent for query parameter `x`?", which is the
//! [`RequestContext`] trait.
//!
//! [`QueryParams`] is the bundled implementation. It parses a raw query string
//! using bracket notation, so
//!
//! ```text
//! ?fields[posts]=title,body&include[]=author
//! ```
//!
//! becomes `fields => { posts => "title,body" }` and `include => ["author"]`.
//! Keeping the structure matters: the resolvers reject the wrong shape with a
//! [`QueryError`](crate::error::QueryError) instead of guessing.

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;

/// One query parameter value, possibly nested through bracket notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    String(String),
    List(Vec<QueryValue>),
    Map(IndexMap<String, QueryValue>),
}

impl QueryValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Looks up a keyed child. Lists are never keyed by name.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        match self {
            QueryValue::Map(entries) => entries.get(key),
            _ => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

/// The opaque "current request" handed to the serializer.
pub trait RequestContext {
    /// Value sent for a top-level query parameter, if any.
    fn query_param(&self, name: &str) -> Option<&QueryValue>;
}

/// Parsed query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, QueryValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string, with or without the leading `?`.
    ///
    /// Keys and values are percent-decoded and `+` is read as a space. A repeated
    /// scalar key keeps the last value.
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::new();
        let raw = raw.strip_prefix('?').unwrap_or(raw);

        for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
            let mut parts = pair.splitn(2, '=');
            let key = decode(parts.next().unwrap_or(""));
            let value = decode(parts.next().unwrap_or(""));
            if key.is_empty() {
                continue;
            }
            let (name, path) = split_key(&key);
            query.insert(name, &path, value);
        }

        query
    }

    /// Sets a top-level parameter, replacing any previous value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn insert(&mut self, name: String, path: &[String], value: String) {
        if path.is_empty() {
            self.params.insert(name, QueryValue::String(value));
            return;
        }
        let slot = self
            .params
            .entry(name)
            .or_insert_with(|| QueryValue::Map(IndexMap::new()));
        insert_nested(slot, path, value);
    }
}

impl RequestContext for QueryParams {
    fn query_param(&self, name: &str) -> Option<&QueryValue> {
        self.params.get(name)
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Splits `fields[posts][x]` into `("fields", ["posts", "x"])`.
///
/// A key with unbalanced brackets is taken literally.
fn split_key(key: &str) -> (String, Vec<String>) {
    let Some(open) = key.find('[') else {
        return (key.to_string(), Vec::new());
    };
    if open == 0 {
        return (key.to_string(), Vec::new());
    }

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(close) => {
                segments.push(stripped[..close].to_string());
                rest = &stripped[close + 1..];
            }
            None => return (key.to_string(), Vec::new()),
        }
    }
    if !rest.is_empty() {
        return (key.to_string(), Vec::new());
    }

    (key[..open].to_string(), segments)
}

fn insert_nested(slot: &mut QueryValue, path: &[String], value: String) {
    let Some((segment, rest)) = path.split_first() else {
        *slot = QueryValue::String(value);
        return;
    };

    if segment.is_empty() {
        if !matches!(slot, QueryValue::List(_)) {
            *slot = QueryValue::List(Vec::new());
        }
        if let QueryValue::List(items) = slot {
            let mut child = QueryValue::Map(IndexMap::new());
            insert_nested(&mut child, rest, value);
            items.push(child);
        }
    } else {
        if !matches!(slot, QueryValue::Map(_)) {
            *slot = QueryValue::Map(IndexMap::new());
        }
        if let QueryValue::Map(entries) = slot {
            let child = entries
                .entry(segment.clone())
                .or_insert_with(|| QueryValue::Map(IndexMap::new()));
            insert_nested(child, rest, value);
        }
    }
}

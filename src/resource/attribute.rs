//! Attribute producers.
//!
//! A model declares its attributes as an ordered list of producers. Eager values
//! are plain JSON. Lazy and conditional producers are closures that only run
//! after the sparse fieldset has selected the attribute, so an expensive or
//! failing producer that nobody asked for never executes.

use crate::error::ResourceError;
use serde_json::Value;
use std::fmt;

type Producer<'a> = Box<dyn FnOnce() -> Result<AttributeValue<'a>, ResourceError> + 'a>;

/// One attribute as declared by the model layer.
pub enum AttributeValue<'a> {
    /// Already computed. `Value::Null` renders as JSON `null`.
    Value(Value),
    /// Computed on demand. May itself yield [`AttributeValue::Missing`].
    Lazy(Producer<'a>),
    /// Do not render this key at all.
    Missing,
}

impl<'a> AttributeValue<'a> {
    pub fn value(value: impl Into<Value>) -> Self {
        AttributeValue::Value(value.into())
    }

    pub fn lazy<F, V>(producer: F) -> Self
    where
        F: FnOnce() -> V + 'a,
        V: Into<Value>,
    {
        AttributeValue::Lazy(Box::new(move || {
            Ok::<_, ResourceError>(AttributeValue::Value(producer().into()))
        }))
    }

    /// Lazy producer that can fail. The error only surfaces if the attribute is selected.
    pub fn try_lazy<F, V>(producer: F) -> Self
    where
        F: FnOnce() -> Result<V, ResourceError> + 'a,
        V: Into<Value>,
    {
        AttributeValue::Lazy(Box::new(move || producer().map(|v| AttributeValue::Value(v.into()))))
    }

    /// Lazy producer that decides at evaluation time, e.g. by returning [`AttributeValue::when`].
    pub fn deferred<F>(producer: F) -> Self
    where
        F: FnOnce() -> AttributeValue<'a> + 'a,
    {
        AttributeValue::Lazy(Box::new(move || Ok::<_, ResourceError>(producer())))
    }

    /// Renders `producer()` when `condition` holds, otherwise drops the key.
    pub fn when<F, V>(condition: bool, producer: F) -> Self
    where
        F: FnOnce() -> V + 'a,
        V: Into<Value>,
    {
        if condition {
            Self::lazy(producer)
        } else {
            AttributeValue::Missing
        }
    }

    pub fn when_value(condition: bool, value: impl Into<Value>) -> Self {
        if condition {
            Self::value(value)
        } else {
            AttributeValue::Missing
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AttributeValue::Missing)
    }

    /// Evaluates the producer chain. `None` means the key must be omitted.
    pub fn resolve(self) -> Result<Option<Value>, ResourceError> {
        let mut current = self;
        loop {
            current = match current {
                AttributeValue::Value(value) => return Ok(Some(value)),
                AttributeValue::Missing => return Ok(None),
                AttributeValue::Lazy(producer) => producer()?,
            };
        }
    }
}

impl From<Value> for AttributeValue<'_> {
    fn from(value: Value) -> Self {
        AttributeValue::Value(value)
    }
}

impl fmt::Debug for AttributeValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            AttributeValue::Lazy(_) => f.write_str("Lazy(..)"),
            AttributeValue::Missing => f.write_str("Missing"),
        }
    }
}

/// Ordered attribute declarations of one resource.
#[derive(Debug, Default)]
pub struct Attributes<'a> {
    entries: Vec<(String, AttributeValue<'a>)>,
}

impl<'a> Attributes<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, name: impl Into<String>, value: AttributeValue<'a>) -> Self {
        self.entries.push((name.into(), value));
        self
    }

    pub fn value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, AttributeValue::value(value))
    }

    pub fn lazy<F, V>(self, name: impl Into<String>, producer: F) -> Self
    where
        F: FnOnce() -> V + 'a,
        V: Into<Value>,
    {
        self.insert(name, AttributeValue::lazy(producer))
    }

    pub fn try_lazy<F, V>(self, name: impl Into<String>, producer: F) -> Self
    where
        F: FnOnce() -> Result<V, ResourceError> + 'a,
        V: Into<Value>,
    {
        self.insert(name, AttributeValue::try_lazy(producer))
    }

    pub fn when<F, V>(self, name: impl Into<String>, condition: bool, producer: F) -> Self
    where
        F: FnOnce() -> V + 'a,
        V: Into<Value>,
    {
        self.insert(name, AttributeValue::when(condition, producer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for Attributes<'a> {
    type Item = (String, AttributeValue<'a>);
    type IntoIter = std::vec::IntoIter<(String, AttributeValue<'a>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K: Into<String>> FromIterator<(K, AttributeValue<'a>)> for Attributes<'a> {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue<'a>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

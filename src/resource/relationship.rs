//! Relationship producers.

use super::JsonApiResource;
use crate::error::ResourceError;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a domain object.
pub type ResourceRef = Arc<dyn JsonApiResource>;

type Loader<'a> = Box<dyn FnOnce() -> Result<Related<'a>, ResourceError> + 'a>;

/// The value of one declared relationship.
pub enum Related<'a> {
    One(ResourceRef),
    Many(Vec<ResourceRef>),
    /// A to-one relationship without a target, rendered as `{"data": null}`.
    Empty,
    /// Loaded only when the relationship is requested through `include`.
    Lazy(Loader<'a>),
}

/// A relationship after its loader ran.
pub(crate) enum Loaded {
    One(ResourceRef),
    Many(Vec<ResourceRef>),
    Empty,
}

impl<'a> Related<'a> {
    pub fn one<R: JsonApiResource + 'static>(resource: Arc<R>) -> Self {
        Related::One(resource)
    }

    pub fn many<I, R>(resources: I) -> Self
    where
        I: IntoIterator<Item = Arc<R>>,
        R: JsonApiResource + 'static,
    {
        Related::Many(
            resources
                .into_iter()
                .map(|resource| resource as ResourceRef)
                .collect(),
        )
    }

    pub fn optional<R: JsonApiResource + 'static>(resource: Option<Arc<R>>) -> Self {
        match resource {
            Some(resource) => Related::One(resource),
            None => Related::Empty,
        }
    }

    pub fn lazy<F>(loader: F) -> Self
    where
        F: FnOnce() -> Result<Related<'a>, ResourceError> + 'a,
    {
        Related::Lazy(Box::new(loader))
    }

    pub(crate) fn load(self) -> Result<Loaded, ResourceError> {
        let mut current = self;
        loop {
            current = match current {
                Related::One(resource) => return Ok(Loaded::One(resource)),
                Related::Many(resources) => return Ok(Loaded::Many(resources)),
                Related::Empty => return Ok(Loaded::Empty),
                Related::Lazy(loader) => loader()?,
            };
        }
    }
}

impl fmt::Debug for Related<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Related::One(resource) => write!(f, "One({}:{})", resource.resource_type(), resource.resource_id()),
            Related::Many(resources) => write!(f, "Many(len={})", resources.len()),
            Related::Empty => f.write_str("Empty"),
            Related::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Ordered relationship declarations of one resource.
#[derive(Debug, Default)]
pub struct Relationships<'a> {
    entries: Vec<(String, Related<'a>)>,
}

impl<'a> Relationships<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, name: impl Into<String>, related: Related<'a>) -> Self {
        self.entries.push((name.into(), related));
        self
    }

    pub fn one<R: JsonApiResource + 'static>(self, name: impl Into<String>, resource: Arc<R>) -> Self {
        self.insert(name, Related::one(resource))
    }

    pub fn many<I, R>(self, name: impl Into<String>, resources: I) -> Self
    where
        I: IntoIterator<Item = Arc<R>>,
        R: JsonApiResource + 'static,
    {
        self.insert(name, Related::many(resources))
    }

    pub fn lazy<F>(self, name: impl Into<String>, loader: F) -> Self
    where
        F: FnOnce() -> Result<Related<'a>, ResourceError> + 'a,
    {
        self.insert(name, Related::lazy(loader))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for Relationships<'a> {
    type Item = (String, Related<'a>);
    type IntoIter = std::vec::IntoIter<(String, Related<'a>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

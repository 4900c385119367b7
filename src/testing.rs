//! # Test Fixtures
//!
//! Utilities for exercising the serializer without a real model layer.
//!
//! - [`BasicModel`]: a dynamic domain object with ordered attributes and
//!   relations. Relations can be attached after construction through `&self`,
//!   which is how cyclic graphs (a post whose author lists the post) are built.
//! - [`Probe`]: counts how often a lazy producer actually ran.
//!
//! # Example
//! ```
//! use jsonapi_resources::testing::BasicModel;
//! use std::sync::Arc;
//!
//! let user = Arc::new(BasicModel::new("user-1").with_attribute("name", "Tim"));
//! let post = Arc::new(BasicModel::new("post-1").with_one("author", user.clone()));
//! user.set_many("posts", vec![post]);
//! ```
//!
//! Cycles built this way are reference cycles and are never freed. That is fine
//! for tests and demos.

use crate::query::{QueryParams, RequestContext};
use crate::resource::{AttributeValue, Attributes, JsonApiResource, Related, Relationships, ResourceRef};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
enum Relation {
    One(ResourceRef),
    Many(Vec<ResourceRef>),
    Empty,
}

/// Dynamic domain object. Its resource type is `basicModels`.
pub struct BasicModel {
    id: String,
    attributes: IndexMap<String, Value>,
    relations: Mutex<IndexMap<String, Relation>>,
    meta: Map<String, Value>,
}

impl BasicModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: IndexMap::new(),
            relations: Mutex::new(IndexMap::new()),
            meta: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_meta(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(name.into(), value.into());
        self
    }

    pub fn with_one<R: JsonApiResource + 'static>(self, name: impl Into<String>, related: Arc<R>) -> Self {
        self.set_one(name, related);
        self
    }

    pub fn with_many<R: JsonApiResource + 'static>(self, name: impl Into<String>, related: Vec<Arc<R>>) -> Self {
        self.set_many(name, related);
        self
    }

    /// To-many relation whose members may be of different types.
    pub fn with_mixed(self, name: impl Into<String>, related: Vec<ResourceRef>) -> Self {
        self.set_relation(name.into(), Relation::Many(related));
        self
    }

    pub fn with_empty(self, name: impl Into<String>) -> Self {
        self.set_relation(name.into(), Relation::Empty);
        self
    }

    pub fn set_one<R: JsonApiResource + 'static>(&self, name: impl Into<String>, related: Arc<R>) {
        self.set_relation(name.into(), Relation::One(related));
    }

    pub fn set_many<R: JsonApiResource + 'static>(&self, name: impl Into<String>, related: Vec<Arc<R>>) {
        let related = related.into_iter().map(|model| model as ResourceRef).collect();
        self.set_relation(name.into(), Relation::Many(related));
    }

    fn set_relation(&self, name: String, relation: Relation) {
        self.relations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, relation);
    }
}

// Relations may be cyclic, so only their names are printed.
impl fmt::Debug for BasicModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relations: Vec<String> = self
            .relations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("BasicModel")
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .field("relations", &relations)
            .finish()
    }
}

impl JsonApiResource for BasicModel {
    fn resource_id(&self) -> String {
        self.id.clone()
    }

    fn attributes(&self, _request: &dyn RequestContext) -> Attributes<'_> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), AttributeValue::from(value.clone())))
            .collect()
    }

    fn relationships(&self, _request: &dyn RequestContext) -> Relationships<'_> {
        let relations = self
            .relations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        relations
            .into_iter()
            .fold(Relationships::new(), |relationships, (name, relation)| {
                let related = match relation {
                    Relation::One(resource) => Related::One(resource),
                    Relation::Many(resources) => Related::Many(resources),
                    Relation::Empty => Related::Empty,
                };
                relationships.insert(name, related)
            })
    }

    fn meta(&self, _request: &dyn RequestContext) -> Map<String, Value> {
        self.meta.clone()
    }
}

/// Counts invocations of lazy producers.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    calls: Arc<AtomicUsize>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one call and passes `value` through.
    pub fn hit<V>(&self, value: V) -> V {
        self.calls.fetch_add(1, Ordering::SeqCst);
        value
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Shorthand for [`QueryParams::parse`].
pub fn query(raw: &str) -> QueryParams {
    QueryParams::parse(raw)
}

//! Serializable JSON:API members.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// `(type, id)`: names a resource uniquely across a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
        }
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

/// Linkage of one relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RelationshipData {
    ToOne(Option<ResourceIdentifier>),
    ToMany(Vec<ResourceIdentifier>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipObject {
    pub data: RelationshipData,
}

/// A fully rendered resource, as it appears in `data` or `included`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: Map<String, Value>,
    pub relationships: IndexMap<String, RelationshipObject>,
    pub meta: Map<String, Value>,
    pub links: Map<String, Value>,
}

impl ResourceObject {
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.resource_type.clone(), self.id.clone())
    }
}

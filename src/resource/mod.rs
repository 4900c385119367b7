//! # Resources
//!
//! This module holds the boundary with the model layer and the graph-to-document
//! compiler that walks it.
//!
//! ## Key Types
//!
//! - [`JsonApiResource`]: the trait a domain object implements to be serialized.
//! - [`ResourceNode`]: one domain object at one include prefix. It computes its own
//!   attributes, relationships and transitive includes.
//! - [`ResourceCollection`]: an ordered set of nodes. It de-duplicates what its
//!   members contribute to `included`.
//!
//! ## Implementing a resource
//!
//! ```rust
//! use jsonapi_resources::prelude::*;
//! use std::sync::Arc;
//!
//! struct Author {
//!     id: u64,
//!     name: String,
//! }
//!
//! struct Article {
//!     id: u64,
//!     title: String,
//!     author: Arc<Author>,
//! }
//!
//! impl JsonApiResource for Author {
//!     fn resource_id(&self) -> String {
//!         self.id.to_string()
//!     }
//!
//!     fn attributes(&self, _request: &dyn RequestContext) -> Attributes<'_> {
//!         Attributes::new().value("name", self.name.as_str())
//!     }
//! }
//!
//! impl JsonApiResource for Article {
//!     fn resource_id(&self) -> String {
//!         self.id.to_string()
//!     }
//!
//!     fn attributes(&self, _request: &dyn RequestContext) -> Attributes<'_> {
//!         Attributes::new()
//!             .value("title", self.title.as_str())
//!             .lazy("shouting", || self.title.to_uppercase())
//!     }
//!
//!     fn relationships(&self, _request: &dyn RequestContext) -> Relationships<'_> {
//!         Relationships::new().one("author", self.author.clone())
//!     }
//! }
//!
//! let author = Arc::new(Author { id: 1, name: "Tim".into() });
//! let article = Article { id: 9, title: "Hello".into(), author };
//!
//! let mut root = ResourceNode::new(Arc::new(article));
//! let query = QueryParams::parse("include=author&fields[articles]=title");
//! let document = DocumentAssembler::default().render(&mut root, &query).unwrap();
//!
//! assert_eq!(document.included.len(), 1);
//! assert_eq!(document.included[0].resource_type, "authors");
//! ```

pub mod attribute;
pub mod collection;
pub mod node;
pub mod object;
pub mod relationship;

pub use attribute::{AttributeValue, Attributes};
pub use collection::ResourceCollection;
pub use node::ResourceNode;
pub use object::{RelationshipData, RelationshipObject, ResourceIdentifier, ResourceObject};
pub use relationship::{Related, Relationships, ResourceRef};

use crate::query::RequestContext;
use serde_json::{Map, Value};

/// Contract between the serializer and a domain object.
///
/// Only [`resource_id`](JsonApiResource::resource_id) and
/// [`attributes`](JsonApiResource::attributes) are required. The resource type
/// defaults to the pluralised, lower-camel-cased type name (`BlogPost` becomes
/// `blogPosts`).
pub trait JsonApiResource: Send + Sync {
    fn resource_type(&self) -> String {
        default_resource_type(std::any::type_name::<Self>())
    }

    fn resource_id(&self) -> String;

    /// Attribute producers in declaration order.
    fn attributes(&self, request: &dyn RequestContext) -> Attributes<'_>;

    /// Relationship producers in declaration order.
    fn relationships(&self, _request: &dyn RequestContext) -> Relationships<'_> {
        Relationships::new()
    }

    fn meta(&self, _request: &dyn RequestContext) -> Map<String, Value> {
        Map::new()
    }

    fn links(&self, _request: &dyn RequestContext) -> Map<String, Value> {
        Map::new()
    }
}

/// Derives a resource type from a Rust type path, e.g. `app::model::BasicModel` → `basicModels`.
pub fn default_resource_type(type_name: &str) -> String {
    let path = type_name.split('<').next().unwrap_or(type_name);
    let short = path.rsplit("::").next().unwrap_or(path);

    let mut chars = short.chars();
    let mut camel = String::with_capacity(short.len() + 3);
    if let Some(first) = chars.next() {
        camel.extend(first.to_lowercase());
        camel.extend(chars);
    }
    pluralize(&camel)
}

fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.is_empty() && !stem.ends_with(|c| "aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

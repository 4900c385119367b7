#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # JSON:API Resources
//!
//! > **A compiler from object graphs to JSON:API compound documents.**
//!
//! Give it a root resource (or a collection), a request carrying `include` and
//! `fields` query parameters, and it produces
//!
//! ```json
//! { "data": { ... }, "included": [ ... ] }
//! ```
//!
//! where every related resource appears in `included` at most once, no matter how
//! many paths reach it, and cycles in the graph are harmless.
//!
//! ## 🏗️ Design
//!
//! ### Prefix-scoped includes
//! Nested include paths are never parsed as trees. Every [`ResourceNode`] knows the
//! prefix it was reached through (`""`, `"posts."`, `"posts.comments."`) and asks
//! only for the relationships requested directly beneath it. Depth comes from
//! rebasing children onto a longer prefix. Because include paths are finite, so is
//! the walk, even when the object graph loops back on itself.
//!
//! ### Lazy attributes
//! Attribute producers are a tagged value ([`AttributeValue`]): an eager JSON
//! value, a closure, or "missing". Closures run only after sparse fieldsets have
//! selected the attribute. An attribute nobody asked for never executes, and
//! neither does its error.
//!
//! ### Render-scoped caches
//! The parsed `fields` and `include` directives are memoized per render in a
//! [`RequestCache`](support::RequestCache) owned by that render's
//! [`RenderScope`](support::RenderScope). Nothing is global. Two documents
//! rendered side by side cannot see each other's directives, and the attribute
//! mode travels in [`RenderOptions`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Boundary ([`query`], [`resource`])
//! - [`RequestContext`](query::RequestContext) is all the serializer knows about a request.
//! - [`JsonApiResource`](resource::JsonApiResource) is all it knows about a domain object.
//!
//! ### 2. The Resolvers ([`support`])
//! - [`FieldResolver`](support::FieldResolver) and
//!   [`IncludeResolver`](support::IncludeResolver) parse, validate and memoize.
//!
//! ### 3. The Compiler ([`resource`], [`document`])
//! - [`ResourceNode`] and [`ResourceCollection`] walk the graph.
//! - [`DocumentAssembler`] drives a render and flushes the scope afterwards.
//!
//! ### 4. Ambient ([`config`], [`error`], [`tracing`], [`testing`])
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use jsonapi_resources::prelude::*;
//! use jsonapi_resources::testing::BasicModel;
//! use std::sync::Arc;
//!
//! let posts = vec![
//!     Arc::new(BasicModel::new("post-1").with_attribute("title", "post-title-1")),
//!     Arc::new(BasicModel::new("post-2").with_attribute("title", "post-title-2")),
//! ];
//! let user = BasicModel::new("user-1")
//!     .with_attribute("name", "user-name")
//!     .with_many("posts", posts);
//!
//! let mut root = ResourceNode::new(Arc::new(user));
//! let query = QueryParams::parse("include=posts&fields[basicModels]=title");
//! let response = DocumentAssembler::default().respond(&mut root, &query).unwrap();
//!
//! assert_eq!(response.status, 200);
//! assert_eq!(response.content_type, "application/vnd.api+json");
//! assert_eq!(response.body["included"][1]["attributes"]["title"], "post-title-2");
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- "include=posts.comments.author&fields[posts]=title"
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod query;
pub mod resource;
pub mod support;
pub mod testing;
pub mod tracing;

pub use config::{AttributeMode, RenderOptions};
pub use document::{Document, DocumentAssembler, DocumentRoot, JsonApiResponse, PrimaryData, JSON_API_MEDIA_TYPE};
pub use error::{ErrorDocument, QueryError, RenderError, ResourceError};
pub use query::{QueryParams, QueryValue, RequestContext};
pub use resource::{
    AttributeValue, Attributes, JsonApiResource, Related, Relationships, ResourceCollection, ResourceNode,
};

/// Everything needed to implement and render resources.
pub mod prelude {
    pub use crate::config::{AttributeMode, RenderOptions};
    pub use crate::document::{Document, DocumentAssembler, JsonApiResponse};
    pub use crate::error::{QueryError, RenderError, ResourceError};
    pub use crate::query::{QueryParams, RequestContext};
    pub use crate::resource::{
        AttributeValue, Attributes, JsonApiResource, Related, Relationships, ResourceCollection, ResourceNode,
        ResourceRef,
    };
}

//! # Document Assembler
//!
//! The top-level driver. It turns a root node or collection into a compound
//! document:
//!
//! 1. `data`: the root's primary representation.
//! 2. `included`: the root's de-duplicated transitive includes, each rendered in full.
//! 3. The request scope is flushed once the body is materialized.
//!
//! Each render gets its own [`RenderScope`], so directives parsed for one request
//! are never visible to another.

use crate::config::RenderOptions;
use crate::error::{ErrorDocument, RenderError};
use crate::query::RequestContext;
use crate::resource::{ResourceCollection, ResourceNode, ResourceObject};
use crate::support::{Flush, RenderScope};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Media type of every response produced here.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Top-level `data`: a single resource or a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Resource(ResourceObject),
    Collection(Vec<ResourceObject>),
}

impl PrimaryData {
    pub fn len(&self) -> usize {
        match self {
            PrimaryData::Resource(_) => 1,
            PrimaryData::Collection(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A compound document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub data: PrimaryData,
    pub included: Vec<ResourceObject>,
}

/// Something that can sit at the top of a document.
pub trait DocumentRoot: Flush {
    fn data(&self, scope: &RenderScope<'_>) -> Result<PrimaryData, RenderError>;

    fn included<'s>(&'s self, scope: &RenderScope<'_>) -> Result<Vec<&'s ResourceNode>, RenderError>;
}

impl DocumentRoot for ResourceNode {
    fn data(&self, scope: &RenderScope<'_>) -> Result<PrimaryData, RenderError> {
        self.primary_representation(scope).map(PrimaryData::Resource)
    }

    fn included<'s>(&'s self, scope: &RenderScope<'_>) -> Result<Vec<&'s ResourceNode>, RenderError> {
        self.included_section(scope)
    }
}

impl DocumentRoot for ResourceCollection {
    fn data(&self, scope: &RenderScope<'_>) -> Result<PrimaryData, RenderError> {
        self.primary_representation(scope).map(PrimaryData::Collection)
    }

    fn included<'s>(&'s self, scope: &RenderScope<'_>) -> Result<Vec<&'s ResourceNode>, RenderError> {
        self.included_section(scope)
    }
}

/// What a transport layer needs to answer the request.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Value,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAssembler {
    options: RenderOptions,
}

impl DocumentAssembler {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Compiles `root` into a document, then flushes the request scope and the root.
    ///
    /// The root is flushed even when compilation fails, so it can be rendered again.
    #[instrument(skip_all, fields(attribute_mode = %self.options.attribute_mode))]
    pub fn render<R: DocumentRoot>(
        &self,
        root: &mut R,
        request: &dyn RequestContext,
    ) -> Result<Document, RenderError> {
        let scope = RenderScope::new(request, self.options);
        let document = compile(&*root, &scope);
        scope.flush(root);

        let document = document?;
        info!(data = document.data.len(), included = document.included.len(), "Rendered document");
        Ok(document)
    }

    /// Renders `root` into a response.
    ///
    /// Malformed query parameters become a `400` with an error document. Any other
    /// failure is returned to the caller.
    pub fn respond<R: DocumentRoot>(
        &self,
        root: &mut R,
        request: &dyn RequestContext,
    ) -> Result<JsonApiResponse, RenderError> {
        match self.render(root, request) {
            Ok(document) => Ok(JsonApiResponse {
                status: 200,
                content_type: JSON_API_MEDIA_TYPE,
                body: serde_json::to_value(&document)?,
            }),
            Err(RenderError::Query(error)) => {
                warn!(status = error.status(), error = %error, "Rejected request");
                Ok(JsonApiResponse {
                    status: error.status(),
                    content_type: JSON_API_MEDIA_TYPE,
                    body: serde_json::to_value(ErrorDocument::from(&error))?,
                })
            }
            Err(error) => Err(error),
        }
    }
}

fn compile<R: DocumentRoot>(root: &R, scope: &RenderScope<'_>) -> Result<Document, RenderError> {
    let data = root.data(scope)?;
    let nodes = root.included(scope)?;
    debug!(count = nodes.len(), "Collected includes");

    let included = nodes
        .into_iter()
        .map(|node| node.primary_representation(scope))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Document { data, included })
}

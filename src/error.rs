//! # Errors
//!
//! Every failure that can abort a render is defined here, so callers deal with a
//! single [`RenderError`] no matter which layer rejected the request.
//!
//! - [`QueryError`]: the client sent a `fields` or `include` parameter with the
//!   wrong shape. These are 400-class errors with fixed messages.
//! - [`RenderError`]: anything that aborts a render. Wraps [`QueryError`] and the
//!   failures of lazy attribute or relationship producers.

use serde::Serialize;

/// Error type produced by lazy producers in the model layer.
pub type ResourceError = Box<dyn std::error::Error + Send + Sync>;

/// A query parameter violated the shape the resolvers expect.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    /// `fields` was a scalar (`?fields=name`) instead of a map of resource types.
    #[error("The fields parameter must be an array of resource types.")]
    FieldsNotMap,

    /// `fields[type]` held a nested structure instead of a comma separated string.
    #[error("The fields parameter value must be a comma separated list of attributes.")]
    FieldsValueNotString,

    /// `include` was structured (`?include[]=posts`) instead of a scalar string.
    #[error("The include parameter must be a comma separated list of relationship paths.")]
    IncludeNotString,
}

impl QueryError {
    /// HTTP status that reports this error to the client.
    pub fn status(&self) -> u16 {
        400
    }

    /// Name of the query parameter at fault.
    pub fn parameter(&self) -> &'static str {
        match self {
            QueryError::FieldsNotMap | QueryError::FieldsValueNotString => "fields",
            QueryError::IncludeNotString => "include",
        }
    }
}

/// Errors that abort a render pass.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A selected lazy attribute failed while being evaluated.
    #[error("Attribute `{attribute}` of {resource} failed: {source}")]
    Attribute {
        resource: String,
        attribute: String,
        #[source]
        source: ResourceError,
    },

    /// A requested lazy relationship failed while being loaded.
    #[error("Relationship `{relationship}` of {resource} failed: {source}")]
    Relationship {
        resource: String,
        relationship: String,
        #[source]
        source: ResourceError,
    },

    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RenderError {
    /// True when the failure was caused by the request rather than the model layer.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RenderError::Query(_))
    }
}

/// Body returned to the client when a query parameter is malformed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDocument {
    pub message: String,
}

impl From<&QueryError> for ErrorDocument {
    fn from(error: &QueryError) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

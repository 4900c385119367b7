//! # Request-Scope Cache
//!
//! Holds the two directive tables for exactly one top-level render. A fresh
//! [`RequestCache`] is built per render instead of living in a global, so
//! concurrent renders cannot read each other's directives.

use super::fields::{FieldResolver, FieldSet};
use super::includes::{IncludeResolver, IncludeSet};
use crate::config::RenderOptions;
use crate::error::QueryError;
use crate::query::RequestContext;
use tracing::debug;

/// Anything holding per-render memoized state.
pub trait Flush {
    /// Drops memoized state. Must be idempotent and must not fail.
    fn flush(&mut self);
}

/// The directive tables of one render.
#[derive(Debug, Default)]
pub struct RequestCache {
    fields: FieldResolver,
    includes: IncludeResolver,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &FieldResolver {
        &self.fields
    }

    pub fn includes(&self) -> &IncludeResolver {
        &self.includes
    }

    /// Releases the root's own memoized state, then both directive tables.
    pub fn flush_all(&self, root: &mut impl Flush) {
        root.flush();
        self.includes.flush();
        self.fields.flush();
        debug!("Request scope flushed");
    }
}

/// Everything a resource needs while rendering: the request, the options and
/// the directive cache.
pub struct RenderScope<'r> {
    request: &'r dyn RequestContext,
    options: RenderOptions,
    cache: RequestCache,
}

impl<'r> RenderScope<'r> {
    pub fn new(request: &'r dyn RequestContext, options: RenderOptions) -> Self {
        Self {
            request,
            options,
            cache: RequestCache::new(),
        }
    }

    pub fn request(&self) -> &'r dyn RequestContext {
        self.request
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Sparse fieldset for `resource_type`, parsed at most once per scope.
    pub fn fields(&self, resource_type: &str) -> Result<Option<FieldSet>, QueryError> {
        self.cache.fields.resolve(self.request, resource_type)
    }

    /// Relationships requested directly under `prefix`, parsed at most once per scope.
    pub fn includes(&self, prefix: &str) -> Result<IncludeSet, QueryError> {
        self.cache.includes.resolve(self.request, prefix)
    }

    pub fn flush(&self, root: &mut impl Flush) {
        self.cache.flush_all(root);
    }
}

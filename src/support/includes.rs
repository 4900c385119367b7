//! Include path resolution (`include=posts.comments,author`).

use crate::error::QueryError;
use crate::query::{QueryValue, RequestContext};
use indexmap::IndexSet;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Relationship names requested directly under one prefix, in request order.
pub type IncludeSet = Arc<IndexSet<String>>;

/// Parses and memoizes the `include` directive per prefix.
///
/// A prefix is the path already walked, with its trailing dot: `""` for the
/// root, `"posts."` for resources reached through `posts`. Each nesting level
/// asks only for its immediate children, so `posts.comments` yields `posts`
/// at the root and `comments` under `"posts."`.
#[derive(Debug, Default)]
pub struct IncludeResolver {
    cache: RefCell<HashMap<String, IncludeSet>>,
}

impl IncludeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, request: &dyn RequestContext, prefix: &str) -> Result<IncludeSet, QueryError> {
        let cached = self.cache.borrow().get(prefix).cloned();
        if let Some(includes) = cached {
            trace!(prefix, "Includes cache hit");
            return Ok(includes);
        }

        let includes = Arc::new(parse(request, prefix).inspect_err(|e| {
            warn!(prefix, parameter = e.parameter(), error = %e, "Malformed query");
        })?);
        debug!(prefix, ?includes, "Parsed includes");

        self.cache
            .borrow_mut()
            .insert(prefix.to_string(), includes.clone());
        Ok(includes)
    }

    /// Forgets every memoized directive. Safe to call repeatedly.
    pub fn flush(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn is_cached(&self, prefix: &str) -> bool {
        self.cache.borrow().contains_key(prefix)
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse(request: &dyn RequestContext, prefix: &str) -> Result<IndexSet<String>, QueryError> {
    let raw = match request.query_param("include") {
        None => "",
        Some(QueryValue::String(raw)) => raw.as_str(),
        Some(_) => return Err(QueryError::IncludeNotString),
    };

    Ok(raw
        .split(',')
        .filter_map(|path| path.strip_prefix(prefix))
        .map(|rest| rest.split('.').next().unwrap_or(""))
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect())
}

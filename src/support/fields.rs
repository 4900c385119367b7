//! Sparse fieldset resolution (`fields[type]=a,b`).

use crate::error::QueryError;
use crate::query::{QueryValue, RequestContext};
use indexmap::IndexSet;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Attribute names a request allows for one resource type.
pub type FieldSet = Arc<IndexSet<String>>;

/// Parses and memoizes the `fields` directive per resource type.
///
/// `None` means the request did not restrict the type, so the attribute mode
/// decides. `Some` with an empty set means "render no attributes".
#[derive(Debug, Default)]
pub struct FieldResolver {
    cache: RefCell<HashMap<String, Option<FieldSet>>>,
}

impl FieldResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &self,
        request: &dyn RequestContext,
        resource_type: &str,
    ) -> Result<Option<FieldSet>, QueryError> {
        let cached = self.cache.borrow().get(resource_type).cloned();
        if let Some(fields) = cached {
            trace!(resource_type, "Fields cache hit");
            return Ok(fields);
        }

        let fields = parse(request, resource_type).inspect_err(|e| {
            warn!(resource_type, parameter = e.parameter(), error = %e, "Malformed query");
        })?;
        debug!(resource_type, ?fields, "Parsed fields");

        self.cache
            .borrow_mut()
            .insert(resource_type.to_string(), fields.clone());
        Ok(fields)
    }

    /// Forgets every memoized directive. Safe to call repeatedly.
    pub fn flush(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn is_cached(&self, resource_type: &str) -> bool {
        self.cache.borrow().contains_key(resource_type)
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse(request: &dyn RequestContext, resource_type: &str) -> Result<Option<FieldSet>, QueryError> {
    let entry = match request.query_param("fields") {
        None => return Ok(None),
        Some(QueryValue::String(_)) => return Err(QueryError::FieldsNotMap),
        Some(fields) => fields.get(resource_type),
    };

    match entry {
        None => Ok(None),
        Some(QueryValue::String(list)) => Ok(Some(Arc::new(
            list.split(',')
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        ))),
        Some(_) => Err(QueryError::FieldsValueNotString),
    }
}

//! Directive resolvers and the request-scope cache backing them.
//!
//! - [`FieldResolver`] - sparse fieldsets per resource type
//! - [`IncludeResolver`] - requested relationships per include prefix
//! - [`RequestCache`] / [`RenderScope`] - the per-render home of both tables

pub mod cache;
pub mod fields;
pub mod includes;

pub use cache::{Flush, RenderScope, RequestCache};
pub use fields::{FieldResolver, FieldSet};
pub use includes::{IncludeResolver, IncludeSet};

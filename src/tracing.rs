//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Directive parsing**: every cache miss in the field and include resolvers
//!   (`debug`), cache hits (`trace`), malformed parameters (`warn`)
//! - **Relationship loading**: each relationship loaded for an include prefix (`debug`)
//! - **Documents**: one `render` span per document with the attribute mode, and a
//!   summary line with `data` and `included` counts (`info`)
//!
//! ## Usage Examples
//!
//! ```bash
//! # One line per document
//! RUST_LOG=info cargo run -- "include=posts.comments"
//!
//! # Directive parsing and relationship loading
//! RUST_LOG=debug cargo run -- "include=posts.comments&fields[posts]=title"
//!
//! # Only the resolvers
//! RUST_LOG=jsonapi_resources::support=trace cargo run
//! ```
//!
//! With `RUST_LOG=debug` a nested include renders as:
//!
//! ```text
//! DEBUG render: Parsed includes prefix="" includes={"posts"}
//! DEBUG render: Loaded relationship resource=users:1 relationship=posts prefix=
//! DEBUG render: Parsed includes prefix="posts." includes={"comments"}
//! DEBUG render: Parsed fields resource_type="users" fields=None
//! DEBUG render: Collected includes count=4
//! INFO render: Rendered document data=1 included=4
//! DEBUG render: Request scope flushed
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

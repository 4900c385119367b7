//! # Demo
//!
//! Renders a small blog (users, posts, comments) for the query string given as the
//! first argument:
//!
//! ```bash
//! RUST_LOG=info cargo run -- "include=posts.comments.author&fields[posts]=title"
//! JSONAPI_ATTRIBUTE_MODE=minimal cargo run -- "include=posts&fields[posts]=title"
//! ```
//!
//! The graph is cyclic (a comment's author is a user who owns posts), which the
//! include walk handles because it only follows requested paths.

use jsonapi_resources::prelude::*;
use jsonapi_resources::tracing::setup_tracing;
use std::sync::Arc;
use tracing::{info, info_span};

struct UserRow {
    id: u32,
    name: &'static str,
    email: &'static str,
}

struct PostRow {
    id: u32,
    author_id: u32,
    title: &'static str,
    body: &'static str,
}

struct CommentRow {
    id: u32,
    post_id: u32,
    author_id: u32,
    body: &'static str,
}

struct Blog {
    users: Vec<UserRow>,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
}

impl Blog {
    fn seed() -> Arc<Self> {
        Arc::new(Self {
            users: vec![
                UserRow { id: 1, name: "Tim", email: "tim@example.com" },
                UserRow { id: 2, name: "Jess", email: "jess@example.com" },
            ],
            posts: vec![
                PostRow { id: 10, author_id: 1, title: "Sparse fieldsets", body: "Ask only for what you render." },
                PostRow { id: 11, author_id: 1, title: "Compound documents", body: "One round trip, every related resource, no duplicates." },
            ],
            comments: vec![
                CommentRow { id: 100, post_id: 10, author_id: 2, body: "Nice." },
                CommentRow { id: 101, post_id: 10, author_id: 1, body: "Thanks!" },
                CommentRow { id: 102, post_id: 11, author_id: 2, body: "What about cycles?" },
            ],
        })
    }

    fn user(self: &Arc<Self>, id: u32) -> Option<Arc<User>> {
        self.users.iter().any(|row| row.id == id).then(|| Arc::new(User { blog: self.clone(), id }))
    }

    fn post(self: &Arc<Self>, id: u32) -> Option<Arc<Post>> {
        self.posts.iter().any(|row| row.id == id).then(|| Arc::new(Post { blog: self.clone(), id }))
    }
}

struct User {
    blog: Arc<Blog>,
    id: u32,
}

struct Post {
    blog: Arc<Blog>,
    id: u32,
}

struct Comment {
    blog: Arc<Blog>,
    id: u32,
}

impl User {
    fn row(&self) -> Option<&UserRow> {
        self.blog.users.iter().find(|row| row.id == self.id)
    }
}

impl Post {
    fn row(&self) -> Option<&PostRow> {
        self.blog.posts.iter().find(|row| row.id == self.id)
    }
}

impl Comment {
    fn row(&self) -> Option<&CommentRow> {
        self.blog.comments.iter().find(|row| row.id == self.id)
    }
}

impl JsonApiResource for User {
    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self, _request: &dyn RequestContext) -> Attributes<'_> {
        let Some(row) = self.row() else {
            return Attributes::new();
        };
        Attributes::new()
            .value("name", row.name)
            .value("email", row.email)
            .lazy("postCount", || {
                self.blog.posts.iter().filter(|post| post.author_id == self.id).count()
            })
    }

    fn relationships(&self, _request: &dyn RequestContext) -> Relationships<'_> {
        Relationships::new().lazy("posts", || {
            let posts = self
                .blog
                .posts
                .iter()
                .filter(|post| post.author_id == self.id)
                .filter_map(|post| self.blog.post(post.id));
            Ok(Related::many(posts))
        })
    }
}

impl JsonApiResource for Post {
    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self, _request: &dyn RequestContext) -> Attributes<'_> {
        let Some(row) = self.row() else {
            return Attributes::new();
        };
        Attributes::new()
            .value("title", row.title)
            .value("body", row.body)
            .when("longRead", row.body.len() > 40, || true)
    }

    fn relationships(&self, _request: &dyn RequestContext) -> Relationships<'_> {
        let author = self.row().and_then(|row| self.blog.user(row.author_id));
        Relationships::new()
            .insert("author", Related::optional(author))
            .lazy("comments", || {
                let comments = self
                    .blog
                    .comments
                    .iter()
                    .filter(|comment| comment.post_id == self.id)
                    .map(|comment| Arc::new(Comment { blog: self.blog.clone(), id: comment.id }));
                Ok(Related::many(comments))
            })
    }

    fn links(&self, _request: &dyn RequestContext) -> serde_json::Map<String, serde_json::Value> {
        let mut links = serde_json::Map::new();
        links.insert("self".into(), format!("/posts/{}", self.id).into());
        links
    }
}

impl JsonApiResource for Comment {
    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self, _request: &dyn RequestContext) -> Attributes<'_> {
        match self.row() {
            Some(row) => Attributes::new().value("body", row.body),
            None => Attributes::new(),
        }
    }

    fn relationships(&self, _request: &dyn RequestContext) -> Relationships<'_> {
        let row = self.row();
        Relationships::new()
            .insert("author", Related::optional(row.and_then(|row| self.blog.user(row.author_id))))
            .insert("post", Related::optional(row.and_then(|row| self.blog.post(row.post_id))))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let raw = std::env::args().nth(1).unwrap_or_default();
    let options = RenderOptions::from_env()?;
    info!(query = %raw, attribute_mode = %options.attribute_mode, "Starting demo");

    let blog = Blog::seed();
    let users = blog.users.iter().filter_map(|row| blog.user(row.id)).map(|user| user as ResourceRef);
    let mut root = ResourceCollection::from_resources(users);

    let response = info_span!("demo_render").in_scope(|| {
        DocumentAssembler::new(options).respond(&mut root, &QueryParams::parse(&raw))
    })?;

    info!(status = response.status, content_type = response.content_type, "Response ready");
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    Ok(())
}

use jsonapi_resources::prelude::*;
use jsonapi_resources::testing::{query, BasicModel, Probe};
use serde_json::{json, Value};
use std::sync::Arc;

fn render(root: &mut ResourceNode, raw: &str) -> Value {
    let document = DocumentAssembler::default()
        .render(root, &query(raw))
        .expect("Failed to render");
    serde_json::to_value(&document).expect("Failed to serialize")
}

fn included_ids(json: &Value) -> Vec<String> {
    json["included"]
        .as_array()
        .expect("included must be an array")
        .iter()
        .map(|resource| resource["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// user-1 -> posts (post-1, post-2) -> comments (comment-1, comment-2 / comment-3)
fn blog() -> ResourceNode {
    let comment = |id: &str| Arc::new(BasicModel::new(id).with_attribute("body", format!("{id}-body")));
    let posts = vec![
        Arc::new(
            BasicModel::new("post-1")
                .with_attribute("title", "post-title-1")
                .with_attribute("content", "post-content-1")
                .with_many("comments", vec![comment("comment-1"), comment("comment-2")]),
        ),
        Arc::new(
            BasicModel::new("post-2")
                .with_attribute("title", "post-title-2")
                .with_attribute("content", "post-content-2")
                .with_many("comments", vec![comment("comment-3")]),
        ),
    ];
    let user = BasicModel::new("user-1")
        .with_attribute("name", "user-name")
        .with_many("posts", posts)
        .with_many("comments", vec![comment("comment-9")]);
    ResourceNode::new(Arc::new(user))
}

#[test]
fn test_no_include_means_no_included_and_no_relationships() {
    let mut root = blog();
    let json = render(&mut root, "");

    assert_eq!(json["included"], json!([]));
    assert_eq!(json["data"]["relationships"], json!({}));
}

#[test]
fn test_include_posts_with_sparse_fieldset() {
    let mut root = blog();
    let json = render(&mut root, "include=posts&fields[basicModels]=title");

    assert_eq!(
        json,
        json!({
            "data": {
                "id": "user-1",
                "type": "basicModels",
                "attributes": {},
                "relationships": {
                    "posts": { "data": [
                        { "id": "post-1", "type": "basicModels" },
                        { "id": "post-2", "type": "basicModels" }
                    ]}
                },
                "meta": {},
                "links": {}
            },
            "included": [
                {
                    "id": "post-1",
                    "type": "basicModels",
                    "attributes": { "title": "post-title-1" },
                    "relationships": {},
                    "meta": {},
                    "links": {}
                },
                {
                    "id": "post-2",
                    "type": "basicModels",
                    "attributes": { "title": "post-title-2" },
                    "relationships": {},
                    "meta": {},
                    "links": {}
                }
            ]
        })
    );
}

#[test]
fn test_nested_include_is_depth_first() {
    let mut root = blog();
    let json = render(&mut root, "include=posts.comments");

    assert_eq!(
        included_ids(&json),
        vec!["post-1", "comment-1", "comment-2", "post-2", "comment-3"]
    );
    // Posts carry the nested linkage, comments carry none.
    assert_eq!(
        json["included"][0]["relationships"]["comments"]["data"],
        json!([
            { "id": "comment-1", "type": "basicModels" },
            { "id": "comment-2", "type": "basicModels" }
        ])
    );
    assert_eq!(json["included"][1]["relationships"], json!({}));
}

#[test]
fn test_nested_path_is_scoped_to_its_prefix() {
    let mut root = blog();
    let json = render(&mut root, "include=posts.comments");

    // `comments` was only requested under `posts.`, so the user's own comments stay out.
    assert!(json["data"]["relationships"].get("comments").is_none());
    assert!(!included_ids(&json).contains(&"comment-9".to_string()));
}

#[test]
fn test_unknown_include_is_ignored() {
    let mut root = blog();
    let json = render(&mut root, "include=tags,posts.likes");

    assert_eq!(included_ids(&json), vec!["post-1", "post-2"]);
}

#[test]
fn test_diamond_is_included_once() {
    let author = Arc::new(BasicModel::new("author-1").with_attribute("name", "Jess"));
    let posts = vec![
        Arc::new(BasicModel::new("post-1").with_one("author", author.clone())),
        Arc::new(BasicModel::new("post-2").with_one("author", author.clone())),
    ];
    let mut root = ResourceNode::new(Arc::new(
        BasicModel::new("user-1")
            .with_many("posts", posts)
            .with_one("favouriteAuthor", author),
    ));

    let json = render(&mut root, "include=favouriteAuthor,posts.author");

    // Relationships are walked in declaration order, and the first sighting wins.
    assert_eq!(included_ids(&json), vec!["post-1", "author-1", "post-2"]);
    assert_eq!(
        json["included"][2]["relationships"]["author"]["data"],
        json!({ "id": "author-1", "type": "basicModels" })
    );
}

#[test]
fn test_cycle_terminates_with_finite_includes() {
    let user = Arc::new(BasicModel::new("user-1").with_attribute("name", "Tim"));
    let post = Arc::new(BasicModel::new("post-1").with_one("author", user.clone()));
    user.set_many("posts", vec![post]);

    let mut root = ResourceNode::new(user);
    let json = render(&mut root, "include=posts.author.posts.author");

    // Each entity appears once even though every path leads back to the root.
    assert_eq!(included_ids(&json), vec!["post-1", "user-1"]);
}

#[test]
fn test_empty_to_one_renders_null() {
    let mut root = ResourceNode::new(Arc::new(BasicModel::new("post-1").with_empty("author")));
    let json = render(&mut root, "include=author");

    assert_eq!(json["data"]["relationships"], json!({ "author": { "data": null } }));
    assert_eq!(json["included"], json!([]));
}

struct Post {
    probe: Probe,
    fail: bool,
}

impl JsonApiResource for Post {
    fn resource_id(&self) -> String {
        "post-1".into()
    }

    fn attributes(&self, _request: &dyn RequestContext) -> Attributes<'_> {
        Attributes::new().value("title", "Lazy loading")
    }

    fn relationships(&self, _request: &dyn RequestContext) -> Relationships<'_> {
        Relationships::new().lazy("comments", || {
            self.probe.hit(());
            if self.fail {
                return Err("comments table locked".into());
            }
            Ok(Related::many(vec![Arc::new(BasicModel::new("comment-1"))]))
        })
    }
}

#[test]
fn test_lazy_relationship_loads_only_when_requested() {
    let probe = Probe::new();
    let mut root = ResourceNode::new(Arc::new(Post { probe: probe.clone(), fail: false }));
    let assembler = DocumentAssembler::default();

    assembler.render(&mut root, &query("")).expect("Failed to render");
    assert_eq!(probe.calls(), 0, "Loader ran although nothing was included");

    let document = assembler
        .render(&mut root, &query("include=comments"))
        .expect("Failed to render");
    assert_eq!(document.included.len(), 1);
    assert_eq!(probe.calls(), 1, "Loader must run once per render");
}

#[test]
fn test_requested_failing_relationship_aborts_render() {
    let mut root = ResourceNode::new(Arc::new(Post { probe: Probe::new(), fail: true }));
    let assembler = DocumentAssembler::default();

    assembler
        .render(&mut root, &query(""))
        .expect("Unrequested failures must not surface");

    let error = assembler
        .render(&mut root, &query("include=comments"))
        .expect_err("Requested failing loader must abort");
    match error {
        RenderError::Relationship { resource, relationship, .. } => {
            assert_eq!(resource, "posts:post-1");
            assert_eq!(relationship, "comments");
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}

//! # Resource Node
//!
//! A [`ResourceNode`] wraps one domain object together with the include prefix it
//! was reached through. The prefix is what makes nested includes work: a node
//! under `posts.` only asks the include resolver for children of `posts.`, so
//! `include=posts.comments` loads `comments` on posts and nowhere else.
//!
//! Requested relationships are loaded at most once per render and kept on the
//! node until [`Flush::flush`] runs. Attributes are produced fresh on every call.

use super::collection::{self, ResourceCollection};
use super::object::{RelationshipData, RelationshipObject, ResourceIdentifier, ResourceObject};
use super::relationship::{Loaded, ResourceRef};
use crate::config::AttributeMode;
use crate::error::RenderError;
use crate::support::{Flush, RenderScope};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::cell::OnceCell;
use std::fmt;
use tracing::debug;

enum Target {
    One(Box<ResourceNode>),
    Many(ResourceCollection),
    Empty,
}

struct LoadedRelationship {
    name: String,
    target: Target,
}

pub struct ResourceNode {
    resource: ResourceRef,
    include_prefix: String,
    loaded: OnceCell<Vec<LoadedRelationship>>,
}

impl ResourceNode {
    /// A root-level node (empty include prefix).
    pub fn new(resource: ResourceRef) -> Self {
        Self {
            resource,
            include_prefix: String::new(),
            loaded: OnceCell::new(),
        }
    }

    /// Rebases the node under `prefix`, e.g. `"posts."`, and drops anything
    /// loaded under the previous prefix.
    pub fn with_include_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.include_prefix = prefix.into();
        self.loaded = OnceCell::new();
        self
    }

    pub fn include_prefix(&self) -> &str {
        &self.include_prefix
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    pub fn resource_type(&self) -> String {
        self.resource.resource_type()
    }

    pub fn resource_id(&self) -> String {
        self.resource.resource_id()
    }

    /// `{type, id}` projection used in relationship linkage.
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.resource_type(), self.resource_id())
    }

    /// De-duplication key: equal for every node describing the same entity.
    ///
    /// Encoded as a JSON pair, so no `(type, id)` combination collides with another.
    pub fn to_unique_resource_identifier(&self) -> String {
        serde_json::json!([self.resource_type(), self.resource_id()]).to_string()
    }

    /// Full resource object for `data` or `included`.
    pub fn primary_representation(&self, scope: &RenderScope<'_>) -> Result<ResourceObject, RenderError> {
        let request = scope.request();
        Ok(ResourceObject {
            id: self.resource_id(),
            resource_type: self.resource_type(),
            attributes: self.attributes(scope)?,
            relationships: self.relationships(scope)?,
            meta: self.resource.meta(request),
            links: self.resource.links(request),
        })
    }

    /// Declared attributes filtered by the sparse fieldset for this node's type.
    ///
    /// Producers of unselected attributes are dropped without being called.
    pub fn attributes(&self, scope: &RenderScope<'_>) -> Result<Map<String, Value>, RenderError> {
        let resource_type = self.resource_type();
        let fields = scope.fields(&resource_type)?;
        let render_all = scope.options().attribute_mode == AttributeMode::Maximal;

        let mut rendered = Map::new();
        for (name, value) in self.resource.attributes(scope.request()) {
            let selected = match &fields {
                Some(fields) => fields.contains(&name),
                None => render_all,
            };
            if !selected {
                continue;
            }
            let resolved = value.resolve().map_err(|source| RenderError::Attribute {
                resource: self.identifier().to_string(),
                attribute: name.clone(),
                source,
            })?;
            if let Some(value) = resolved {
                rendered.insert(name, value);
            }
        }
        Ok(rendered)
    }

    /// Linkage for every relationship requested at this node's prefix.
    pub fn relationships(
        &self,
        scope: &RenderScope<'_>,
    ) -> Result<IndexMap<String, RelationshipObject>, RenderError> {
        Ok(self
            .loaded(scope)?
            .iter()
            .map(|relationship| {
                let data = match &relationship.target {
                    Target::One(node) => RelationshipData::ToOne(Some(node.identifier())),
                    Target::Many(nodes) => RelationshipData::ToMany(nodes.resource_identifiers()),
                    Target::Empty => RelationshipData::ToOne(None),
                };
                (relationship.name.clone(), RelationshipObject { data })
            })
            .collect())
    }

    /// Transitive closure of requested includes, depth first, duplicates kept.
    pub fn includable<'s>(&'s self, scope: &RenderScope<'_>) -> Result<Vec<&'s ResourceNode>, RenderError> {
        let mut nodes = Vec::new();
        for relationship in self.loaded(scope)? {
            match &relationship.target {
                Target::One(node) => collection::push_with_includes(&mut nodes, node, scope)?,
                Target::Many(members) => {
                    for node in members.iter() {
                        collection::push_with_includes(&mut nodes, node, scope)?;
                    }
                }
                Target::Empty => {}
            }
        }
        Ok(nodes)
    }

    /// This node's contribution to `included` when it is the document root.
    pub fn included_section<'s>(&'s self, scope: &RenderScope<'_>) -> Result<Vec<&'s ResourceNode>, RenderError> {
        Ok(collection::unique(self.includable(scope)?))
    }

    fn loaded(&self, scope: &RenderScope<'_>) -> Result<&[LoadedRelationship], RenderError> {
        if let Some(loaded) = self.loaded.get() {
            return Ok(loaded.as_slice());
        }

        let requested = scope.includes(&self.include_prefix)?;
        let mut loaded = Vec::new();
        if !requested.is_empty() {
            for (name, related) in self.resource.relationships(scope.request()) {
                if !requested.contains(&name) {
                    continue;
                }
                let related = related.load().map_err(|source| RenderError::Relationship {
                    resource: self.identifier().to_string(),
                    relationship: name.clone(),
                    source,
                })?;
                let prefix = format!("{}{}.", self.include_prefix, name);
                let target = match related {
                    Loaded::One(resource) => {
                        Target::One(Box::new(ResourceNode::new(resource).with_include_prefix(prefix)))
                    }
                    Loaded::Many(resources) => Target::Many(
                        resources
                            .into_iter()
                            .map(ResourceNode::new)
                            .collect::<ResourceCollection>()
                            .with_include_prefix(&prefix),
                    ),
                    Loaded::Empty => Target::Empty,
                };
                debug!(resource = %self.identifier(), relationship = %name, prefix = %self.include_prefix, "Loaded relationship");
                loaded.push(LoadedRelationship { name, target });
            }
        }

        Ok(self.loaded.get_or_init(|| loaded).as_slice())
    }
}

impl Flush for ResourceNode {
    fn flush(&mut self) {
        // Loaded children are owned by this node and go with it.
        self.loaded.take();
    }
}

impl fmt::Debug for ResourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceNode")
            .field("identifier", &self.identifier())
            .field("include_prefix", &self.include_prefix)
            .field("loaded", &self.loaded.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderOptions;
    use crate::query::QueryParams;
    use crate::testing::BasicModel;
    use serde_json::json;
    use std::sync::Arc;

    fn user_with_posts() -> ResourceNode {
        let posts = vec![
            Arc::new(BasicModel::new("post-1").with_attribute("title", "First")),
            Arc::new(BasicModel::new("post-2").with_attribute("title", "Second")),
        ];
        let user = BasicModel::new("user-1")
            .with_attribute("name", "Tim")
            .with_many("posts", posts);
        ResourceNode::new(Arc::new(user))
    }

    #[test]
    fn test_identifier_and_unique_key() {
        let node = user_with_posts();
        assert_eq!(node.identifier(), ResourceIdentifier::new("basicModels", "user-1"));
        assert_eq!(node.to_unique_resource_identifier(), r#"["basicModels","user-1"]"#);
    }

    struct Namespaced {
        resource_type: &'static str,
        id: &'static str,
    }

    impl crate::resource::JsonApiResource for Namespaced {
        fn resource_type(&self) -> String {
            self.resource_type.into()
        }

        fn resource_id(&self) -> String {
            self.id.into()
        }

        fn attributes(&self, _request: &dyn crate::query::RequestContext) -> crate::resource::Attributes<'_> {
            crate::resource::Attributes::new()
        }
    }

    #[test]
    fn test_unique_key_does_not_collide_on_separator() {
        let left = ResourceNode::new(Arc::new(Namespaced { resource_type: "a:b", id: "c" }));
        let right = ResourceNode::new(Arc::new(Namespaced { resource_type: "a", id: "b:c" }));

        // Same display form, different entities.
        assert_eq!(left.identifier().to_string(), right.identifier().to_string());
        assert_ne!(left.to_unique_resource_identifier(), right.to_unique_resource_identifier());

        let mut collection: ResourceCollection = vec![left, right].into_iter().collect();
        collection.filter_duplicates();
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_relationships_only_when_requested() {
        let node = user_with_posts();

        let query = QueryParams::parse("");
        let scope = RenderScope::new(&query, RenderOptions::default());
        assert!(node.relationships(&scope).unwrap().is_empty());
        assert!(node.includable(&scope).unwrap().is_empty());
    }

    #[test]
    fn test_includable_children_are_rebased() {
        let node = user_with_posts();
        let query = QueryParams::parse("include=posts");
        let scope = RenderScope::new(&query, RenderOptions::default());

        let included = node.includable(&scope).unwrap();
        assert_eq!(included.len(), 2);
        assert!(included.iter().all(|child| child.include_prefix() == "posts."));

        let relationships = node.relationships(&scope).unwrap();
        assert_eq!(
            serde_json::to_value(&relationships).unwrap(),
            json!({
                "posts": { "data": [
                    { "id": "post-1", "type": "basicModels" },
                    { "id": "post-2", "type": "basicModels" }
                ]}
            })
        );
    }

    #[test]
    fn test_flush_forgets_loaded_relationships() {
        let mut node = user_with_posts();

        let first = QueryParams::parse("include=posts");
        let scope = RenderScope::new(&first, RenderOptions::default());
        assert_eq!(node.includable(&scope).unwrap().len(), 2);
        scope.flush(&mut node);

        let second = QueryParams::parse("");
        let scope = RenderScope::new(&second, RenderOptions::default());
        assert!(node.includable(&scope).unwrap().is_empty());
    }

    #[test]
    fn test_rebase_resets_prefix() {
        let node = user_with_posts().with_include_prefix("author.");
        assert_eq!(node.include_prefix(), "author.");

        let query = QueryParams::parse("include=posts");
        let scope = RenderScope::new(&query, RenderOptions::default());
        assert!(node.includable(&scope).unwrap().is_empty());
    }
}

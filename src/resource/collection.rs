//! # Resource Collection
//!
//! An ordered sequence of [`ResourceNode`]s, used both as top-level `data` and as
//! the value of a to-many relationship. Members need not share a type.

use super::node::ResourceNode;
use super::object::{ResourceIdentifier, ResourceObject};
use super::relationship::ResourceRef;
use crate::error::RenderError;
use crate::support::{Flush, RenderScope};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ResourceCollection {
    members: Vec<ResourceNode>,
}

impl ResourceCollection {
    pub fn new(members: Vec<ResourceNode>) -> Self {
        Self { members }
    }

    pub fn from_resources(resources: impl IntoIterator<Item = ResourceRef>) -> Self {
        resources.into_iter().map(ResourceNode::new).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceNode> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Full representation of every member, for top-level `data`.
    pub fn primary_representation(&self, scope: &RenderScope<'_>) -> Result<Vec<ResourceObject>, RenderError> {
        self.members
            .iter()
            .map(|member| member.primary_representation(scope))
            .collect()
    }

    /// `{type, id}` of every member, for relationship linkage.
    pub fn resource_identifiers(&self) -> Vec<ResourceIdentifier> {
        self.members.iter().map(ResourceNode::identifier).collect()
    }

    /// Everything the members include, flattened and de-duplicated in first-seen order.
    pub fn included_section<'s>(&'s self, scope: &RenderScope<'_>) -> Result<Vec<&'s ResourceNode>, RenderError> {
        let mut nodes = Vec::new();
        for member in &self.members {
            nodes.extend(member.includable(scope)?);
        }
        Ok(unique(nodes))
    }

    /// Rebases every member under `prefix`.
    pub fn with_include_prefix(self, prefix: &str) -> Self {
        self.members
            .into_iter()
            .map(|member| member.with_include_prefix(prefix))
            .collect()
    }

    /// Drops members whose identifier already appeared earlier in the collection.
    pub fn filter_duplicates(&mut self) -> &mut Self {
        let mut seen = HashSet::new();
        self.members
            .retain(|member| seen.insert(member.to_unique_resource_identifier()));
        self
    }
}

impl Flush for ResourceCollection {
    fn flush(&mut self) {
        self.members.iter_mut().for_each(Flush::flush);
    }
}

impl FromIterator<ResourceNode> for ResourceCollection {
    fn from_iter<I: IntoIterator<Item = ResourceNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ResourceCollection {
    type Item = &'a ResourceNode;
    type IntoIter = std::slice::Iter<'a, ResourceNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// Pushes `node` followed by everything it transitively includes.
pub(crate) fn push_with_includes<'s>(
    nodes: &mut Vec<&'s ResourceNode>,
    node: &'s ResourceNode,
    scope: &RenderScope<'_>,
) -> Result<(), RenderError> {
    nodes.push(node);
    nodes.extend(node.includable(scope)?);
    Ok(())
}

/// Keeps the first node for each unique resource identifier.
pub(crate) fn unique<'s>(nodes: Vec<&'s ResourceNode>) -> Vec<&'s ResourceNode> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.to_unique_resource_identifier()))
        .collect()
}

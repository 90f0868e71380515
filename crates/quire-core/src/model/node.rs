use super::fields::{FieldValue, RichTextField, UrlSlugField};
use crate::config::{LinkResolverFn, RichTextResolverFn};
use crate::contract::{RawField, RawSystem};
use crate::error::{QuireError, Result};
use crate::markup::RichTextResolution;
use crate::variant::TypeShell;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Index;

/// Handle of a node inside one [`ContentGraph`].
///
/// Two handles are equal exactly when they point at the same node, which is
/// what "same instance" means for a mapped graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeRef(usize);

impl NodeRef {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Identity metadata of a mapped node. Immutable once the node exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemAttributes {
    pub id: String,
    pub name: Option<String>,
    pub codename: String,
    pub content_type: String,
    pub language: String,
    pub last_modified: DateTime<Utc>,
    pub sitemap_locations: Vec<String>,
}

impl SystemAttributes {
    pub fn from_raw(raw: &RawSystem) -> Result<Self> {
        let last_modified = DateTime::parse_from_rfc3339(&raw.last_modified)
            .map_err(|e| {
                QuireError::MalformedInput(format!(
                    "item '{}' has an invalid last_modified '{}': {}",
                    raw.codename, raw.last_modified, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            codename: raw.codename.clone(),
            content_type: raw.content_type.clone(),
            language: raw.language.clone(),
            last_modified,
            sitemap_locations: raw.sitemap_locations.clone(),
        })
    }
}

/// A mapped content item.
#[derive(Clone)]
pub struct ContentNode {
    pub system: SystemAttributes,

    /// Raw elements, kept for untyped access whatever path produced the node.
    pub elements: BTreeMap<String, RawField>,

    fields: HashMap<String, FieldValue>,

    shell: TypeShell,
}

impl ContentNode {
    pub fn new(
        system: SystemAttributes,
        elements: BTreeMap<String, RawField>,
        shell: TypeShell,
    ) -> Self {
        Self {
            system,
            elements,
            fields: HashMap::new(),
            shell,
        }
    }

    pub fn codename(&self) -> &str {
        &self.system.codename
    }

    pub fn content_type(&self) -> &str {
        &self.system.content_type
    }

    /// True when a registered type produced this node's shell.
    pub fn is_typed(&self) -> bool {
        !self.shell.is_generic()
    }

    pub fn shell(&self) -> &TypeShell {
        &self.shell
    }

    pub fn rich_text_resolver(&self) -> Option<&RichTextResolverFn> {
        self.shell.rich_text_resolver.as_ref()
    }

    pub fn link_resolver(&self) -> Option<&LinkResolverFn> {
        self.shell.link_resolver.as_ref()
    }

    pub fn field(&self, property: &str) -> Option<&FieldValue> {
        self.fields.get(property)
    }

    pub fn fields(&self) -> &HashMap<String, FieldValue> {
        &self.fields
    }

    /// Property names, sorted.
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Value of a text field.
    pub fn text(&self, property: &str) -> Option<&str> {
        match self.fields.get(property) {
            Some(FieldValue::Text(f)) => Some(&f.value),
            _ => None,
        }
    }

    /// Items of a linked items field. Empty for any other property.
    pub fn linked_items(&self, property: &str) -> &[NodeRef] {
        match self.fields.get(property) {
            Some(FieldValue::LinkedItems(f)) => &f.items,
            _ => &[],
        }
    }

    pub fn rich_text(&self, property: &str) -> Option<&RichTextField> {
        match self.fields.get(property) {
            Some(FieldValue::RichText(f)) => Some(f),
            _ => None,
        }
    }

    pub fn url_slug(&self, property: &str) -> Option<&UrlSlugField> {
        match self.fields.get(property) {
            Some(FieldValue::UrlSlug(f)) => Some(f),
            _ => None,
        }
    }

    pub(crate) fn set_fields(&mut self, fields: HashMap<String, FieldValue>) {
        self.fields = fields;
    }
}

impl fmt::Debug for ContentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentNode")
            .field("codename", &self.system.codename)
            .field("content_type", &self.system.content_type)
            .field("typed", &self.is_typed())
            .field("properties", &self.property_names())
            .finish()
    }
}

/// What a custom item resolver hands back.
///
/// Identity metadata and raw elements are always taken from the raw item,
/// so the resolver only decides the shell and the mapped fields.
#[derive(Debug, Clone, Default)]
pub struct PartialNode {
    pub shell: Option<TypeShell>,
    pub fields: HashMap<String, FieldValue>,
}

impl PartialNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shell(mut self, shell: TypeShell) -> Self {
        self.shell = Some(shell);
        self
    }

    pub fn with_field(mut self, property: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(property.into(), value);
        self
    }
}

/// Codename lookup used while rewriting rich text.
pub trait LinkedItemLookup {
    fn linked_item(&self, codename: &str) -> Option<&ContentNode>;
}

impl LinkedItemLookup for HashMap<String, ContentNode> {
    fn linked_item(&self, codename: &str) -> Option<&ContentNode> {
        self.get(codename)
    }
}

/// The result of one mapping call: every node reached, each exactly once.
#[derive(Debug, Clone, Default)]
pub struct ContentGraph {
    nodes: Vec<ContentNode>,
    index: HashMap<String, NodeRef>,
}

impl ContentGraph {
    pub(crate) fn from_parts(nodes: Vec<ContentNode>, index: HashMap<String, NodeRef>) -> Self {
        Self { nodes, index }
    }

    pub fn get(&self, node: NodeRef) -> Option<&ContentNode> {
        self.nodes.get(node.0)
    }

    pub fn by_codename(&self, codename: &str) -> Option<NodeRef> {
        self.index.get(codename).copied()
    }

    pub fn get_by_codename(&self, codename: &str) -> Option<&ContentNode> {
        self.by_codename(codename).and_then(|r| self.get(r))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &ContentNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeRef(i), node))
    }

    /// Nodes of a linked items field, in source order.
    pub fn linked_items(&self, node: NodeRef, property: &str) -> Vec<&ContentNode> {
        self.get(node)
            .map(|n| {
                n.linked_items(property)
                    .iter()
                    .filter_map(|r| self.get(*r))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rewrites a rich text field of `node`. `Ok(None)` when there is no such field.
    pub fn resolve_rich_text(
        &self,
        node: NodeRef,
        property: &str,
    ) -> Result<Option<RichTextResolution>> {
        match self.get(node).and_then(|n| n.rich_text(property)) {
            Some(field) => field.resolve(self).map(Some),
            None => Ok(None),
        }
    }

    pub fn resolve_html(&self, node: NodeRef, property: &str) -> Result<Option<String>> {
        Ok(self
            .resolve_rich_text(node, property)?
            .map(|resolution| resolution.resolved_html))
    }
}

impl Index<NodeRef> for ContentGraph {
    type Output = ContentNode;

    fn index(&self, node: NodeRef) -> &ContentNode {
        &self.nodes[node.0]
    }
}

impl LinkedItemLookup for ContentGraph {
    fn linked_item(&self, codename: &str) -> Option<&ContentNode> {
        self.get_by_codename(codename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextField;
    use serde_json::json;

    fn raw_system(codename: &str, content_type: &str) -> RawSystem {
        RawSystem {
            id: format!("{}-id", codename),
            name: Some(codename.to_string()),
            codename: codename.to_string(),
            content_type: content_type.to_string(),
            language: "en".into(),
            last_modified: "2019-03-27T13:21:11.38Z".into(),
            sitemap_locations: Vec::new(),
        }
    }

    #[test]
    fn test_system_attributes_parse_timestamp() {
        let system = SystemAttributes::from_raw(&raw_system("warrior", "movie")).unwrap();
        assert_eq!(system.codename, "warrior");
        assert_eq!(system.last_modified.to_rfc3339(), "2019-03-27T13:21:11.380+00:00");
    }

    #[test]
    fn test_system_attributes_reject_bad_timestamp() {
        let mut raw = raw_system("warrior", "movie");
        raw.last_modified = "last tuesday".into();
        assert!(matches!(
            SystemAttributes::from_raw(&raw),
            Err(QuireError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_node_accessors() {
        let system = SystemAttributes::from_raw(&raw_system("tom_hardy", "actor")).unwrap();
        let mut node = ContentNode::new(system, BTreeMap::new(), TypeShell::generic());
        let mut fields = HashMap::new();
        fields.insert(
            "first_name".to_string(),
            FieldValue::Text(TextField::new("first_name", &json!("Tom")).unwrap()),
        );
        node.set_fields(fields);

        assert_eq!(node.text("first_name"), Some("Tom"));
        assert_eq!(node.text("last_name"), None);
        assert!(node.linked_items("first_name").is_empty());
        assert!(!node.is_typed());
        assert_eq!(node.property_names(), vec!["first_name"]);
    }

    #[test]
    fn test_graph_lookup() {
        let system = SystemAttributes::from_raw(&raw_system("tom_hardy", "actor")).unwrap();
        let node = ContentNode::new(system, BTreeMap::new(), TypeShell::generic());
        let mut index = HashMap::new();
        index.insert("tom_hardy".to_string(), NodeRef(0));
        let graph = ContentGraph::from_parts(vec![node], index);

        let r = graph.by_codename("tom_hardy").unwrap();
        assert_eq!(graph[r].codename(), "tom_hardy");
        assert!(graph.linked_item("tom_hardy").is_some());
        assert!(graph.linked_item("joel_edgerton").is_none());
        assert_eq!(graph.resolve_html(r, "plot").unwrap(), None);
    }
}

use crate::model::{ContentGraph, ContentNode, FieldValue, NodeRef};
use std::collections::HashMap;

/// Nodes mapped so far in one mapping call, keyed by codename.
///
/// Serves as memo and cycle guard: a node is registered before its fields
/// are mapped, so a field leading back to it finds the registered node.
/// Create one per call and consume it with [`into_graph`](Self::into_graph).
#[derive(Debug, Default)]
pub struct ProcessedRegistry {
    nodes: Vec<ContentNode>,
    index: HashMap<String, NodeRef>,
}

impl ProcessedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, codename: &str) -> Option<NodeRef> {
        self.index.get(codename).copied()
    }

    pub fn contains(&self, codename: &str) -> bool {
        self.index.contains_key(codename)
    }

    /// Adds a node under its codename. An already registered codename keeps
    /// its node and the new one is dropped.
    pub fn register(&mut self, node: ContentNode) -> NodeRef {
        if let Some(existing) = self.get(node.codename()) {
            return existing;
        }
        let node_ref = NodeRef::new(self.nodes.len());
        self.index.insert(node.codename().to_string(), node_ref);
        self.nodes.push(node);
        node_ref
    }

    /// Fills in the fields of a registered node.
    pub fn populate(&mut self, node: NodeRef, fields: HashMap<String, FieldValue>) {
        if let Some(node) = self.nodes.get_mut(node.index()) {
            node.set_fields(fields);
        }
    }

    pub fn node(&self, node: NodeRef) -> Option<&ContentNode> {
        self.nodes.get(node.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_graph(self) -> ContentGraph {
        ContentGraph::from_parts(self.nodes, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::RawSystem;
    use crate::model::{SystemAttributes, TextField};
    use crate::variant::TypeShell;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn node(codename: &str) -> ContentNode {
        let system = SystemAttributes::from_raw(&RawSystem {
            id: codename.into(),
            name: None,
            codename: codename.into(),
            content_type: "actor".into(),
            language: "en".into(),
            last_modified: "2019-03-27T13:21:11Z".into(),
            sitemap_locations: Vec::new(),
        })
        .unwrap();
        ContentNode::new(system, BTreeMap::new(), TypeShell::generic())
    }

    #[test]
    fn test_register_is_idempotent_per_codename() {
        let mut registry = ProcessedRegistry::new();
        let first = registry.register(node("tom_hardy"));
        let again = registry.register(node("tom_hardy"));
        let other = registry.register(node("joel_edgerton"));

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("joel_edgerton"));
    }

    #[test]
    fn test_populate_then_into_graph() {
        let mut registry = ProcessedRegistry::new();
        let tom = registry.register(node("tom_hardy"));

        let mut fields = HashMap::new();
        fields.insert(
            "first_name".to_string(),
            FieldValue::Text(TextField::new("first_name", &json!("Tom")).unwrap()),
        );
        registry.populate(tom, fields);

        let graph = registry.into_graph();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph[tom].text("first_name"), Some("Tom"));
        assert_eq!(graph.by_codename("tom_hardy"), Some(tom));
    }
}

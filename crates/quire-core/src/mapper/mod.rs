//! Raw payload to content graph mapping.
//!
//! [`FieldMapper::map_entity`] maps one raw entity and everything it reaches
//! through linked items and rich text embeds. Nodes are registered in a
//! [`ProcessedRegistry`] before their fields are mapped, which makes cyclic
//! graphs terminate and guarantees one node per codename.

mod fields;
mod registry;


pub use registry::ProcessedRegistry;

use crate::config::{ClientConfig, QueryConfig};
use crate::contract::{ModularContentMap, RawEntity, RawField, RawSystem};
use crate::error::{QuireError, Result};
use crate::model::{ContentGraph, ContentNode, NodeRef, PartialNode, SystemAttributes};
use crate::resolvers::RewriteSettings;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps raw entities into typed content nodes.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    config: Arc<ClientConfig>,
}

impl FieldMapper {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn from_shared(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Maps `raw` into `registry` and returns its node.
    ///
    /// `registry` must belong to the current call only. Fatal errors leave it
    /// in an unspecified state and it should be dropped.
    pub fn map_entity(
        &self,
        raw: &RawEntity,
        modular_content: &ModularContentMap,
        query: &QueryConfig,
        registry: &mut ProcessedRegistry,
    ) -> Result<NodeRef> {
        self.pass(modular_content, query, registry).map_entity(raw)
    }

    /// Maps `raw` with a fresh registry and returns the finished graph.
    pub fn map_graph(
        &self,
        raw: &RawEntity,
        modular_content: &ModularContentMap,
        query: &QueryConfig,
    ) -> Result<(NodeRef, ContentGraph)> {
        let mut registry = ProcessedRegistry::new();
        let root = self.map_entity(raw, modular_content, query, &mut registry)?;
        Ok((root, registry.into_graph()))
    }

    /// Maps several top-level entities into one registry, in order.
    pub fn map_entities(
        &self,
        raws: &[RawEntity],
        modular_content: &ModularContentMap,
        query: &QueryConfig,
        registry: &mut ProcessedRegistry,
    ) -> Result<Vec<NodeRef>> {
        let mut pass = self.pass(modular_content, query, registry);
        raws.iter().map(|raw| pass.map_entity(raw)).collect()
    }

    fn pass<'a>(
        &'a self,
        modular_content: &'a ModularContentMap,
        query: &'a QueryConfig,
        registry: &'a mut ProcessedRegistry,
    ) -> MappingPass<'a> {
        MappingPass {
            config: &self.config,
            modular_content,
            query,
            settings: Arc::new(RewriteSettings::new(&self.config, query)),
            registry,
        }
    }
}

/// State of one mapping call.
pub(crate) struct MappingPass<'a> {
    config: &'a ClientConfig,
    modular_content: &'a ModularContentMap,
    query: &'a QueryConfig,
    /// Shared by every rich text field mapped in this call.
    settings: Arc<RewriteSettings>,
    registry: &'a mut ProcessedRegistry,
}

fn structure(raw: &RawEntity) -> Result<(&RawSystem, &BTreeMap<String, RawField>)> {
    let system = raw.system.as_ref().ok_or_else(|| {
        QuireError::MalformedInput("item is missing its 'system' attributes".into())
    })?;
    let elements = raw.elements.as_ref().ok_or_else(|| {
        QuireError::MalformedInput(format!(
            "item '{}' is missing its 'elements'",
            system.codename
        ))
    })?;
    Ok((system, elements))
}

impl<'a> MappingPass<'a> {
    fn logging(&self) -> bool {
        self.config.enable_advanced_logging
    }

    pub(crate) fn map_entity(&mut self, raw: &RawEntity) -> Result<NodeRef> {
        let (system, elements) = structure(raw)?;

        if let Some(existing) = self.registry.get(&system.codename) {
            return Ok(existing);
        }

        let attributes = SystemAttributes::from_raw(system)?;
        let shell = self.config.type_registry.create_shell(&system.content_type);
        let node = self
            .registry
            .register(ContentNode::new(attributes, elements.clone(), shell.clone()));

        debug!(
            "Registered item '{}' of type '{}' ({})",
            system.codename,
            system.content_type,
            if shell.is_generic() { "generic" } else { "typed" }
        );

        let fields = self.map_fields(system, elements, &shell)?;
        self.registry.populate(node, fields);
        Ok(node)
    }

    /// Node for a linked codename: registry, then the bundled entities.
    ///
    /// `Ok(None)` when the entity is not bundled and the missing item policy
    /// allows skipping it.
    fn resolve_linked(
        &mut self,
        codename: &str,
        field_name: &str,
        field: &RawField,
    ) -> Result<Option<NodeRef>> {
        if let Some(existing) = self.registry.get(codename) {
            return Ok(Some(existing));
        }

        let modular_content = self.modular_content;
        let Some(raw) = modular_content.get(codename) else {
            if self.query.throw_error_for_missing_linked_items {
                return Err(QuireError::MissingLinkedItem {
                    codename: codename.to_string(),
                    field: field_name.to_string(),
                });
            }
            if self.logging() {
                warn!(
                    "Linked item '{}' of field '{}' is not in the response and is skipped",
                    codename, field_name
                );
            }
            return Ok(None);
        };

        let query = self.query;
        if let Some(resolve) = query.item_resolver.as_ref() {
            if let Some(partial) = resolve(field, raw, modular_content, query) {
                return self.stitch(raw, partial).map(Some);
            }
        }

        self.map_entity(raw).map(Some)
    }

    /// Registers a node produced by an item resolver, with identity and raw
    /// elements taken from the raw entity.
    fn stitch(&mut self, raw: &RawEntity, partial: PartialNode) -> Result<NodeRef> {
        let (system, elements) = structure(raw)?;
        let attributes = SystemAttributes::from_raw(system)?;
        let shell = partial
            .shell
            .unwrap_or_else(|| self.config.type_registry.create_shell(&system.content_type));

        let mut node = ContentNode::new(attributes, elements.clone(), shell);
        node.set_fields(partial.fields);

        debug!("Registered item '{}' from a custom item resolver", system.codename);
        Ok(self.registry.register(node))
    }
}

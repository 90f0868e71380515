//! Whole delivery responses: a single item or a listing, with their bundled entities.

use crate::config::{ClientConfig, QueryConfig};
use crate::contract::{Pagination, RawItemResponse, RawListingResponse};
use crate::error::{QuireError, Result};
use crate::mapper::{FieldMapper, ProcessedRegistry};
use crate::model::{ContentGraph, ContentNode, NodeRef};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// A mapped single item response.
#[derive(Debug, Clone)]
pub struct ItemResponse {
    pub item: NodeRef,
    pub graph: ContentGraph,
}

impl ItemResponse {
    pub fn node(&self) -> &ContentNode {
        &self.graph[self.item]
    }
}

/// A mapped listing response.
#[derive(Debug, Clone)]
pub struct ItemListingResponse {
    /// Top-level items in response order.
    pub items: Vec<NodeRef>,
    pub pagination: Pagination,
    pub graph: ContentGraph,
}

impl ItemListingResponse {
    pub fn first_item(&self) -> Option<&ContentNode> {
        self.items.first().map(|r| &self.graph[*r])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ContentNode> {
        self.items.iter().map(|r| &self.graph[*r])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Maps response payloads into content graphs. One registry per response.
#[derive(Debug, Clone)]
pub struct ResponseMapper {
    mapper: FieldMapper,
}

impl ResponseMapper {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            mapper: FieldMapper::new(config),
        }
    }

    pub fn from_shared(config: Arc<ClientConfig>) -> Self {
        Self {
            mapper: FieldMapper::from_shared(config),
        }
    }

    pub fn field_mapper(&self) -> &FieldMapper {
        &self.mapper
    }

    pub fn map_item_response(
        &self,
        response: &RawItemResponse,
        query: &QueryConfig,
    ) -> Result<ItemResponse> {
        let (item, graph) =
            self.mapper
                .map_graph(&response.item, &response.modular_content, query)?;
        debug!("Mapped item response into {} nodes", graph.len());
        Ok(ItemResponse { item, graph })
    }

    /// Maps every item with one shared registry, so an entity that is both a
    /// top-level item and linked from another item is a single node.
    pub fn map_listing_response(
        &self,
        response: &RawListingResponse,
        query: &QueryConfig,
    ) -> Result<ItemListingResponse> {
        let mut registry = ProcessedRegistry::new();
        let items = self.mapper.map_entities(
            &response.items,
            &response.modular_content,
            query,
            &mut registry,
        )?;
        let graph = registry.into_graph();
        debug!(
            "Mapped listing response of {} items into {} nodes",
            items.len(),
            graph.len()
        );
        Ok(ItemListingResponse {
            items,
            pagination: response.pagination.clone(),
            graph,
        })
    }

    pub fn map_item_json(&self, json: &str, query: &QueryConfig) -> Result<ItemResponse> {
        self.map_item_response(&parse_item_response(json)?, query)
    }

    pub fn map_listing_json(&self, json: &str, query: &QueryConfig) -> Result<ItemListingResponse> {
        self.map_listing_response(&parse_listing_response(json)?, query)
    }
}

/// Invalid JSON is a [`QuireError::Json`]; valid JSON of the wrong shape is
/// [`QuireError::MalformedInput`].
pub fn parse_item_response(json: &str) -> Result<RawItemResponse> {
    parse_payload(json, "item response")
}

pub fn parse_listing_response(json: &str) -> Result<RawListingResponse> {
    parse_payload(json, "listing response")
}

fn parse_payload<T: DeserializeOwned>(json: &str, what: &str) -> Result<T> {
    let value: Value = serde_json::from_str(json)?;
    serde_json::from_value(value)
        .map_err(|e| QuireError::MalformedInput(format!("invalid {}: {}", what, e)))
}

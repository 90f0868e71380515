//! Wire shapes of delivery payloads.
//!
//! These types are deserialized straight from the JSON the transport layer
//! hands over and are never mutated afterwards. `system` and `elements` are
//! optional at this level so that a payload missing them surfaces as
//! [`QuireError::MalformedInput`](crate::QuireError::MalformedInput) from the
//! mapper instead of an opaque serde error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Entities bundled alongside the primary payload, keyed by codename.
pub type ModularContentMap = HashMap<String, RawEntity>;

/// One content item as delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawEntity {
    #[serde(default)]
    pub system: Option<RawSystem>,

    #[serde(default)]
    pub elements: Option<BTreeMap<String, RawField>>,
}

impl RawEntity {
    pub fn new(system: RawSystem, elements: BTreeMap<String, RawField>) -> Self {
        Self {
            system: Some(system),
            elements: Some(elements),
        }
    }

    pub fn codename(&self) -> Option<&str> {
        self.system.as_ref().map(|s| s.codename.as_str())
    }
}

/// Identity metadata of a content item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSystem {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub codename: String,

    #[serde(rename = "type")]
    pub content_type: String,

    pub language: String,

    /// RFC 3339 timestamp.
    pub last_modified: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sitemap_locations: Vec<String>,
}

/// One element of a content item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawField {
    /// Field kind tag, e.g. `text`, `rich_text`, `modular_content`.
    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_group: Option<String>,

    /// Codenames of items embedded in a rich text value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modular_content: Vec<String>,

    /// Rich text hyperlink targets, keyed by item id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, RawLink>,
}

impl RawField {
    pub fn new(field_type: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        Self {
            field_type: field_type.into(),
            name: name.into(),
            value,
            taxonomy_group: None,
            modular_content: Vec::new(),
            links: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawLink {
    pub codename: String,

    #[serde(rename = "type")]
    pub content_type: String,

    #[serde(default)]
    pub url_slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,

    #[serde(default)]
    pub limit: u32,

    #[serde(default)]
    pub count: u32,

    #[serde(default)]
    pub next_page: String,
}

/// `{ item, modular_content }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawItemResponse {
    pub item: RawEntity,

    #[serde(default)]
    pub modular_content: ModularContentMap,
}

/// `{ items, modular_content, pagination }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawListingResponse {
    pub items: Vec<RawEntity>,

    #[serde(default)]
    pub modular_content: ModularContentMap,

    #[serde(default)]
    pub pagination: Pagination,
}

use super::link::Link;
use super::node::{LinkedItemLookup, NodeRef};
use crate::config::LinkResolverFn;
use crate::error::{QuireError, Result};
use crate::markup::RichTextResolution;
use crate::resolvers::{rich_text, url_slug, RewriteSettings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Field kind tags as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Number,
    DateTime,
    MultipleChoice,
    Asset,
    Taxonomy,
    UrlSlug,
    RichText,
    LinkedItems,
    Custom,
}

impl FieldKind {
    /// Case-insensitive parse of a wire tag.
    pub fn parse(tag: &str) -> Option<Self> {
        let kind = match tag.to_ascii_lowercase().as_str() {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "date_time" => FieldKind::DateTime,
            "multiple_choice" => FieldKind::MultipleChoice,
            "asset" => FieldKind::Asset,
            "taxonomy" => FieldKind::Taxonomy,
            "url_slug" => FieldKind::UrlSlug,
            "rich_text" => FieldKind::RichText,
            "modular_content" => FieldKind::LinkedItems,
            "custom" => FieldKind::Custom,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::DateTime => "date_time",
            FieldKind::MultipleChoice => "multiple_choice",
            FieldKind::Asset => "asset",
            FieldKind::Taxonomy => "taxonomy",
            FieldKind::UrlSlug => "url_slug",
            FieldKind::RichText => "rich_text",
            FieldKind::LinkedItems => "modular_content",
            FieldKind::Custom => "custom",
        }
    }
}

/// A mapped field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(TextField),
    Number(NumberField),
    DateTime(DateTimeField),
    MultipleChoice(MultipleChoiceField),
    Asset(AssetsField),
    Taxonomy(TaxonomyField),
    UrlSlug(UrlSlugField),
    RichText(RichTextField),
    LinkedItems(LinkedItemsField),
    Custom(CustomField),
}

impl FieldValue {
    /// Codename of the field this value was mapped from.
    pub fn name(&self) -> &str {
        match self {
            FieldValue::Text(f) => &f.name,
            FieldValue::Number(f) => &f.name,
            FieldValue::DateTime(f) => &f.name,
            FieldValue::MultipleChoice(f) => &f.name,
            FieldValue::Asset(f) => &f.name,
            FieldValue::Taxonomy(f) => &f.name,
            FieldValue::UrlSlug(f) => &f.name,
            FieldValue::RichText(f) => &f.name,
            FieldValue::LinkedItems(f) => &f.name,
            FieldValue::Custom(f) => &f.name,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::DateTime(_) => FieldKind::DateTime,
            FieldValue::MultipleChoice(_) => FieldKind::MultipleChoice,
            FieldValue::Asset(_) => FieldKind::Asset,
            FieldValue::Taxonomy(_) => FieldKind::Taxonomy,
            FieldValue::UrlSlug(_) => FieldKind::UrlSlug,
            FieldValue::RichText(_) => FieldKind::RichText,
            FieldValue::LinkedItems(_) => FieldKind::LinkedItems,
            FieldValue::Custom(_) => FieldKind::Custom,
        }
    }

    /// Raw value as delivered.
    pub fn raw_value(&self) -> Value {
        match self {
            FieldValue::Text(f) => Value::String(f.value.clone()),
            FieldValue::Number(f) => f.value.clone(),
            FieldValue::DateTime(f) => f.value.clone(),
            FieldValue::MultipleChoice(f) => f.value.clone(),
            FieldValue::Asset(f) => f.value.clone(),
            FieldValue::Taxonomy(f) => f.value.clone(),
            FieldValue::UrlSlug(f) => Value::String(f.value.clone()),
            FieldValue::RichText(f) => Value::String(f.value.clone()),
            FieldValue::LinkedItems(f) => {
                Value::Array(f.value.iter().cloned().map(Value::String).collect())
            }
            FieldValue::Custom(f) => f.value.clone(),
        }
    }
}

pub(crate) fn string_value(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        other => Err(QuireError::MalformedInput(format!(
            "field '{}' expects a string value, got {}",
            name, other
        ))),
    }
}

fn list_value<T: serde::de::DeserializeOwned>(name: &str, value: &Value) -> Result<Vec<T>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone()).map_err(|e| {
        QuireError::MalformedInput(format!("field '{}' has an unexpected shape: {}", name, e))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub name: String,
    pub value: String,
}

impl TextField {
    pub fn new(name: impl Into<String>, value: &Value) -> Result<Self> {
        let name = name.into();
        let value = string_value(&name, value)?;
        Ok(Self { name, value })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberField {
    pub name: String,
    pub value: Value,
    /// None when the raw value is null or not a number.
    pub number: Option<f64>,
}

impl NumberField {
    pub fn new(name: impl Into<String>, value: &Value) -> Self {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        Self {
            name: name.into(),
            value: value.clone(),
            number,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeField {
    pub name: String,
    pub value: Value,
    /// None when the raw value is null or not RFC 3339.
    pub datetime: Option<DateTime<Utc>>,
}

impl DateTimeField {
    pub fn new(name: impl Into<String>, value: &Value) -> Self {
        let datetime = value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        Self {
            name: name.into(),
            value: value.clone(),
            datetime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceOption {
    pub name: String,
    pub codename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipleChoiceField {
    pub name: String,
    pub value: Value,
    pub options: Vec<MultipleChoiceOption>,
}

impl MultipleChoiceField {
    pub fn new(name: impl Into<String>, value: &Value) -> Result<Self> {
        let name = name.into();
        let options = list_value(&name, value)?;
        Ok(Self {
            name,
            value: value.clone(),
            options,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetModel {
    pub name: String,

    #[serde(rename = "type")]
    pub asset_type: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub description: Option<String>,

    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetsField {
    pub name: String,
    pub value: Value,
    pub assets: Vec<AssetModel>,
}

impl AssetsField {
    pub fn new(name: impl Into<String>, value: &Value) -> Result<Self> {
        let name = name.into();
        let assets = list_value(&name, value)?;
        Ok(Self {
            name,
            value: value.clone(),
            assets,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub name: String,
    pub codename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyField {
    pub name: String,
    pub value: Value,
    pub taxonomy_group: Option<String>,
    pub terms: Vec<TaxonomyTerm>,
}

impl TaxonomyField {
    pub fn new(
        name: impl Into<String>,
        value: &Value,
        taxonomy_group: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        let terms = list_value(&name, value)?;
        Ok(Self {
            name,
            value: value.clone(),
            taxonomy_group,
            terms,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomField {
    pub name: String,
    pub value: Value,
}

impl CustomField {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Linked items in source order. Missing items are already left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedItemsField {
    pub name: String,
    /// Codenames as delivered, including ones that could not be resolved.
    pub value: Vec<String>,
    pub items: Vec<NodeRef>,
}

/// URL slug with a deferred link resolution.
///
/// The link and the resolver are captured when the field is mapped, so
/// [`resolve_url`](Self::resolve_url) needs nothing else.
#[derive(Clone)]
pub struct UrlSlugField {
    pub name: String,
    pub value: String,
    link: Link,
    resolver: Option<LinkResolverFn>,
    enable_advanced_logging: bool,
}

impl UrlSlugField {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        link: Link,
        resolver: Option<LinkResolverFn>,
        enable_advanced_logging: bool,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            link,
            resolver,
            enable_advanced_logging,
        }
    }

    /// Link describing the owning item.
    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Runs the captured link resolver. Not cached.
    pub fn resolve_url(&self) -> Option<String> {
        url_slug::resolve_url(
            &self.name,
            &self.link,
            self.resolver.as_ref(),
            self.enable_advanced_logging,
        )
    }
}

impl fmt::Debug for UrlSlugField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlSlugField")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("link", &self.link)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Rich text with a deferred rewrite.
///
/// Holds an immutable snapshot of what the rewrite needs: the raw markup,
/// the link descriptors and the rewrite settings of the mapping call. The
/// embedded items themselves are looked up through a [`LinkedItemLookup`],
/// normally the [`ContentGraph`](super::ContentGraph) the field belongs to.
#[derive(Clone)]
pub struct RichTextField {
    pub name: String,
    pub value: String,
    /// Embedded item codenames as delivered.
    pub linked_item_codenames: Vec<String>,
    /// Embedded items that were present in the response.
    pub linked_items: Vec<NodeRef>,
    pub links: Vec<Link>,
    settings: Arc<RewriteSettings>,
}

impl RichTextField {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        linked_item_codenames: Vec<String>,
        linked_items: Vec<NodeRef>,
        links: Vec<Link>,
        settings: Arc<RewriteSettings>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            linked_item_codenames,
            linked_items,
            links,
            settings,
        }
    }

    pub fn settings(&self) -> &RewriteSettings {
        &self.settings
    }

    /// Rewrites the markup. Every call parses and rewrites again.
    pub fn resolve(&self, lookup: &dyn LinkedItemLookup) -> Result<RichTextResolution> {
        rich_text::rewrite(&self.value, &self.links, lookup, &self.settings)
    }

    pub fn resolve_html(&self, lookup: &dyn LinkedItemLookup) -> Result<String> {
        self.resolve(lookup).map(|resolution| resolution.resolved_html)
    }
}

impl fmt::Debug for RichTextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichTextField")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("linked_item_codenames", &self.linked_item_codenames)
            .field("linked_items", &self.linked_items)
            .field("links", &self.links)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_field_kind_parse_is_case_insensitive() {
        assert_eq!(FieldKind::parse("Rich_Text"), Some(FieldKind::RichText));
        assert_eq!(FieldKind::parse("modular_content"), Some(FieldKind::LinkedItems));
        assert_eq!(FieldKind::parse("DATE_TIME"), Some(FieldKind::DateTime));
        assert_eq!(FieldKind::parse("geo_point"), None);
        assert_eq!(FieldKind::LinkedItems.as_str(), "modular_content");
    }

    #[test]
    fn test_datetime_field() {
        let field = DateTimeField::new("name", &json!("2014-11-18T00:00:00Z"));
        assert_eq!(field.name, "name");
        assert_eq!(field.value, json!("2014-11-18T00:00:00Z"));
        assert_eq!(
            field.datetime,
            Some(Utc.with_ymd_and_hms(2014, 11, 18, 0, 0, 0).unwrap())
        );

        assert_eq!(DateTimeField::new("name", &Value::Null).datetime, None);
        assert_eq!(DateTimeField::new("name", &json!("yesterday")).datetime, None);
    }

    #[test]
    fn test_number_field() {
        assert_eq!(NumberField::new("length", &json!(139)).number, Some(139.0));
        assert_eq!(NumberField::new("length", &json!("7.5")).number, Some(7.5));
        assert_eq!(NumberField::new("length", &Value::Null).number, None);
    }

    #[test]
    fn test_text_field_rejects_non_strings() {
        assert_eq!(TextField::new("title", &json!("Warrior")).unwrap().value, "Warrior");
        assert_eq!(TextField::new("title", &Value::Null).unwrap().value, "");
        assert!(matches!(
            TextField::new("title", &json!(42)),
            Err(QuireError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_list_fields() {
        let options = MultipleChoiceField::new(
            "category",
            &json!([{ "name": "Action", "codename": "action" }]),
        )
        .unwrap();
        assert_eq!(options.options[0].codename, "action");

        let taxonomy = TaxonomyField::new(
            "release_category",
            &json!([{ "name": "Global release", "codename": "global_release" }]),
            Some("release_category".into()),
        )
        .unwrap();
        assert_eq!(taxonomy.terms.len(), 1);
        assert_eq!(taxonomy.taxonomy_group.as_deref(), Some("release_category"));

        let assets = AssetsField::new(
            "poster",
            &json!([{
                "name": "warrior.jpg",
                "type": "image/jpeg",
                "size": 90895,
                "description": null,
                "url": "https://assets.example.com/warrior.jpg"
            }]),
        )
        .unwrap();
        assert_eq!(assets.assets[0].asset_type, "image/jpeg");
        assert_eq!(assets.assets[0].size, 90895);

        assert!(AssetsField::new("poster", &Value::Null).unwrap().assets.is_empty());
        assert!(matches!(
            MultipleChoiceField::new("category", &json!("action")),
            Err(QuireError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_raw_value_roundtrips_linked_codenames() {
        let field = FieldValue::LinkedItems(LinkedItemsField {
            name: "stars".into(),
            value: vec!["tom_hardy".into(), "joel_edgerton".into()],
            items: Vec::new(),
        });
        assert_eq!(field.raw_value(), json!(["tom_hardy", "joel_edgerton"]));
        assert_eq!(field.kind(), FieldKind::LinkedItems);
        assert_eq!(field.name(), "stars");
    }
}

//! Rich text markup rewriting.
//!
//! Two interchangeable backends implement [`RichTextParser`]:
//!
//! - [`DomRichTextParser`] parses into an arena document with parent links
//!   and replaces nodes in place, the way a browser DOM would.
//! - [`TreeRichTextParser`] parses into an owned node tree and splices
//!   replacements while walking it recursively.
//!
//! Both share the tokenizer, the marker rules in [`visit_element`] and the
//! serialization helpers, and must produce identical output and observations
//! for the same input.

mod dom;
mod lexer;
mod serialize;
mod tree;


pub use dom::DomRichTextParser;
pub use tree::TreeRichTextParser;

use crate::error::{QuireError, Result};
use crate::model::{LinkResult, RichTextContentType};
use log::warn;
use quick_xml::escape::{escape, unescape};
use serde::{Deserialize, Serialize};

/// Element attribute. `value` is kept in escaped source form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    /// Attribute from an unescaped value.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            value: escape(text).into_owned(),
        }
    }

    /// Unescaped value. Values with broken entities come back verbatim.
    pub fn text(&self) -> String {
        unescape(&self.value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| self.value.clone())
    }
}

/// A tree backend that rewrites transclusion markers and item links.
pub trait RichTextParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve_rich_text(
        &self,
        html: &str,
        replacements: &dyn RichTextReplacements,
        config: &HtmlResolverConfig,
    ) -> Result<RichTextResolution>;
}

/// Callbacks a backend uses to obtain replacement content.
pub trait RichTextReplacements {
    /// Markup for an embedded item.
    fn linked_item_html(&self, codename: &str, content_type: RichTextContentType) -> Result<String>;

    /// Resolution of an anchor carrying an item id. `None` leaves the anchor untouched.
    fn link_result(&self, item_id: &str, link_text: &str) -> Option<LinkResult>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlResolverConfig {
    pub wrapper_tag: String,
    pub wrapper_classes: Vec<String>,
    /// `type` attribute value marking a transclusion.
    pub embed_content_type: String,
    pub enable_advanced_logging: bool,
}

impl Default for HtmlResolverConfig {
    fn default() -> Self {
        Self {
            wrapper_tag: "p".into(),
            wrapper_classes: vec!["linked-item-wrapper".into()],
            embed_content_type: "application/kenticocloud".into(),
            enable_advanced_logging: false,
        }
    }
}

/// Anchor with an item id met during a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkObservation {
    pub data_item_id: String,
}

/// Transclusion marker met during a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderObservation {
    pub data_codename: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RichTextResolution {
    pub resolved_html: String,
    /// In document order.
    pub links: Vec<LinkObservation>,
    /// In document order.
    pub linked_items: Vec<PlaceholderObservation>,
}

const LINK_TAG: &str = "a";
const ATTR_TYPE: &str = "type";
const ATTR_DATA_TYPE: &str = "data-type";
const ATTR_DATA_CODENAME: &str = "data-codename";
const ATTR_DATA_ITEM_ID: &str = "data-item-id";
const ATTR_HREF: &str = "href";
const ATTR_CLASS: &str = "class";

/// What a backend does with an element after [`visit_element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Visit {
    /// Keep the element and walk its children.
    Descend,
    /// Replace the element with a wrapper element holding the parsed markup.
    Wrap(String),
    /// Replace the element with the parsed markup.
    Replace(String),
}

pub(crate) fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attributes
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}

fn set_attribute(attributes: &mut [Attribute], name: &str, text: &str) -> bool {
    match attributes
        .iter_mut()
        .find(|a| a.name.eq_ignore_ascii_case(name))
    {
        Some(attribute) => {
            attribute.value = escape(text).into_owned();
            true
        }
        None => false,
    }
}

/// Attributes of the element wrapping a transcluded item.
pub(crate) fn wrapper_attributes(config: &HtmlResolverConfig) -> Vec<Attribute> {
    if config.wrapper_classes.is_empty() {
        return Vec::new();
    }
    vec![Attribute::from_text(
        ATTR_CLASS,
        &config.wrapper_classes.join(" "),
    )]
}

/// Applies the marker rules to one element.
///
/// Records observations, asks `replacements` for content and rewrites `href`
/// in place. Structural changes are left to the caller through the returned
/// [`Visit`]; replacement content must not be walked again.
pub(crate) fn visit_element(
    name: &str,
    attributes: &mut [Attribute],
    inner_html: impl FnOnce() -> String,
    replacements: &dyn RichTextReplacements,
    config: &HtmlResolverConfig,
    result: &mut RichTextResolution,
) -> Result<Visit> {
    let is_embed = find_attribute(attributes, ATTR_TYPE)
        .map(|a| a.text().eq_ignore_ascii_case(&config.embed_content_type))
        .unwrap_or(false);

    if is_embed {
        return visit_embed(attributes, replacements, result);
    }

    if name.eq_ignore_ascii_case(LINK_TAG) {
        if let Some(item_id) = find_attribute(attributes, ATTR_DATA_ITEM_ID).map(Attribute::text) {
            return Ok(visit_link(
                item_id,
                attributes,
                inner_html,
                replacements,
                config,
                result,
            ));
        }
    }

    Ok(Visit::Descend)
}

fn visit_embed(
    attributes: &[Attribute],
    replacements: &dyn RichTextReplacements,
    result: &mut RichTextResolution,
) -> Result<Visit> {
    // a marker without a data type is as unsupported as an unknown one
    let data_type = find_attribute(attributes, ATTR_DATA_TYPE)
        .map(Attribute::text)
        .unwrap_or_default();

    let content_type = RichTextContentType::parse(&data_type).ok_or_else(|| {
        QuireError::UnsupportedEmbedKind {
            data_type: data_type.clone(),
        }
    })?;

    let codename = find_attribute(attributes, ATTR_DATA_CODENAME)
        .map(Attribute::text)
        .ok_or_else(|| {
            QuireError::MalformedEmbed(format!(
                "object in rich text is missing the '{}' attribute",
                ATTR_DATA_CODENAME
            ))
        })?;

    result.linked_items.push(PlaceholderObservation {
        data_codename: codename.clone(),
        data_type,
    });

    let html = replacements.linked_item_html(&codename, content_type)?;
    Ok(Visit::Wrap(html))
}

fn visit_link(
    item_id: String,
    attributes: &mut [Attribute],
    inner_html: impl FnOnce() -> String,
    replacements: &dyn RichTextReplacements,
    config: &HtmlResolverConfig,
    result: &mut RichTextResolution,
) -> Visit {
    let link_text = inner_html();
    let link_result = replacements.link_result(&item_id, &link_text);
    result.links.push(LinkObservation {
        data_item_id: item_id,
    });

    let Some(link_result) = link_result else {
        return Visit::Descend;
    };

    if let Some(html) = link_result.replacement_html() {
        return Visit::Replace(html.to_string());
    }

    if let Some(url) = link_result.href() {
        if !set_attribute(attributes, ATTR_HREF, url) && config.enable_advanced_logging {
            warn!(
                "Cannot set url '{}' because the anchor has no 'href' attribute",
                url
            );
        }
    }

    Visit::Descend
}

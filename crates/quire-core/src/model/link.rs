use crate::contract::RawLink;
use serde::{Deserialize, Serialize};

/// A hyperlink target described by the payload's `links` side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub item_id: String,
    pub codename: String,
    pub url_slug: String,
    pub content_type: String,
}

impl Link {
    pub fn from_raw(item_id: &str, raw: &RawLink) -> Self {
        Self {
            item_id: item_id.to_string(),
            codename: raw.codename.clone(),
            url_slug: raw.url_slug.clone(),
            content_type: raw.content_type.clone(),
        }
    }
}

/// Extra information handed to link resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkContext {
    /// Inner markup of the anchor being resolved. Empty for URL slug fields.
    pub link_text: String,
}

/// What a link resolver produced for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResult {
    /// Plain URL, written into the anchor's `href`.
    Url(String),

    /// `as_html` replaces the whole anchor, otherwise `as_url` goes into `href`.
    Structured {
        as_url: Option<String>,
        as_html: Option<String>,
    },
}

impl LinkResult {
    pub fn url(url: impl Into<String>) -> Self {
        LinkResult::Url(url.into())
    }

    pub fn html(html: impl Into<String>) -> Self {
        LinkResult::Structured {
            as_url: None,
            as_html: Some(html.into()),
        }
    }

    /// Markup to substitute for the anchor, if any.
    pub fn replacement_html(&self) -> Option<&str> {
        match self {
            LinkResult::Structured {
                as_html: Some(html),
                ..
            } if !html.is_empty() => Some(html),
            _ => None,
        }
    }

    /// URL to write into `href`, if any.
    pub fn href(&self) -> Option<&str> {
        match self {
            LinkResult::Url(url) if !url.is_empty() => Some(url),
            LinkResult::Structured {
                as_url: Some(url), ..
            } if !url.is_empty() => Some(url),
            _ => None,
        }
    }

    /// True when the resolver produced neither markup nor a URL.
    pub fn is_empty(&self) -> bool {
        self.replacement_html().is_none() && self.href().is_none()
    }
}

/// Kind of object embedded in rich text. Only items are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RichTextContentType {
    Item,
}

impl RichTextContentType {
    pub fn parse(data_type: &str) -> Option<Self> {
        match data_type {
            "item" => Some(RichTextContentType::Item),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RichTextContentType::Item => "item",
        }
    }
}

/// Extra information handed to rich text resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RichTextContext {
    pub content_type: RichTextContentType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_result_accessors() {
        let url = LinkResult::url("https://x/tom");
        assert_eq!(url.href(), Some("https://x/tom"));
        assert_eq!(url.replacement_html(), None);

        let html = LinkResult::html("<test>tom-hardy</test>");
        assert_eq!(html.replacement_html(), Some("<test>tom-hardy</test>"));
        assert_eq!(html.href(), None);

        assert!(LinkResult::url("").is_empty());
        assert!(LinkResult::Structured {
            as_url: None,
            as_html: Some(String::new()),
        }
        .is_empty());
    }

    #[test]
    fn test_rich_text_content_type_is_strict() {
        assert_eq!(RichTextContentType::parse("item"), Some(RichTextContentType::Item));
        assert_eq!(RichTextContentType::parse("component"), None);
        assert_eq!(RichTextContentType::parse("Item"), None);
    }
}

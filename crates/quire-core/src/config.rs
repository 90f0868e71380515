use crate::contract::{ModularContentMap, RawEntity, RawField};
use crate::error::{QuireError, Result};
use crate::markup::{DomRichTextParser, HtmlResolverConfig, RichTextParser, TreeRichTextParser};
use crate::model::{
    ContentNode, FieldValue, Link, LinkContext, LinkResult, PartialNode, RichTextContext,
};
use crate::variant::{TypeRegistry, TypeResolver};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Maps a link to a URL or replacement markup.
pub type LinkResolverFn = Arc<dyn Fn(&Link, &LinkContext) -> Option<LinkResult> + Send + Sync>;

/// Renders an embedded item as markup.
pub type RichTextResolverFn = Arc<dyn Fn(&ContentNode, &RichTextContext) -> String + Send + Sync>;

/// Maps a field codename to a property name.
pub type PropertyResolverFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Custom mapping of a linked item. Returning `None` falls back to the default mapper.
pub type ItemResolverFn = Arc<
    dyn Fn(&RawField, &RawEntity, &ModularContentMap, &QueryConfig) -> Option<PartialNode>
        + Send
        + Sync,
>;

/// Custom mapping of `custom` fields: `(content type, field codename, raw value)`.
pub type FieldResolverFn = Arc<dyn Fn(&str, &str, &Value) -> Option<FieldValue> + Send + Sync>;

/// Per-query options. Passed through the mapper unmodified.
#[derive(Clone, Default)]
pub struct QueryConfig {
    /// Fail instead of skipping linked items missing from the response. Default: false.
    pub throw_error_for_missing_linked_items: bool,

    /// Takes precedence over link resolvers declared on types.
    pub link_resolver: Option<LinkResolverFn>,

    /// Takes precedence over rich text resolvers declared on types.
    pub rich_text_resolver: Option<RichTextResolverFn>,

    pub item_resolver: Option<ItemResolverFn>,
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_throw_error_for_missing_linked_items(mut self, throw: bool) -> Self {
        self.throw_error_for_missing_linked_items = throw;
        self
    }

    pub fn with_link_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Link, &LinkContext) -> Option<LinkResult> + Send + Sync + 'static,
    {
        self.link_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_rich_text_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ContentNode, &RichTextContext) -> String + Send + Sync + 'static,
    {
        self.rich_text_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_item_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&RawField, &RawEntity, &ModularContentMap, &QueryConfig) -> Option<PartialNode>
            + Send
            + Sync
            + 'static,
    {
        self.item_resolver = Some(Arc::new(resolver));
        self
    }
}

impl fmt::Debug for QueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryConfig")
            .field(
                "throw_error_for_missing_linked_items",
                &self.throw_error_for_missing_linked_items,
            )
            .field("link_resolver", &self.link_resolver.is_some())
            .field("rich_text_resolver", &self.rich_text_resolver.is_some())
            .field("item_resolver", &self.item_resolver.is_some())
            .finish()
    }
}

/// Which tree backend rewrites rich text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserBackend {
    /// Arena document with parent links, mutated in place.
    Dom,
    /// Owned node tree, rewritten recursively.
    #[default]
    Tree,
}

impl ParserBackend {
    pub fn parser(self) -> Arc<dyn RichTextParser> {
        match self {
            ParserBackend::Dom => Arc::new(DomRichTextParser),
            ParserBackend::Tree => Arc::new(TreeRichTextParser),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParserBackend::Dom => "dom",
            ParserBackend::Tree => "tree",
        }
    }
}

impl FromStr for ParserBackend {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dom" => Ok(ParserBackend::Dom),
            "tree" => Ok(ParserBackend::Tree),
            other => Err(QuireError::Validation(format!(
                "unknown parser backend '{}', expected 'dom' or 'tree'",
                other
            ))),
        }
    }
}

impl fmt::Display for ParserBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rich text output options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextOptions {
    /// Tag wrapping every transcluded item. Default: "p".
    pub linked_item_wrapper_tag: String,

    /// Classes set on the wrapper. Default: ["linked-item-wrapper"].
    pub linked_item_wrapper_classes: Vec<String>,

    /// `type` attribute value marking a transclusion. Default: "application/kenticocloud".
    pub embed_content_type: String,

    pub backend: ParserBackend,
}

impl Default for RichTextOptions {
    fn default() -> Self {
        Self {
            linked_item_wrapper_tag: "p".into(),
            linked_item_wrapper_classes: vec!["linked-item-wrapper".into()],
            embed_content_type: "application/kenticocloud".into(),
            backend: ParserBackend::default(),
        }
    }
}

impl RichTextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wrapper_tag(mut self, tag: impl Into<String>) -> Self {
        self.linked_item_wrapper_tag = tag.into();
        self
    }

    pub fn with_wrapper_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.linked_item_wrapper_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_embed_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.embed_content_type = content_type.into();
        self
    }

    pub fn with_backend(mut self, backend: ParserBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let tag = &self.linked_item_wrapper_tag;
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(QuireError::Validation(format!(
                "linked_item_wrapper_tag '{}' is not a valid tag name",
                tag
            )));
        }

        if self.embed_content_type.is_empty() {
            return Err(QuireError::Validation(
                "embed_content_type must not be empty".into(),
            ));
        }

        if let Some(class) = self
            .linked_item_wrapper_classes
            .iter()
            .find(|c| c.is_empty() || c.chars().any(char::is_whitespace))
        {
            return Err(QuireError::Validation(format!(
                "wrapper class '{}' must be a single non-empty token",
                class
            )));
        }

        Ok(())
    }
}

/// Client-wide configuration shared by every mapping call.
#[derive(Clone)]
pub struct ClientConfig {
    pub type_registry: TypeRegistry,

    pub field_resolver: Option<FieldResolverFn>,

    /// Emit warnings for every non-fatal degradation. Default: false.
    pub enable_advanced_logging: bool,

    pub rich_text: RichTextOptions,

    /// Backend used to rewrite rich text. Follows `rich_text.backend` unless injected.
    pub parser: Arc<dyn RichTextParser>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let rich_text = RichTextOptions::default();
        Self {
            type_registry: TypeRegistry::new(),
            field_resolver: None,
            enable_advanced_logging: false,
            parser: rich_text.backend.parser(),
            rich_text,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_resolver(mut self, resolver: TypeResolver) -> Self {
        self.type_registry.register(resolver);
        self
    }

    pub fn with_type_registry(mut self, registry: TypeRegistry) -> Self {
        self.type_registry = registry;
        self
    }

    pub fn with_field_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str, &str, &Value) -> Option<FieldValue> + Send + Sync + 'static,
    {
        self.field_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_advanced_logging(mut self, enabled: bool) -> Self {
        self.enable_advanced_logging = enabled;
        self
    }

    /// Replaces the rich text options and selects the backend they name.
    pub fn with_rich_text(mut self, options: RichTextOptions) -> Self {
        self.parser = options.backend.parser();
        self.rich_text = options;
        self
    }

    /// Injects a backend regardless of `rich_text.backend`.
    pub fn with_parser(mut self, parser: Arc<dyn RichTextParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn html_resolver_config(&self) -> HtmlResolverConfig {
        HtmlResolverConfig {
            wrapper_tag: self.rich_text.linked_item_wrapper_tag.clone(),
            wrapper_classes: self.rich_text.linked_item_wrapper_classes.clone(),
            embed_content_type: self.rich_text.embed_content_type.clone(),
            enable_advanced_logging: self.enable_advanced_logging,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.rich_text.validate()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("type_registry", &self.type_registry)
            .field("field_resolver", &self.field_resolver.is_some())
            .field("enable_advanced_logging", &self.enable_advanced_logging)
            .field("rich_text", &self.rich_text)
            .field("parser", &self.parser.name())
            .finish()
    }
}

//! Deferred resolution of rich text and URL slug fields.
//!
//! Both are run on demand, after the graph has been built, from the snapshot
//! captured when the field was mapped.

pub mod rich_text;
pub mod url_slug;

use crate::config::{ClientConfig, QueryConfig};
use crate::markup::{HtmlResolverConfig, RichTextParser};
use crate::variant::TypeRegistry;
use std::fmt;
use std::sync::Arc;

/// Everything a rich text rewrite needs besides the markup and the graph.
///
/// Built once per mapping call and shared by every rich text field of that call.
#[derive(Clone)]
pub struct RewriteSettings {
    pub parser: Arc<dyn RichTextParser>,
    pub html: HtmlResolverConfig,
    pub query: QueryConfig,
    /// Source of link resolvers declared on the types links point at.
    pub type_registry: TypeRegistry,
}

impl RewriteSettings {
    pub fn new(config: &ClientConfig, query: &QueryConfig) -> Self {
        Self {
            parser: Arc::clone(&config.parser),
            html: config.html_resolver_config(),
            query: query.clone(),
            type_registry: config.type_registry.clone(),
        }
    }
}

impl fmt::Debug for RewriteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriteSettings")
            .field("parser", &self.parser.name())
            .field("html", &self.html)
            .field("query", &self.query)
            .field("type_registry", &self.type_registry)
            .finish()
    }
}

//! Type variant resolution.
//!
//! A [`TypeRegistry`] maps content type codenames to factories producing
//! [`TypeShell`]s. A shell carries everything a concrete content type declares
//! up front: its static field-to-property table, an optional property resolver,
//! and default rich text and link resolvers. Types without a registered factory
//! get [`TypeShell::generic`].

use crate::config::{LinkResolverFn, PropertyResolverFn, RichTextResolverFn};
use crate::model::{ContentNode, Link, LinkContext, LinkResult, RichTextContext};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a fresh shell for one content type.
pub type ShellFactory = Arc<dyn Fn() -> TypeShell + Send + Sync>;

/// Declared capabilities of a content type, before any field is mapped.
#[derive(Clone, Default)]
pub struct TypeShell {
    /// Codename of the registered type. None for the generic shell.
    pub content_type: Option<String>,

    /// Static field codename → property name table.
    pub property_names: HashMap<String, String>,

    /// Consulted before `property_names`.
    pub property_resolver: Option<PropertyResolverFn>,

    pub rich_text_resolver: Option<RichTextResolverFn>,

    pub link_resolver: Option<LinkResolverFn>,
}

impl TypeShell {
    /// Shell for types nobody registered. Fields keep their codenames.
    pub fn generic() -> Self {
        Self::default()
    }

    pub fn typed(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Self::default()
        }
    }

    pub fn with_property(
        mut self,
        codename: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        self.property_names.insert(codename.into(), property.into());
        self
    }

    pub fn with_property_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.property_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_rich_text_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ContentNode, &RichTextContext) -> String + Send + Sync + 'static,
    {
        self.rich_text_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_link_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Link, &LinkContext) -> Option<LinkResult> + Send + Sync + 'static,
    {
        self.link_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn is_generic(&self) -> bool {
        self.content_type.is_none()
    }

    /// Property name for a field codename: property resolver, then the static
    /// table, then the codename itself. Empty names count as unresolved.
    pub fn property_name(&self, codename: &str) -> String {
        self.property_resolver
            .as_ref()
            .and_then(|resolve| resolve(codename))
            .filter(|name| !name.is_empty())
            .or_else(|| {
                self.property_names
                    .get(codename)
                    .filter(|name| !name.is_empty())
                    .cloned()
            })
            .unwrap_or_else(|| codename.to_string())
    }
}

impl fmt::Debug for TypeShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeShell")
            .field("content_type", &self.content_type)
            .field("property_names", &self.property_names)
            .field("property_resolver", &self.property_resolver.is_some())
            .field("rich_text_resolver", &self.rich_text_resolver.is_some())
            .field("link_resolver", &self.link_resolver.is_some())
            .finish()
    }
}

/// Registration of one content type.
#[derive(Clone)]
pub struct TypeResolver {
    content_type: String,
    factory: ShellFactory,
}

impl TypeResolver {
    pub fn new<F>(content_type: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> TypeShell + Send + Sync + 'static,
    {
        Self {
            content_type: content_type.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Builds a shell. A factory that leaves `content_type` unset gets the
    /// registered codename filled in.
    pub fn create(&self) -> TypeShell {
        let mut shell = (self.factory)();
        if shell.content_type.is_none() {
            shell.content_type = Some(self.content_type.clone());
        }
        shell
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeResolver")
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Externally owned lookup of registered content types.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    resolvers: HashMap<String, TypeResolver>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type. A later registration for the same codename wins.
    pub fn register(&mut self, resolver: TypeResolver) {
        self.resolvers
            .insert(resolver.content_type.clone(), resolver);
    }

    pub fn with(mut self, resolver: TypeResolver) -> Self {
        self.register(resolver);
        self
    }

    pub fn resolve(&self, content_type: &str) -> Option<&TypeResolver> {
        self.resolvers.get(content_type)
    }

    /// Concrete shell for registered types, generic shell otherwise.
    pub fn create_shell(&self, content_type: &str) -> TypeShell {
        self.resolve(content_type)
            .map(TypeResolver::create)
            .unwrap_or_else(TypeShell::generic)
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.resolvers.contains_key(content_type)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> TypeShell {
        TypeShell::typed("movie")
            .with_property("releasecategory", "release_category")
            .with_property_resolver(|codename| {
                (codename == "title").then(|| "headline".to_string())
            })
    }

    #[test]
    fn test_property_name_resolution_order() {
        let shell = movie();
        // resolver wins
        assert_eq!(shell.property_name("title"), "headline");
        // static table
        assert_eq!(shell.property_name("releasecategory"), "release_category");
        // fallback
        assert_eq!(shell.property_name("plot"), "plot");
    }

    #[test]
    fn test_resolver_precedes_static_table() {
        let shell = TypeShell::typed("actor")
            .with_property("first_name", "given")
            .with_property_resolver(|codename| {
                (codename == "first_name").then(|| "first".to_string())
            });
        assert_eq!(shell.property_name("first_name"), "first");
    }

    #[test]
    fn test_empty_names_fall_through() {
        let shell = TypeShell::typed("actor")
            .with_property("photo", "")
            .with_property_resolver(|_| Some(String::new()));
        assert_eq!(shell.property_name("photo"), "photo");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = TypeRegistry::new().with(TypeResolver::new("movie", movie));

        assert!(registry.contains("movie"));
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("actor").is_none());

        let shell = registry.create_shell("movie");
        assert_eq!(shell.content_type.as_deref(), Some("movie"));
        assert!(!shell.is_generic());

        let generic = registry.create_shell("actor");
        assert!(generic.is_generic());
        assert_eq!(generic.property_name("first_name"), "first_name");
    }

    #[test]
    fn test_factory_without_type_gets_registered_codename() {
        let resolver = TypeResolver::new("actor", TypeShell::default);
        assert_eq!(resolver.create().content_type.as_deref(), Some("actor"));
    }

    #[test]
    fn test_later_registration_wins() {
        let registry = TypeRegistry::new()
            .with(TypeResolver::new("movie", || TypeShell::typed("movie")))
            .with(TypeResolver::new("movie", || {
                TypeShell::typed("movie").with_property("title", "name")
            }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.create_shell("movie").property_name("title"), "name");
    }
}

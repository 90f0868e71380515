use super::RewriteSettings;
use crate::error::{QuireError, Result};
use crate::markup::{RichTextReplacements, RichTextResolution};
use crate::model::{
    Link, LinkContext, LinkResult, LinkedItemLookup, RichTextContentType, RichTextContext,
};
use log::warn;

/// Rewrites transclusion markers and item links in `markup`.
///
/// Embedded items are looked up through `lookup`; a marker whose item is not
/// there fails the whole rewrite. Links without a descriptor or a resolver
/// are left as they are.
pub fn rewrite(
    markup: &str,
    links: &[Link],
    lookup: &dyn LinkedItemLookup,
    settings: &RewriteSettings,
) -> Result<RichTextResolution> {
    let replacements = Replacements {
        links,
        lookup,
        settings,
    };
    settings
        .parser
        .resolve_rich_text(markup, &replacements, &settings.html)
}

struct Replacements<'a> {
    links: &'a [Link],
    lookup: &'a dyn LinkedItemLookup,
    settings: &'a RewriteSettings,
}

impl Replacements<'_> {
    fn logging(&self) -> bool {
        self.settings.html.enable_advanced_logging
    }

    fn resolve_link(&self, link: &Link, context: &LinkContext) -> Option<LinkResult> {
        if let Some(result) = self
            .settings
            .query
            .link_resolver
            .as_ref()
            .and_then(|resolve| resolve(link, context))
        {
            return Some(result);
        }

        let resolver = self.settings.type_registry.resolve(&link.content_type)?;
        let shell = resolver.create();
        shell
            .link_resolver
            .as_ref()
            .and_then(|resolve| resolve(link, context))
    }
}

impl RichTextReplacements for Replacements<'_> {
    fn linked_item_html(
        &self,
        codename: &str,
        content_type: RichTextContentType,
    ) -> Result<String> {
        let node = self
            .lookup
            .linked_item(codename)
            .ok_or_else(|| QuireError::UnresolvedEmbed {
                codename: codename.to_string(),
            })?;

        let context = RichTextContext { content_type };
        let resolver = self
            .settings
            .query
            .rich_text_resolver
            .as_ref()
            .or_else(|| node.rich_text_resolver());

        match resolver {
            Some(resolve) => Ok(resolve(node, &context)),
            None => {
                if self.logging() {
                    warn!(
                        "No rich text resolver for item '{}' of type '{}', it is rendered empty",
                        codename,
                        node.content_type()
                    );
                }
                Ok(String::new())
            }
        }
    }

    fn link_result(&self, item_id: &str, link_text: &str) -> Option<LinkResult> {
        let Some(link) = self.links.iter().find(|l| l.item_id == item_id) else {
            if self.logging() {
                warn!("No link descriptor for item id '{}', link left untouched", item_id);
            }
            return None;
        };

        let context = LinkContext {
            link_text: link_text.to_string(),
        };

        match self.resolve_link(link, &context) {
            Some(result) if !result.is_empty() => Some(result),
            _ => {
                if self.logging() {
                    warn!(
                        "Link to '{}' of type '{}' was not resolved and is left untouched",
                        link.codename, link.content_type
                    );
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, QueryConfig, RichTextOptions};
    use crate::contract::RawSystem;
    use crate::model::{ContentNode, SystemAttributes};
    use crate::variant::{TypeResolver, TypeShell};
    use std::collections::{BTreeMap, HashMap};

    fn node(codename: &str, content_type: &str, shell: TypeShell) -> ContentNode {
        let system = SystemAttributes::from_raw(&RawSystem {
            id: format!("{}-id", codename),
            name: None,
            codename: codename.into(),
            content_type: content_type.into(),
            language: "en".into(),
            last_modified: "2019-03-27T13:21:11Z".into(),
            sitemap_locations: Vec::new(),
        })
        .unwrap();
        ContentNode::new(system, BTreeMap::new(), shell)
    }

    fn actor_shell() -> TypeShell {
        TypeShell::typed("actor")
            .with_rich_text_resolver(|node, _| format!("<b>{}</b>", node.codename()))
            .with_link_resolver(|link, _| {
                Some(LinkResult::url(format!("/actors/{}", link.url_slug)))
            })
    }

    fn lookup() -> HashMap<String, ContentNode> {
        let mut items = HashMap::new();
        items.insert("tom_hardy".into(), node("tom_hardy", "actor", actor_shell()));
        items.insert("plain".into(), node("plain", "note", TypeShell::generic()));
        items
    }

    fn settings(query: QueryConfig) -> RewriteSettings {
        settings_with_logging(query, false)
    }

    fn settings_with_logging(query: QueryConfig, logging: bool) -> RewriteSettings {
        let config = ClientConfig::new()
            .with_advanced_logging(logging)
            .with_type_resolver(TypeResolver::new("actor", actor_shell))
            .with_rich_text(
                RichTextOptions::new()
                    .with_wrapper_tag("div")
                    .with_wrapper_classes(["wrapper"]),
            );
        RewriteSettings::new(&config, &query)
    }

    fn embed(codename: &str) -> String {
        format!(
            r#"<object type="application/kenticocloud" data-type="item" data-codename="{}"></object>"#,
            codename
        )
    }

    fn tom_link() -> Link {
        Link {
            item_id: "42".into(),
            codename: "tom_hardy".into(),
            url_slug: "tom-hardy".into(),
            content_type: "actor".into(),
        }
    }

    #[test]
    fn test_type_rich_text_resolver() {
        let result =
            rewrite(&embed("tom_hardy"), &[], &lookup(), &settings(QueryConfig::new())).unwrap();
        assert_eq!(
            result.resolved_html,
            r#"<div class="wrapper"><b>tom_hardy</b></div>"#
        );
    }

    #[test]
    fn test_query_rich_text_resolver_wins() {
        let query = QueryConfig::new().with_rich_text_resolver(|node, context| {
            format!("{}:{}", context.content_type.as_str(), node.content_type())
        });
        let result = rewrite(&embed("tom_hardy"), &[], &lookup(), &settings(query)).unwrap();
        assert_eq!(result.resolved_html, r#"<div class="wrapper">item:actor</div>"#);
    }

    #[test]
    fn test_missing_rich_text_resolver_renders_empty() {
        let result =
            rewrite(&embed("plain"), &[], &lookup(), &settings(QueryConfig::new())).unwrap();
        assert_eq!(result.resolved_html, r#"<div class="wrapper"></div>"#);
        assert_eq!(result.linked_items[0].data_codename, "plain");
    }

    #[test]
    fn test_embed_missing_from_lookup_is_fatal() {
        let err =
            rewrite(&embed("ghost"), &[], &lookup(), &settings(QueryConfig::new())).unwrap_err();
        assert!(matches!(err, QuireError::UnresolvedEmbed { ref codename } if codename == "ghost"));
    }

    #[test]
    fn test_link_falls_back_to_type_resolver() {
        let html = r#"<a data-item-id="42" href="">Tom</a>"#;
        let result =
            rewrite(html, &[tom_link()], &lookup(), &settings(QueryConfig::new())).unwrap();
        assert_eq!(
            result.resolved_html,
            r#"<a data-item-id="42" href="/actors/tom-hardy">Tom</a>"#
        );
    }

    #[test]
    fn test_query_link_resolver_wins_and_sees_link_text() {
        let query = QueryConfig::new().with_link_resolver(|link, context| {
            Some(LinkResult::url(format!("https://x/{}?{}", link.codename, context.link_text)))
        });
        let html = r#"<a data-item-id="42" href="">Tom</a>"#;
        let result = rewrite(html, &[tom_link()], &lookup(), &settings(query)).unwrap();
        assert_eq!(
            result.resolved_html,
            r#"<a data-item-id="42" href="https://x/tom_hardy?Tom">Tom</a>"#
        );
    }

    #[test]
    fn test_query_link_resolver_none_defers_to_type() {
        let query = QueryConfig::new().with_link_resolver(|_, _| None);
        let html = r#"<a data-item-id="42" href="">Tom</a>"#;
        let result = rewrite(html, &[tom_link()], &lookup(), &settings(query)).unwrap();
        assert!(result.resolved_html.contains(r#"href="/actors/tom-hardy""#));
    }

    #[test]
    fn test_link_without_descriptor_is_untouched() {
        let html = r#"<a data-item-id="7" href="">Nobody</a>"#;
        let result =
            rewrite(html, &[tom_link()], &lookup(), &settings(QueryConfig::new())).unwrap();
        assert_eq!(result.resolved_html, html);
        assert_eq!(result.links[0].data_item_id, "7");
    }

    #[test]
    fn test_link_to_unregistered_type_is_untouched() {
        let link = Link {
            content_type: "director".into(),
            ..tom_link()
        };
        let html = r#"<a data-item-id="42" href="">Tom</a>"#;
        let result = rewrite(html, &[link], &lookup(), &settings(QueryConfig::new())).unwrap();
        assert_eq!(result.resolved_html, html);
    }

    #[test]
    fn test_advanced_logging_leaves_output_unchanged() {
        let _ = env_logger::builder().is_test(true).try_init();

        let html = format!(
            r#"{}<a data-item-id="7" href="">Nobody</a>"#,
            embed("plain")
        );
        let quiet = rewrite(&html, &[], &lookup(), &settings(QueryConfig::new())).unwrap();
        let logged = rewrite(
            &html,
            &[],
            &lookup(),
            &settings_with_logging(QueryConfig::new(), true),
        )
        .unwrap();

        assert_eq!(logged, quiet);
        assert_eq!(
            logged.resolved_html,
            r#"<div class="wrapper"></div><a data-item-id="7" href="">Nobody</a>"#
        );
    }
}

use crate::config::LinkResolverFn;
use crate::model::{Link, LinkContext, LinkResult};
use log::warn;

/// Resolves the URL of a URL slug field through its captured link resolver.
///
/// Replacement markup makes no sense for a URL, so `as_html` results are ignored.
pub fn resolve_url(
    field: &str,
    link: &Link,
    resolver: Option<&LinkResolverFn>,
    enable_advanced_logging: bool,
) -> Option<String> {
    let Some(resolve) = resolver else {
        if enable_advanced_logging {
            warn!(
                "Cannot resolve url of field '{}' of item '{}', no link resolver for type '{}'",
                field, link.codename, link.content_type
            );
        }
        return None;
    };

    let result = resolve(link, &LinkContext::default());
    match result {
        Some(LinkResult::Url(url)) => Some(url),
        Some(LinkResult::Structured { as_url, as_html }) => {
            if as_html.is_some() && enable_advanced_logging {
                warn!(
                    "Url slug field '{}' of item '{}' ignores the 'as_html' link result",
                    field, link.codename
                );
            }
            as_url
        }
        None => {
            if enable_advanced_logging {
                warn!(
                    "Link resolver returned nothing for url slug field '{}' of item '{}'",
                    field, link.codename
                );
            }
            None
        }
    }
}

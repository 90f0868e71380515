use crate::cli::MapArgs;
use crate::config::QuireConfig;
use anyhow::{Context, Result};
use quire_core::{ContentGraph, ContentNode, Link, LinkResult, NodeRef, QueryConfig, ResponseMapper};
use tracing::info;

pub fn run(args: MapArgs, mut config: QuireConfig) -> Result<()> {
    if let Some(backend) = args.backend {
        config.rich_text.backend = backend;
    }
    if args.throw_missing {
        config.throw_error_for_missing_linked_items = true;
    }
    if args.advanced_logging {
        config.enable_advanced_logging = true;
    }
    config.validate()?;

    let json = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("Failed to read {}", args.payload.display()))?;

    let mapper = ResponseMapper::new(config.client_config());
    let query = with_builtin_resolvers(config.query_config());

    let (roots, graph) = if args.listing {
        let listing = mapper
            .map_listing_json(&json, &query)
            .context("Failed to map listing response")?;
        info!(
            "Listing page: skip {}, limit {}, count {}",
            listing.pagination.skip, listing.pagination.limit, listing.pagination.count
        );
        (listing.items, listing.graph)
    } else {
        let response = mapper
            .map_item_json(&json, &query)
            .context("Failed to map item response")?;
        (vec![response.item], response.graph)
    };

    info!(
        "Mapped {} top-level items into {} nodes using the {} backend",
        roots.len(),
        graph.len(),
        config.rich_text.backend
    );

    for line in render(&graph, &roots)? {
        println!("{}", line);
    }
    Ok(())
}

/// Embedded items render as a tagged span, links as `/{type}/{url_slug}`.
fn with_builtin_resolvers(query: QueryConfig) -> QueryConfig {
    query
        .with_rich_text_resolver(|node, _| render_embed(node))
        .with_link_resolver(|link, _| Some(LinkResult::url(link_url(link))))
}

fn render_embed(node: &ContentNode) -> String {
    format!(
        "<span data-codename=\"{}\">{}</span>",
        node.codename(),
        node.content_type()
    )
}

fn link_url(link: &Link) -> String {
    format!("/{}/{}", link.content_type, link.url_slug)
}

/// One line per node, followed by its resolved rich text and URL slugs.
/// Top-level items are marked with `*`.
fn render(graph: &ContentGraph, roots: &[NodeRef]) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for (node_ref, node) in graph.iter() {
        let marker = if roots.contains(&node_ref) { "*" } else { " " };
        let properties = node.property_names();
        lines.push(format!(
            "{} {} ({}): {}",
            marker,
            node.codename(),
            node.content_type(),
            properties.join(", ")
        ));

        for property in properties {
            if let Some(field) = node.rich_text(property) {
                let html = field.resolve_html(graph).with_context(|| {
                    format!("Failed to resolve '{}' of '{}'", property, node.codename())
                })?;
                lines.push(format!("    {} = {}", property, html));
            }
            if let Some(slug) = node.url_slug(property) {
                lines.push(format!(
                    "    {} -> {}",
                    property,
                    slug.resolve_url().unwrap_or_default()
                ));
            }
        }
    }
    Ok(lines)
}

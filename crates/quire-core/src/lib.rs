//! Content graph resolution and rich text transclusion.
//!
//! Raw delivery payloads are mapped into a [`ContentGraph`] of typed
//! [`ContentNode`]s. Linked items are shared and cycle safe: every codename
//! maps to exactly one node per call. Rich text and URL slug fields are
//! resolved on demand through caller supplied resolvers.

pub mod config;
pub mod contract;
pub mod error;
pub mod mapper;
pub mod markup;
pub mod model;
pub mod resolvers;
pub mod response;
pub mod variant;

pub use config::{
    ClientConfig, FieldResolverFn, ItemResolverFn, LinkResolverFn, ParserBackend,
    PropertyResolverFn, QueryConfig, RichTextOptions, RichTextResolverFn,
};
pub use contract::{
    ModularContentMap, Pagination, RawEntity, RawField, RawItemResponse, RawLink,
    RawListingResponse, RawSystem,
};
pub use error::{QuireError, Result};
pub use mapper::{FieldMapper, ProcessedRegistry};
pub use markup::{
    DomRichTextParser, HtmlResolverConfig, LinkObservation, PlaceholderObservation,
    RichTextParser, RichTextReplacements, RichTextResolution, TreeRichTextParser,
};
pub use model::{
    AssetModel, AssetsField, ContentGraph, ContentNode, CustomField, DateTimeField, FieldKind,
    FieldValue, Link, LinkContext, LinkResult, LinkedItemLookup, LinkedItemsField,
    MultipleChoiceField, MultipleChoiceOption, NodeRef, NumberField, PartialNode,
    RichTextContentType, RichTextContext, RichTextField, SystemAttributes, TaxonomyField,
    TaxonomyTerm, TextField, UrlSlugField,
};
pub use resolvers::RewriteSettings;
pub use response::{
    parse_item_response, parse_listing_response, ItemListingResponse, ItemResponse,
    ResponseMapper,
};
pub use variant::{ShellFactory, TypeRegistry, TypeResolver, TypeShell};

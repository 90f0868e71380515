mod fields;
mod link;
mod node;

pub use fields::{
    AssetModel, AssetsField, CustomField, DateTimeField, FieldKind, FieldValue, LinkedItemsField,
    MultipleChoiceField, MultipleChoiceOption, NumberField, RichTextField, TaxonomyField,
    TaxonomyTerm, TextField, UrlSlugField,
};
pub use link::{Link, LinkContext, LinkResult, RichTextContentType, RichTextContext};
pub use node::{
    ContentGraph, ContentNode, LinkedItemLookup, NodeRef, PartialNode, SystemAttributes,
};

pub(crate) use fields::string_value;

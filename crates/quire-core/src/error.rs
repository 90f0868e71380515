use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuireError>;

#[derive(Debug, Error)]
pub enum QuireError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error(
        "Linked item '{codename}' requested by field '{field}' is not part of the response. \
         Increase the depth of the query or disable throw_error_for_missing_linked_items"
    )]
    MissingLinkedItem { codename: String, field: String },

    #[error(
        "Embedded item '{codename}' is not part of the response, rich text cannot be resolved. \
         Increase the depth of the query"
    )]
    UnresolvedEmbed { codename: String },

    #[error("Unsupported embed data type '{data_type}'")]
    UnsupportedEmbedKind { data_type: String },

    #[error("Malformed embed: {0}")]
    MalformedEmbed(String),

    #[error("Unsupported field type '{field_type}' on field '{field}'")]
    UnsupportedFieldType { field: String, field_type: String },

    #[error("Markup error: {0}")]
    Markup(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

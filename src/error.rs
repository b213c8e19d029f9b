use thiserror::Error;

/// Errors raised while building a schema or loading an entity table.
///
/// Normalizing, denormalizing and collecting entities never fail; only
/// construction does.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("empty key declaration")]
    EmptyDeclaration,

    #[error("merge function used where a key was expected")]
    MergerAsKey,

    #[error("sequence used where a key was expected")]
    UnexpectedSequence,

    #[error("array key must wrap exactly one key, found {0}")]
    ArrayArity(usize),

    #[error("unrecognized key declaration shape `{0}`")]
    UnrecognizedShape(String),

    #[error("unsupported JSON declaration: {0}")]
    UnsupportedJson(String),

    #[error("invalid declaration for property `{prop}`")]
    Property {
        prop: String,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("invalid entity table: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    pub(crate) fn at(prop: impl Into<String>, source: SchemaError) -> Self {
        SchemaError::Property {
            prop: prop.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;

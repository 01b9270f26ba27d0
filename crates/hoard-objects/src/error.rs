use thiserror::Error;

/// Errors from object decoding and encoding.
///
/// Every format violation is a data-integrity signal and surfaces to
/// the immediate caller; nothing here is retried or swallowed.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// A signature string failed the `name <email> timestamp timezone`
    /// contract.
    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },

    /// A mandatory commit/tag field was absent after KVLM decode.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// A field that must hold an object id did not parse as one.
    #[error("field {field} is not a valid object id: {source}")]
    InvalidObjectId {
        field: &'static str,
        source: hoard_types::TypeError,
    },

    /// The name does not belong to the closed set of object kinds.
    #[error("unknown object type: {0}")]
    UnknownObjectType(String),

    /// A binary tree entry violated the
    /// `<mode> <path>\0<raw-hash>` layout.
    #[error("malformed tree entry: {reason}")]
    MalformedTreeEntry { reason: String },
}

/// Result alias for object operations.
pub type ObjectResult<T> = Result<T, ObjectError>;

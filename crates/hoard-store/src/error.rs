use hoard_types::ObjectId;
use thiserror::Error;

/// Errors from object database operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist in the store.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The header before the first NUL is not
    /// `<type-name> <decimal-length>`.
    #[error("invalid object header: {reason}")]
    InvalidObjectHeader { reason: String },

    /// The decompressed payload length disagrees with the header.
    #[error("object size mismatch: header declares {expected}, payload has {actual}")]
    ObjectSizeMismatch { expected: usize, actual: usize },

    /// The payload failed to decode as its declared kind.
    #[error(transparent)]
    Object(#[from] hoard_objects::ObjectError),

    /// I/O failure from the filesystem or the compression stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
